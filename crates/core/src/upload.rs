//! Illustration upload rules.
//!
//! An upload is accepted when its size is within the cap and both its file
//! extension and its declared content type name one of the allowed image
//! kinds. The two checks are independent; file bytes are never sniffed.

use crate::error::{Error, Result};
use time::OffsetDateTime;
use uuid::Uuid;

/// Allowed image kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    /// Match an extension or MIME subtype (`jpeg`, `jpg`, `png`, `gif`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Kind for a stored file name, by extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        extension_of(name).and_then(Self::from_token)
    }

    /// Canonical MIME type.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }
}

/// File extension without the dot, if the name has one.
fn extension_of(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Metadata of a received file, validated before it is stored.
#[derive(Debug, Clone)]
pub struct UploadCandidate<'a> {
    /// Client-supplied file name.
    pub file_name: &'a str,
    /// Client-declared content type, if any.
    pub content_type: Option<&'a str>,
    /// Size in bytes.
    pub size: u64,
}

impl UploadCandidate<'_> {
    /// Validate against the size cap and allowed kinds.
    ///
    /// Returns the normalized (lowercased) extension to keep on the stored name.
    pub fn validate(&self, max_size: u64) -> Result<String> {
        if self.size > max_size {
            return Err(Error::FileTooLarge {
                size: self.size,
                max: max_size,
            });
        }

        let extension = extension_of(self.file_name)
            .map(str::to_ascii_lowercase)
            .filter(|ext| ImageKind::from_token(ext).is_some())
            .ok_or_else(|| Error::UnsupportedExtension(self.file_name.to_string()))?;

        let content_type = self.content_type.unwrap_or_default();
        if !content_type_allowed(content_type) {
            return Err(Error::UnsupportedContentType(content_type.to_string()));
        }

        Ok(extension)
    }
}

/// `image/<subtype>` with an allowed subtype; parameters are ignored.
fn content_type_allowed(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    match essence.split_once('/') {
        Some((top, sub)) => {
            top.eq_ignore_ascii_case("image") && ImageKind::from_token(sub).is_some()
        }
        None => false,
    }
}

/// Generate a stored file name: `<unix-millis>-<random hex>.<ext>`.
pub fn generate_upload_name(extension: &str) -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    format!("{millis}-{}.{extension}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_UPLOAD_SIZE;

    fn candidate<'a>(file_name: &'a str, content_type: Option<&'a str>, size: u64) -> UploadCandidate<'a> {
        UploadCandidate {
            file_name,
            content_type,
            size,
        }
    }

    #[test]
    fn accepts_allowed_images() {
        for (name, mime) in [
            ("photo.jpg", "image/jpeg"),
            ("photo.JPEG", "image/jpeg"),
            ("map.png", "image/png"),
            ("anim.gif", "image/gif"),
        ] {
            let ext = candidate(name, Some(mime), 1024)
                .validate(MAX_UPLOAD_SIZE)
                .unwrap();
            assert_eq!(ext, name.rsplit('.').next().unwrap().to_ascii_lowercase());
        }
    }

    #[test]
    fn rejects_oversized_file() {
        let err = candidate("big.png", Some("image/png"), 6 * 1024 * 1024)
            .validate(MAX_UPLOAD_SIZE)
            .unwrap_err();
        assert!(matches!(err, Error::FileTooLarge { .. }));
        assert_eq!(err.reason(), "too_large");
    }

    #[test]
    fn accepts_file_exactly_at_cap() {
        assert!(
            candidate("edge.png", Some("image/png"), MAX_UPLOAD_SIZE)
                .validate(MAX_UPLOAD_SIZE)
                .is_ok()
        );
    }

    #[test]
    fn rejects_bad_extension_even_with_image_mime() {
        let err = candidate("notes.txt", Some("image/png"), 10)
            .validate(MAX_UPLOAD_SIZE)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedExtension(_)));

        let err = candidate("noext", Some("image/png"), 10)
            .validate(MAX_UPLOAD_SIZE)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedExtension(_)));
    }

    #[test]
    fn rejects_bad_mime_even_with_image_extension() {
        for mime in [Some("text/plain"), Some("application/png"), Some("image/svg+xml"), None] {
            let err = candidate("spoof.png", mime, 10)
                .validate(MAX_UPLOAD_SIZE)
                .unwrap_err();
            assert!(matches!(err, Error::UnsupportedContentType(_)), "{mime:?}");
        }
    }

    #[test]
    fn mime_parameters_are_ignored() {
        assert!(content_type_allowed("image/png; charset=binary"));
        assert!(content_type_allowed("IMAGE/JPEG"));
    }

    #[test]
    fn generated_names_are_unique_and_keep_extension() {
        let a = generate_upload_name("png");
        let b = generate_upload_name("png");
        assert_ne!(a, b);
        assert!(a.ends_with(".png"));
        let (millis, rest) = a.split_once('-').unwrap();
        assert!(millis.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(rest.len(), 32 + ".png".len());
    }

    #[test]
    fn kind_from_stored_name() {
        assert_eq!(ImageKind::from_file_name("1-abc.jpg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_file_name("1-abc.gif").unwrap().content_type(), "image/gif");
        assert_eq!(ImageKind::from_file_name("readme"), None);
    }
}
