//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("file too large: {size} bytes (max {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("unsupported file extension: {0:?} (allowed: jpeg, jpg, png, gif)")]
    UnsupportedExtension(String),

    #[error("unsupported content type: {0:?} (allowed: image/jpeg, image/png, image/gif)")]
    UnsupportedContentType(String),
}

impl Error {
    /// Short machine-readable reason, used for metrics labels.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidDate(_) => "invalid_date",
            Self::FileTooLarge { .. } => "too_large",
            Self::UnsupportedExtension(_) => "bad_extension",
            Self::UnsupportedContentType(_) => "bad_content_type",
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
