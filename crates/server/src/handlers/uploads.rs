//! Illustration upload and retrieval.

use crate::error::{ApiError, ApiResult};
use crate::metrics::{self, record_upload_rejection};
use crate::state::AppState;
use axum::Json;
use axum::body::Body;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::BytesMut;
use hitos_core::upload::{ImageKind, UploadCandidate, generate_upload_name};
use hitos_core::{Error as CoreError, UPLOADS_PATH_PREFIX};
use serde::Serialize;

/// Multipart field carrying the file.
pub const UPLOAD_FIELD: &str = "image";

/// Upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Absolute URL of the stored file.
    pub url: String,
}

/// POST /api/upload - Store one image from the `image` multipart field.
///
/// Every rejection is a 400; nothing is written unless the file passes
/// validation.
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| {
        record_upload_rejection("malformed");
        ApiError::BadRequest(format!("expected multipart/form-data: {e}"))
    })?;
    let max_size = state.config.server.max_upload_bytes;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            data.extend_from_slice(&chunk);
            let size = data.len() as u64;
            if size > max_size {
                record_upload_rejection("too_large");
                return Err(CoreError::FileTooLarge {
                    size,
                    max: max_size,
                }
                .into());
            }
        }

        let candidate = UploadCandidate {
            file_name: &file_name,
            content_type: content_type.as_deref(),
            size: data.len() as u64,
        };
        let extension = candidate.validate(max_size).inspect_err(|e| {
            record_upload_rejection(e.reason());
        })?;

        let key = generate_upload_name(&extension);
        let size = data.len() as u64;
        if !state.storage.put_if_not_exists(&key, data.freeze()).await? {
            return Err(ApiError::Internal(format!(
                "generated upload name already taken: {key}"
            )));
        }

        metrics::UPLOADS_ACCEPTED.inc();
        metrics::UPLOAD_BYTES.inc_by(size);
        tracing::info!(
            key = %key,
            size,
            original_name = %file_name,
            "Illustration stored"
        );

        let url = format!(
            "{}{UPLOADS_PATH_PREFIX}/{key}",
            public_base_url(&state, &headers)
        );
        return Ok(Json(UploadResponse { url }));
    }

    record_upload_rejection("missing_file");
    Err(ApiError::BadRequest(format!(
        "no file uploaded in the {UPLOAD_FIELD:?} field"
    )))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        record_upload_rejection("too_large");
        ApiError::UploadTooLarge(format!("request body exceeds the limit: {e}"))
    } else {
        record_upload_rejection("malformed");
        ApiError::BadRequest(format!("malformed multipart body: {e}"))
    }
}

/// Scheme and host for upload URLs: configured value, else request headers.
fn public_base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.config.server.public_base_url {
        return base.clone();
    }
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("localhost");
    format!("{scheme}://{host}")
}

/// GET /uploads/{filename} - Serve a stored illustration.
pub async fn get_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let kind = ImageKind::from_file_name(&filename)
        .ok_or_else(|| ApiError::NotFound(format!("upload {filename}")))?;

    let data = state.storage.get(&filename).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, kind.content_type()),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        Body::from(data),
    )
        .into_response())
}
