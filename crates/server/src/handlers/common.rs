//! Shared handler helpers.

use crate::error::{ApiError, ApiResult};
use axum::body::Body;
use serde::de::DeserializeOwned;

/// Maximum JSON request body size (1 MiB).
pub const MAX_JSON_BODY_SIZE: usize = 1024 * 1024;

/// Read and decode a JSON request body.
///
/// Any failure (oversized body, malformed JSON, missing or mistyped fields)
/// is a client error.
pub async fn read_json_body<T: DeserializeOwned>(body: Body) -> ApiResult<T> {
    let bytes = axum::body::to_bytes(body, MAX_JSON_BODY_SIZE)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))
}

/// Parse a numeric path id.
pub fn parse_id(raw: &str, what: &str) -> ApiResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| ApiError::BadRequest(format!("invalid {what} ID {raw:?}: {e}")))
}

/// Body of write endpoints that return no row.
#[derive(Debug, serde::Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
