//! Core domain types and shared logic for the hitos milestone tracker.
//!
//! This crate defines the pieces every other crate agrees on:
//! - Configuration sections (server, metadata store, blob storage)
//! - Default stages seeded on first start
//! - Calendar date wire format
//! - Integer fields accepted as numbers or numeric strings
//! - Illustration upload rules (allowed image kinds, size cap, file naming)

pub mod config;
pub mod date;
pub mod error;
pub mod int;
pub mod stage;
pub mod upload;

pub use error::{Error, Result};
pub use stage::{DEFAULT_STAGES, DEFAULT_STAGE_COLOR, DefaultStage};
pub use upload::{ImageKind, UploadCandidate, generate_upload_name};

/// Maximum illustration upload size: 5 MiB
pub const MAX_UPLOAD_SIZE: u64 = 5 * 1024 * 1024;

/// URL prefix under which stored uploads are served.
pub const UPLOADS_PATH_PREFIX: &str = "/uploads";
