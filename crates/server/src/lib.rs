//! HTTP API server for the hitos milestone tracker.
//!
//! This crate provides:
//! - Stage and milestone CRUD endpoints
//! - Illustration upload and serving
//! - Startup schema creation and default stage seeding
//! - Layered configuration loading, metrics and request tracing

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod trace;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use trace::TraceId;
