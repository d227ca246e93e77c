//! Prometheus metrics for the hitos server.
//!
//! Counters cover stage and milestone writes and illustration uploads.
//! The `/metrics` endpoint is only mounted when `server.metrics_enabled`
//! is set and carries no authentication of its own.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{self, Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Stage metrics
pub static STAGES_CREATED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("hitos_stages_created_total", "Total number of stages created")
        .expect("metric creation failed")
});

pub static STAGES_DELETED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("hitos_stages_deleted_total", "Total number of stage delete requests executed")
        .expect("metric creation failed")
});

pub static STAGE_DELETES_BLOCKED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "hitos_stage_deletes_blocked_total",
        "Total number of stage deletions refused because milestones still reference the stage",
    )
    .expect("metric creation failed")
});

// Milestone metrics
pub static MILESTONES_CREATED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "hitos_milestones_created_total",
        "Total number of milestones created",
    )
    .expect("metric creation failed")
});

pub static MILESTONES_UPDATED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "hitos_milestones_updated_total",
        "Total number of milestone update requests executed",
    )
    .expect("metric creation failed")
});

pub static MILESTONES_DELETED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "hitos_milestones_deleted_total",
        "Total number of milestone delete requests executed",
    )
    .expect("metric creation failed")
});

// Upload metrics
pub static UPLOADS_ACCEPTED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "hitos_uploads_accepted_total",
        "Total number of illustrations stored",
    )
    .expect("metric creation failed")
});

pub static UPLOAD_BYTES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "hitos_upload_bytes_total",
        "Total bytes of stored illustrations",
    )
    .expect("metric creation failed")
});

pub static UPLOAD_REJECTIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "hitos_upload_rejections_total",
            "Total rejected uploads by reason",
        ),
        &["reason"],
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so several routers in one process (tests) are fine.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        let collectors: [Box<dyn prometheus::core::Collector>; 9] = [
            Box::new(STAGES_CREATED.clone()),
            Box::new(STAGES_DELETED.clone()),
            Box::new(STAGE_DELETES_BLOCKED.clone()),
            Box::new(MILESTONES_CREATED.clone()),
            Box::new(MILESTONES_UPDATED.clone()),
            Box::new(MILESTONES_DELETED.clone()),
            Box::new(UPLOADS_ACCEPTED.clone()),
            Box::new(UPLOAD_BYTES.clone()),
            Box::new(UPLOAD_REJECTIONS.clone()),
        ];
        for collector in collectors {
            if let Err(e) = REGISTRY.register(collector) {
                tracing::warn!(error = %e, "Metric registration failed");
            }
        }
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Record a rejected upload.
pub fn record_upload_rejection(reason: &str) {
    UPLOAD_REJECTIONS.with_label_values(&[reason]).inc();
}
