//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::trace::trace_id_middleware;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes().saturating_add(MULTIPART_OVERHEAD);

    let api_routes = Router::new()
        .route("/api/health", get(handlers::health_check))
        .route(
            "/api/stages",
            get(handlers::list_stages).post(handlers::create_stage),
        )
        .route("/api/stages/{id}", delete(handlers::delete_stage))
        .route(
            "/api/milestones",
            get(handlers::list_milestones).post(handlers::create_milestone),
        )
        .route(
            "/api/milestones/{id}",
            put(handlers::update_milestone).delete(handlers::delete_milestone),
        )
        .route(
            "/api/upload",
            post(handlers::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        );

    let upload_routes = Router::new().route("/uploads/{filename}", get(handlers::get_upload));

    let mut router = Router::new().merge(api_routes).merge(upload_routes);

    // The endpoint is unauthenticated; restrict it at the network level.
    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    let router = router
        .layer(middleware::from_fn(trace_id_middleware))
        .layer(TraceLayer::new_for_http());

    let router = if state.config.server.cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}
