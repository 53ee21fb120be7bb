//! API Routes
//!
//! Configures the Axum router with all service endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_errors_handler, delete_handler, error_stats_handler, get_handler, health_handler,
    invalidate_handler, list_errors_handler, put_handler, resolve_error_handler,
    stats_handler, validate_batch_handler, validate_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /cache/:key`, `GET /cache/:key`, `DELETE /cache/:key`
/// - `POST /cache/invalidate` - Remove entries by substring or regex
/// - `GET /cache/stats` - Cache statistics
/// - `POST /validate/:kind` and `POST /validate/:kind/batch`
/// - `GET /errors`, `GET /errors/stats`, `POST /errors/:id/resolve`,
///   `POST /errors/cleanup`
/// - `GET /health` - Health report
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Static segments win over `:key`, so stats/invalidate never hit the key routes
    Router::new()
        .route("/cache/stats", get(stats_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .route(
            "/cache/:key",
            get(get_handler).put(put_handler).delete(delete_handler),
        )
        .route("/validate/:kind", post(validate_handler))
        .route("/validate/:kind/batch", post(validate_batch_handler))
        .route("/errors", get(list_errors_handler))
        .route("/errors/stats", get(error_stats_handler))
        .route("/errors/cleanup", post(cleanup_errors_handler))
        .route("/errors/:id/resolve", post(resolve_error_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
