use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recording control
        .route("/recorder/start", post(handlers::start_session))
        .route("/recorder/stop", post(handlers::stop_session))
        .route("/recorder/monitor/enable", post(handlers::enable_monitoring))
        .route(
            "/recorder/monitor/disable",
            post(handlers::disable_monitoring),
        )
        // Queries
        .route("/recorder/status", get(handlers::get_status))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
