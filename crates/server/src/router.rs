use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route(
            "/extract",
            post(handlers::extract_handler).layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
