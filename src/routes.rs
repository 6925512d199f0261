use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::{BoxError, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::api::{submit_form, AppState};
use crate::handlers::health::health_check;
use crate::models::response::AppendResult;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Both probe paths are served so either platform convention works
    let health_routes = Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check));

    Router::new()
        .route("/submit", post(submit_form))
        .merge(health_routes)
        .with_state(app_state)
}

// Error handler for failures raised by the middleware stack
async fn handle_error(error: BoxError) -> (StatusCode, Json<AppendResult>) {
    if error.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(AppendResult::failure("Request took too long")),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AppendResult::failure(format!(
                "Unhandled internal error: {}",
                error
            ))),
        )
    }
}

/// The router wrapped in tracing, CORS and a whole-request timeout.
pub fn create_app(app_state: Arc<AppState>, request_timeout: Duration) -> Router {
    create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .timeout(request_timeout)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any)),
    )
}
