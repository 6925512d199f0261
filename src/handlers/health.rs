use axum::response::Json;

use crate::models::response::HealthResponse;

// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Server is running".to_string(),
    })
}
