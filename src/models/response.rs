use serde::Serialize;

// Body returned by the submit endpoint, for both outcomes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppendResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppendResult {
    pub fn success(message: Option<String>) -> Self {
        Self {
            success: true,
            message,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

// Liveness probe body
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}
