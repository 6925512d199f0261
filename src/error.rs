use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::models::response::AppendResult;

/// Failures that can end a form submission.
///
/// Every variant is local to one request. Validation failures map to 400,
/// anything that went wrong while talking to Google maps to 500 and carries
/// the upstream message unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The body was not JSON, or was JSON but not an object.
    #[error("Invalid form data format")]
    InvalidFormat,

    /// A required field was absent or empty.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// The service account token exchange failed.
    #[error("{0}")]
    Authentication(String),

    /// The append call itself failed (quota, network, permissions).
    #[error("{0}")]
    ExternalCall(String),
}

impl SubmitError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidFormat | Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::Authentication(_) | Self::ExternalCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(AppendResult::failure(self.to_string()))).into_response()
    }
}
