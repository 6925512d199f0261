use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::client::SheetsApi;
use crate::error::SubmitError;
use crate::models::form::{FormSchema, FormSubmission};
use crate::models::response::AppendResult;

// AppState struct containing shared resources
pub struct AppState {
    pub sheets: Arc<dyn SheetsApi>,
    pub form: FormSchema,
    pub success_message: Option<String>,
}

// Form submission endpoint
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AppendResult>, SubmitError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("Rejected submission body: {}", rejection);
        SubmitError::InvalidFormat
    })?;

    let submission = FormSubmission::from_value(payload).map_err(|e| {
        warn!("Rejected submission: payload is not an object");
        e
    })?;

    if let Err(e) = submission.validate(&state.form.required) {
        warn!("Rejected submission: {}", e);
        return Err(e);
    }

    let row = submission.to_row(&state.form.columns).map_err(|e| {
        warn!("Rejected submission: a column holds a nested value");
        e
    })?;

    // Step 1: obtain a credential for this request
    let credential = state.sheets.authorize().await.map_err(|e| {
        error!("Google authentication failed: {}", e);
        e
    })?;

    // Step 2: append the row
    if let Err(e) = state.sheets.append_row(&credential, row).await {
        error!("Error writing to sheet: {}", e);
        return Err(e);
    }

    info!("Appended submission with {} columns", state.form.columns.len());

    Ok(Json(AppendResult::success(state.success_message.clone())))
}
