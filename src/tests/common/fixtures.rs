use axum_test::{TestServer, TestServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::client::SheetsApi;
use crate::handlers::api::AppState;
use crate::models::form::FormSchema;
use crate::routes::{create_app, create_router};

/// The booking used throughout the handler tests
pub fn booking_payload() -> Value {
    json!({
        "name": "A",
        "email": "a@x.com",
        "phone": "555",
        "address": "1 St",
        "date": "2024-01-01",
        "time": "10:00",
        "service": "Cut"
    })
}

/// The row `booking_payload` should produce with the default schema
pub fn booking_row() -> Vec<Value> {
    vec![
        json!("A"),
        json!("a@x.com"),
        json!("555"),
        json!("1 St"),
        json!("2024-01-01"),
        json!("10:00"),
        json!("Cut"),
    ]
}

/// Build a test server around any `SheetsApi` implementation
pub fn test_server(
    sheets: Arc<dyn SheetsApi>,
    form: FormSchema,
    success_message: Option<String>,
) -> TestServer {
    let app_state = Arc::new(AppState {
        sheets,
        form,
        success_message,
    });

    let config = TestServerConfig::builder().mock_transport().build();

    TestServer::new_with_config(create_router(app_state), config).unwrap()
}

/// Same as `test_server`, with the production middleware stack applied
pub fn layered_test_server(sheets: Arc<dyn SheetsApi>, request_timeout: Duration) -> TestServer {
    let app_state = Arc::new(AppState {
        sheets,
        form: FormSchema::default(),
        success_message: None,
    });

    let config = TestServerConfig::builder().mock_transport().build();

    TestServer::new_with_config(create_app(app_state, request_timeout), config).unwrap()
}
