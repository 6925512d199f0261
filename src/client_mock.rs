use async_trait::async_trait;
use chrono::{Duration, Utc};
use mockall::mock;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::auth::AccessToken;
use crate::client::SheetsApi;
use crate::error::SubmitError;

// Define a mock client for the Google Sheets API
mock! {
    pub SheetsClient {}

    #[async_trait]
    impl SheetsApi for SheetsClient {
        async fn authorize(&self) -> Result<AccessToken, SubmitError>;

        async fn append_row(
            &self,
            credential: &AccessToken,
            row: Vec<Value>,
        ) -> Result<(), SubmitError>;
    }
}

// In-memory stand-in for the worksheet
#[derive(Default)]
pub struct MockSheet {
    rows: Mutex<Vec<Vec<Value>>>,
}

impl MockSheet {
    pub fn append(&self, row: Vec<Value>) {
        self.rows.lock().unwrap().push(row);
    }

    pub fn rows(&self) -> Vec<Vec<Value>> {
        self.rows.lock().unwrap().clone()
    }
}

pub fn test_token() -> AccessToken {
    AccessToken::new("test-access-token", Utc::now() + Duration::seconds(3600))
}

// Helper function to set up a mock client that authorizes and records every row
pub fn setup_mock_client() -> (MockSheetsClient, Arc<MockSheet>) {
    let sheet = Arc::new(MockSheet::default());
    let mut mock_client = MockSheetsClient::new();

    mock_client
        .expect_authorize()
        .returning(|| Ok(test_token()));

    let sheet_ref = Arc::clone(&sheet);
    mock_client
        .expect_append_row()
        .returning(move |credential, row| {
            assert_eq!(credential.secret(), "test-access-token");
            sheet_ref.append(row);
            Ok(())
        });

    (mock_client, sheet)
}
