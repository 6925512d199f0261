use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::{AccessToken, GoogleAuth};
use crate::config::{AppConfig, SheetTarget};
use crate::error::SubmitError;

/// The two external steps of a submission: get a credential, append a row.
///
/// Kept behind a trait so handlers can be exercised without Google.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    async fn authorize(&self) -> Result<AccessToken, SubmitError>;

    async fn append_row(&self, credential: &AccessToken, row: Vec<Value>)
        -> Result<(), SubmitError>;
}

#[derive(Debug, Serialize)]
struct ValueRange {
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

/// Client for the Google Sheets `values.append` API
pub struct GoogleSheetsClient {
    client: Client,
    auth: GoogleAuth,
    endpoint: String,
    target: SheetTarget,
}

impl GoogleSheetsClient {
    pub fn new(
        client: Client,
        auth: GoogleAuth,
        endpoint: impl Into<String>,
        target: SheetTarget,
    ) -> Self {
        Self {
            client,
            auth,
            endpoint: endpoint.into(),
            target,
        }
    }

    /// Build a client for the configured spreadsheet and service account.
    pub fn from_config(config: &AppConfig) -> Self {
        let client = Client::new();
        let auth = GoogleAuth::new(
            client.clone(),
            config.credentials.clone(),
            config.cache_credentials,
        );
        Self::new(
            client,
            auth,
            config.sheets_endpoint.clone(),
            config.target.clone(),
        )
    }

    /// `{endpoint}/v4/spreadsheets/{id}/values/{range}:append?valueInputOption=RAW`
    pub fn append_url(&self) -> Result<Url, SubmitError> {
        let range = format!("{}:append", self.target.range());
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| SubmitError::ExternalCall(format!("invalid Sheets endpoint: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| SubmitError::ExternalCall("invalid Sheets endpoint".to_string()))?
            .pop_if_empty()
            .extend(&[
                "v4",
                "spreadsheets",
                self.target.spreadsheet_id.as_str(),
                "values",
                range.as_str(),
            ]);
        // Literal values: "=SUM(A1)" is stored as text, not a formula
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        Ok(url)
    }
}

#[async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn authorize(&self) -> Result<AccessToken, SubmitError> {
        self.auth.access_token().await
    }

    async fn append_row(
        &self,
        credential: &AccessToken,
        row: Vec<Value>,
    ) -> Result<(), SubmitError> {
        let url = self.append_url()?;
        debug!("Appending row to {}", url);

        let res = self
            .client
            .post(url)
            .bearer_auth(credential.secret())
            .json(&ValueRange { values: vec![row] })
            .send()
            .await
            .map_err(|e| SubmitError::ExternalCall(e.to_string()))?;

        let status = res.status();
        info!("Append response received with status: {}", status);

        if !status.is_success() {
            let message = match res.json::<GoogleErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("Sheets API returned {}", status),
            };
            return Err(SubmitError::ExternalCall(message));
        }

        Ok(())
    }
}
