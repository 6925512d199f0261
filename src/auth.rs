//! Service account authentication for the Google Sheets API.
//!
//! A signed RS256 assertion is exchanged at the OAuth token endpoint for a
//! short-lived bearer token. Tokens are either minted fresh for every
//! submission or kept in a [`CredentialCache`] shared by all requests.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ServiceAccount;
use crate::error::SubmitError;

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// Claims of the self-signed service account assertion
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Bearer token returned by the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn secret(&self) -> &str {
        &self.value
    }

    /// True while the token has more than the refresh margin left at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > Duration::seconds(REFRESH_MARGIN_SECS)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Process-wide token slot. Refreshes happen under the lock so concurrent
/// requests never observe a half-written token.
#[derive(Debug, Default)]
pub struct CredentialCache {
    slot: Mutex<Option<AccessToken>>,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<AccessToken, SubmitError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<AccessToken, SubmitError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(token) = slot.as_ref() {
            if token.is_fresh(Utc::now()) {
                debug!("Reusing cached access token");
                return Ok(token.clone());
            }
        }

        let token = refresh().await?;
        *slot = Some(token.clone());
        Ok(token)
    }
}

/// Mints access tokens for one service account
pub struct GoogleAuth {
    client: Client,
    credentials: ServiceAccount,
    cache: Option<CredentialCache>,
}

impl GoogleAuth {
    pub fn new(client: Client, credentials: ServiceAccount, cache_credentials: bool) -> Self {
        Self {
            client,
            credentials,
            cache: cache_credentials.then(CredentialCache::new),
        }
    }

    /// Build and sign the assertion presented to the token endpoint.
    pub fn build_assertion(&self, now: DateTime<Utc>) -> Result<String, SubmitError> {
        let claims = AssertionClaims {
            iss: self.credentials.client_email.clone(),
            scope: self.credentials.scopes.join(" "),
            aud: self.credentials.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| SubmitError::Authentication(format!("invalid private key: {}", e)))?;

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| SubmitError::Authentication(e.to_string()))
    }

    /// Return a usable token, from the cache when caching is enabled.
    pub async fn access_token(&self) -> Result<AccessToken, SubmitError> {
        match &self.cache {
            Some(cache) => cache.get_or_refresh(|| self.exchange()).await,
            None => self.exchange().await,
        }
    }

    async fn exchange(&self) -> Result<AccessToken, SubmitError> {
        let now = Utc::now();
        let assertion = self.build_assertion(now)?;

        debug!("Requesting access token from {}", self.credentials.token_uri);

        let res = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SubmitError::Authentication(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.json::<TokenErrorResponse>().await.ok();
            let message = body
                .and_then(|b| b.error_description.or(b.error))
                .unwrap_or_else(|| format!("token endpoint returned {}", status));
            return Err(SubmitError::Authentication(message));
        }

        let token = res
            .json::<TokenResponse>()
            .await
            .map_err(|e| SubmitError::Authentication(e.to_string()))?;

        let expires_at = Duration::try_seconds(token.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                SubmitError::Authentication(format!(
                    "token endpoint returned an invalid expires_in: {}",
                    token.expires_in
                ))
            })?;

        info!(
            "Google Sheets API authenticated for {}",
            self.credentials.client_email
        );

        Ok(AccessToken::new(token.access_token, expires_at))
    }
}
