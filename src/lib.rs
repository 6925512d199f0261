//! Booking Form to Google Sheets Service
//!
//! Accepts booking/contact form submissions over HTTP and appends each one
//! as a row to a Google Sheets worksheet.
//!
//! # Modules
//!
//! - `config`: environment-driven configuration (sheet target, credentials, form schema)
//! - `auth`: service account assertion signing and token exchange
//! - `client`: `SheetsApi` trait and the Google Sheets append client
//! - `handlers` / `routes`: the axum HTTP surface
//!
//! # Authentication
//!
//! The service authenticates as a Google service account: an RS256-signed
//! assertion is exchanged for a short-lived bearer token, which authorizes
//! exactly the append call of the submission that requested it. Tokens can
//! optionally be cached process-wide until shortly before they expire.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod client_mock;

// Re-export the main API types for ease of use
pub use auth::{AccessToken, CredentialCache, GoogleAuth};
pub use client::{GoogleSheetsClient, SheetsApi};
pub use config::{AppConfig, ConfigError, SheetTarget};
pub use error::SubmitError;
pub use handlers::api::AppState;
pub use routes::{create_app, create_router};
