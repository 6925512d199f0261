use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::models::form::FormSchema;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SHEET_NAME: &str = "customer tracking";
pub const DEFAULT_START_CELL: &str = "A1";
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com";
pub const DEFAULT_FORM_FIELDS: &str = "name,email,phone,address,date,time,service";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("required field {0:?} is not one of the form columns")]
    UnknownRequiredField(String),
}

/// Where appended rows land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub start_cell: String,
}

impl SheetTarget {
    /// A1 notation range, e.g. `customer tracking!A1`
    pub fn range(&self) -> String {
        format!("{}!{}", self.sheet_name, self.start_cell)
    }
}

/// Service account identity used to mint access tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
    pub scopes: Vec<String>,
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("scopes", &self.scopes)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub target: SheetTarget,
    pub credentials: ServiceAccount,
    pub sheets_endpoint: String,
    pub form: FormSchema,
    pub cache_credentials: bool,
    pub success_message: Option<String>,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };

        let spreadsheet_id = required("SPREADSHEET_ID")?;
        let client_email = required("GOOGLE_CLIENT_EMAIL")?;
        // Keys stored in .env files carry literal "\n" sequences
        let private_key = required("GOOGLE_PRIVATE_KEY")?.replace("\\n", "\n");

        // Optional variables set to "" fall back to their defaults
        let optional = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let port = match optional("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let request_timeout = match optional("REQUEST_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid {
                    name: "REQUEST_TIMEOUT_SECS",
                    value,
                })?,
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let cache_credentials = match optional("CACHE_CREDENTIALS") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid {
                name: "CACHE_CREDENTIALS",
                value,
            })?,
            None => false,
        };

        let columns = split_list(
            &optional("FORM_FIELDS").unwrap_or_else(|| DEFAULT_FORM_FIELDS.to_string()),
        );
        let required_fields = match lookup("FORM_REQUIRED_FIELDS") {
            Some(value) => split_list(&value),
            None => columns.clone(),
        };
        if let Some(unknown) = required_fields.iter().find(|field| !columns.contains(*field)) {
            return Err(ConfigError::UnknownRequiredField(unknown.clone()));
        }

        let with_default =
            |name: &str, default: &str| optional(name).unwrap_or_else(|| default.to_string());

        Ok(Self {
            port,
            target: SheetTarget {
                spreadsheet_id,
                sheet_name: with_default("SHEET_NAME", DEFAULT_SHEET_NAME),
                start_cell: with_default("SHEET_START_CELL", DEFAULT_START_CELL),
            },
            credentials: ServiceAccount {
                client_email,
                private_key,
                scopes: vec![with_default("GOOGLE_SCOPE", DEFAULT_SCOPE)],
                token_uri: with_default("GOOGLE_TOKEN_URI", DEFAULT_TOKEN_URI),
            },
            sheets_endpoint: with_default("SHEETS_API_ENDPOINT", DEFAULT_SHEETS_ENDPOINT),
            form: FormSchema::new(columns, required_fields),
            cache_credentials,
            success_message: optional("SUBMIT_SUCCESS_MESSAGE"),
            request_timeout,
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
