//! Typed error hierarchy for the folio client.
//!
//! Three top-level enums cover the three layers:
//! - `RequestError`: a single call through the request pipeline
//! - `CatalogError`: talking to the catalog controller task
//! - `MutationError`: create/update/publish/unpublish/delete failures
//!
//! `AuthError` covers login, registration and logout.

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Message used when the server gives no usable explanation.
pub const GENERIC_REQUEST_FAILURE: &str = "Request failed";

/// Coarse classification of a [`RequestError`], used to pick a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure, or a failed response with nothing useful in it.
    Network,
    /// 401 or 403.
    Auth,
    /// 400 carrying field-indexed messages.
    Validation,
    /// 404.
    NotFound,
    /// Any other non-2xx response.
    Server,
}

/// Errors from one call through the request pipeline.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    /// Non-2xx response whose body was empty or not JSON.
    #[error("Request failed (HTTP {status})")]
    Unreadable { status: u16 },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },
}

impl RequestError {
    /// Build a status error from a failed response body.
    ///
    /// The message is taken from `detail`, then `error`, then falls back to
    /// [`GENERIC_REQUEST_FAILURE`]. Every key whose value is a list of strings
    /// is kept as a field error.
    pub fn from_response(status: u16, body: &Value) -> Self {
        let message = ["detail", "error"]
            .iter()
            .find_map(|key| body.get(key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_REQUEST_FAILURE.to_string());

        let mut fields = BTreeMap::new();
        if let Some(object) = body.as_object() {
            for (key, value) in object {
                let Some(items) = value.as_array() else {
                    continue;
                };
                let messages: Vec<String> = items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect();
                if !messages.is_empty() && messages.len() == items.len() {
                    fields.insert(key.clone(), messages);
                }
            }
        }

        RequestError::Status {
            status,
            message,
            fields,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } | RequestError::Unreadable { status } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::Network { .. } | RequestError::Decode { .. } => ErrorKind::Network,
            RequestError::Status { status, fields, .. } => match status {
                401 | 403 => ErrorKind::Auth,
                404 => ErrorKind::NotFound,
                400 if !fields.is_empty() => ErrorKind::Validation,
                _ => ErrorKind::Server,
            },
            RequestError::Unreadable { status } => match status {
                401 | 403 => ErrorKind::Auth,
                404 => ErrorKind::NotFound,
                _ => ErrorKind::Network,
            },
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    /// Server-provided message, if the server gave one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RequestError::Status { message, .. } if message != GENERIC_REQUEST_FAILURE => {
                Some(message)
            }
            _ => None,
        }
    }

    /// Server message, or `fallback` when there is none.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.server_message().unwrap_or(fallback)
    }

    /// Field-indexed validation messages (empty unless the server sent some).
    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            RequestError::Status { fields, .. } if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::Decode {
            message: err.to_string(),
        }
    }
}

/// Errors from talking to the catalog controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Catalog controller has shut down")]
    Closed,
}

/// Errors from the auth endpoints.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Login response did not include an access token")]
    MissingToken,

    #[error("Failed to persist session: {0}")]
    Storage(#[source] anyhow::Error),
}

/// Errors from the mutation coordinator.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<folio_model::MissingFields> for MutationError {
    fn from(err: folio_model::MissingFields) -> Self {
        MutationError::Invalid(err.to_string())
    }
}
