//! Error types for the catalog engine.
//!
//! [`ErrorPayload`] is the only error stored in catalog state. Transport-level
//! failures ([`ClientError`]) are normalized into it by the request executor;
//! callers of `dispatch` additionally see [`DispatchError`].

use crate::lifecycle::OperationKind;
use catalog_sync_runtime::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Error stored in the lifecycle state and returned to the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    /// Plain message, used for transport failures
    Message(String),
    /// Structured error body propagated verbatim from the service
    Structured(Map<String, Value>),
}

impl ErrorPayload {
    /// Text the view renders: the message itself, or a structured body's
    /// `message` field.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Message(message) => message.clone(),
            Self::Structured(body) => match body.get("message") {
                Some(Value::String(message)) => message.clone(),
                Some(other) => other.to_string(),
                None => Value::Object(body.clone()).to_string(),
            },
        }
    }

    /// Normalize a non-success response body.
    ///
    /// JSON objects are kept as structured bodies and JSON strings become
    /// messages. Anything else falls back to the raw text, or to a generic
    /// status message for an empty body.
    #[must_use]
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Self::Structured(map),
            Ok(Value::String(message)) => Self::Message(message),
            _ if !body.trim().is_empty() => Self::Message(body.trim().to_string()),
            _ => Self::Message(format!("Request failed with status code {status}")),
        }
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Failure of a single call made by a [`CatalogClient`](crate::client::CatalogClient).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request never produced a response (connection, timeout, TLS)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("Service error (status {status}): {payload}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Normalized response body
        payload: ErrorPayload,
    },

    /// The service refused the credential (401/403)
    #[error("Unauthorized (status {status}): {payload}")]
    Unauthorized {
        /// HTTP status code
        status: u16,
        /// Normalized response body
        payload: ErrorPayload,
    },

    /// An authorized operation was dispatched without a usable credential
    #[error("Missing credential for {0}")]
    MissingCredential(OperationKind),

    /// A success response could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether this is an authorization failure.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::MissingCredential(_))
    }

    /// Convert into the payload stored in catalog state.
    #[must_use]
    pub fn into_payload(self) -> ErrorPayload {
        match self {
            Self::Service { payload, .. } | Self::Unauthorized { payload, .. } => payload,
            Self::MissingCredential(kind) => {
                ErrorPayload::Message(format!("Authorization token is required to {}", kind.describe()))
            },
            Self::Transport(message) | Self::Decode(message) => ErrorPayload::Message(message),
        }
    }
}

/// Error returned by `CatalogEngine::dispatch`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// The command reached its rejected state; the error is also in state
    #[error("{kind} rejected: {error}")]
    Rejected {
        /// Operation that failed
        kind: OperationKind,
        /// Error written to the lifecycle state
        error: ErrorPayload,
    },

    /// The store refused the command or the outcome was not observed in time
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DispatchError {
    /// The rejection payload, if the command was rejected.
    #[must_use]
    pub const fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            Self::Rejected { error, .. } => Some(error),
            Self::Store(_) => None,
        }
    }
}

/// Invalid configuration value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL is empty or not http(s)
    #[error("Invalid base URL: {0:?}")]
    InvalidBaseUrl(String),

    /// Page size must be positive
    #[error("Page size must be greater than zero")]
    ZeroPageSize,

    /// A timeout must be positive
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    /// Broadcast capacity must be positive
    #[error("Broadcast capacity must be greater than zero")]
    ZeroCapacity,
}
