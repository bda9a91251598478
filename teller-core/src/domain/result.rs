//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input rejected before any network call is made
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Please enter a recipient username")]
    MissingRecipient,

    #[error("Please enter an amount")]
    MissingAmount,

    #[error("Amount must be a number")]
    NonNumericAmount,

    #[error("Amount is too large")]
    AmountOutOfRange,

    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Please enter a username")]
    MissingUsername,

    #[error("Please enter an email address")]
    MissingEmail,

    #[error("Please enter a password")]
    MissingPassword,
}

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not logged in. Please log in first.")]
    Unauthenticated,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network error calling {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    #[error("{message} (HTTP {status} from {endpoint})")]
    Service {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("A transfer is already in progress")]
    TransferInFlight,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Copyable classification of an [`Error`], carried by failed slices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthenticated,
    Validation,
    Network,
    Service { status: u16 },
    Decode,
    TransferInFlight,
    Config,
    Io,
}

impl Error {
    /// Create a service error from an HTTP status and message
    pub fn service(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(endpoint: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: msg.into(),
        }
    }

    /// Create a network error
    pub fn network(endpoint: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            message: msg.into(),
        }
    }

    /// The API endpoint a remote failure came from
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Error::Network { endpoint, .. }
            | Error::Service { endpoint, .. }
            | Error::Decode { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Unauthenticated => ErrorKind::Unauthenticated,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Network { .. } => ErrorKind::Network,
            Error::Service { status, .. } => ErrorKind::Service { status: *status },
            Error::Decode { .. } => ErrorKind::Decode,
            Error::TransferInFlight => ErrorKind::TransferInFlight,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) | Error::Json(_) => ErrorKind::Io,
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// For service errors this is exactly the server-supplied message.
    pub fn user_message(&self) -> String {
        match self {
            Error::Service { message, .. } => message.clone(),
            Error::Validation(v) => v.to_string(),
            other => other.to_string(),
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }

    /// Create a failed result tagged with the error's kind and endpoint
    pub fn failed_with(message: impl Into<String>, kind: ErrorKind, endpoint: Option<&str>) -> Self {
        let mut context = HashMap::new();
        if let Ok(kind) = serde_json::to_value(kind) {
            context.insert("error_kind".to_string(), kind);
        }
        if let Some(endpoint) = endpoint {
            context.insert("endpoint".to_string(), serde_json::Value::from(endpoint));
        }
        Self::fail_with_context(message, context)
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::failed_with(e.user_message(), e.kind(), e.endpoint()),
        }
    }
}
