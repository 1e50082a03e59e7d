//! Unified error handling for foodlink-core

use thiserror::Error;

/// Core error type for foodlink-core
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure: connection refused, timeout, DNS, ...
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response, or a 2xx body reporting `success: false`. `message`
    /// is the server's `message` field or `HTTP <status>`.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Another session operation is still running
    #[error("Operation already in progress: {0}")]
    OperationInProgress(&'static str),

    #[error("Not authenticated")]
    NotAuthenticated,
}

/// Result type alias for foodlink-core
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an API error from a status code and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Error::InvalidResponse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when there are no usable credentials: signed out, or a 401/403
    pub fn is_auth_error(&self) -> bool {
        match self {
            Error::NotAuthenticated => true,
            Error::Api { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Network("Request timed out".to_string())
        } else if err.is_connect() {
            Error::Network("Connection failed".to_string())
        } else if err.is_decode() {
            Error::InvalidResponse(err.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}

// Convert to String for front ends that surface plain messages
impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
