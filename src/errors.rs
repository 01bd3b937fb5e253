//! Standardized error types following the `error-idadmin-<domain>-<number>` format.

use axum::Json;
use http::StatusCode;
use serde_json::{Value, json};
use thiserror::Error;

/// Configuration errors that occur during application startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error when a required environment variable is not set
    #[error("error-idadmin-config-1 {0} must be set")]
    EnvVarRequired(String),

    /// Error when PORT cannot be parsed
    #[error("error-idadmin-config-2 Parsing PORT into u16 failed: {0:?}")]
    PortParsingFailed(std::num::ParseIntError),

    /// Error when version information is not available
    #[error("error-idadmin-config-3 One of GIT_HASH or CARGO_PKG_VERSION must be set")]
    VersionNotSet,

    /// Error when duration string cannot be parsed
    #[error("error-idadmin-config-4 Failed to parse duration '{0}': {1}")]
    DurationParsingFailed(String, String),

    /// Error when a duration does not fit into a token lifetime
    #[error("error-idadmin-config-5 Duration '{0}' exceeds the maximum token lifetime")]
    DurationOutOfRange(String),

    /// Error when boolean string cannot be parsed
    #[error(
        "error-idadmin-config-6 Failed to parse boolean '{0}': expected true/false/1/0/yes/no/on/off"
    )]
    BoolParsingFailed(String),
}

/// HTTP surface errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Error when a request names a child collection the entity does not have
    #[error("error-idadmin-http-1 Unknown collection: {0}")]
    UnknownCollection(String),
}

/// Errors raised by the admin manager. Every variant is converted into a
/// failed outcome at the manager boundary.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The supplied subject does not parse or does not resolve to a row
    #[error("Invalid subject")]
    InvalidSubject,

    /// The supplied child identifier does not parse
    #[error("Invalid subject or {0} id")]
    InvalidChildId(&'static str),

    /// One or more field values failed to parse or a required field was empty
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    /// The caller referenced a property name absent from the descriptor table
    #[error("Invalid property type {0}")]
    UnknownProperty(String),

    /// The store failed while loading or persisting
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AdminError {
    /// Single-message validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        AdminError::Validation(vec![message.into()])
    }
}

/// Database/storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Error when database connection fails
    #[error("error-idadmin-storage-1 Database connection failed: {0}")]
    ConnectionFailed(String),

    /// Error when query execution fails
    #[error("error-idadmin-storage-2 Query execution failed: {0}")]
    QueryFailed(String),

    /// Error when database operation fails
    #[error("error-idadmin-storage-3 Database error: {0}")]
    DatabaseError(String),

    /// Error when data validation fails
    #[error("error-idadmin-storage-4 Invalid data: {0}")]
    InvalidData(String),

    /// Error when requested resource is not found
    #[error("error-idadmin-storage-5 Not found: {0}")]
    NotFound(String),

    /// Error when a uniqueness constraint rejects the write
    #[error("error-idadmin-storage-6 Duplicate entry: {0}")]
    Duplicate(String),
}

impl From<HttpError> for (StatusCode, Json<Value>) {
    fn from(error: HttpError) -> Self {
        tracing::warn!(error = ?error, "Rejected request");
        let status = match error {
            HttpError::UnknownCollection(_) => StatusCode::NOT_FOUND,
        };
        (status, Json(json!({ "errors": [error.to_string()] })))
    }
}
