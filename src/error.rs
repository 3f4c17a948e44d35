//! Error types for questlog
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (validation, unknown id, bad credentials, no session)
//! - 3: Blocked by lifecycle guard (task already completed)
//! - 4: Operation failed (store, lock, network)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the questlog CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const GUARD_BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for questlog operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Task not found: {0}")]
    TodoNotFound(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("{code}: {message}")]
    AuthFailed { code: &'static str, message: String },

    // Lifecycle guard blocks (exit code 3)
    #[error("Task {0} is already completed")]
    AlreadyCompleted(String),

    #[error("Task {0} is completed and can no longer be edited")]
    EditCompleted(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::Validation { .. }
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::TodoNotFound(_)
            | Error::NotSignedIn
            | Error::AuthFailed { .. } => exit_codes::USER_ERROR,

            // Lifecycle guard blocks
            Error::AlreadyCompleted(_) | Error::EditCompleted(_) => exit_codes::GUARD_BLOCKED,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::Http(_)
            | Error::Watch(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured payload for machine consumers, where one exists.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Validation { field, .. } => Some(serde_json::json!({ "field": field })),
            Error::AuthFailed { code, .. } => Some(serde_json::json!({ "code": code })),
            Error::TodoNotFound(id) | Error::AlreadyCompleted(id) | Error::EditCompleted(id) => {
                Some(serde_json::json!({ "id": id }))
            }
            _ => None,
        }
    }
}

/// Result type alias for questlog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
