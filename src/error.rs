//! Unified error types for lexdrill.
//!
//! Configuration errors are detected once, before a session starts. Storage
//! errors during a session are fatal to that session: the last answer cannot
//! be assumed recorded, so callers abort instead of retrying.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for lexdrill operations.
#[derive(Error, Debug)]
pub enum DrillError {
    /// I/O errors from files next to the store (definition cache, imports).
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failures reported by the embedded database.
    #[error("database error: {message}")]
    Database { message: String },

    /// Another process holds the database write lock.
    #[error("database is locked by another process: {message}")]
    LockTimeout { message: String },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// State machine violations (invalid transitions).
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// A collection or lookup target does not exist.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// Invalid configuration, including an unusable interval table.
    #[error("config error: {message}")]
    Config { message: String },

    /// Malformed input rejected before anything is written.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// A specialized Result type for lexdrill operations.
pub type Result<T> = std::result::Result<T, DrillError>;

impl DrillError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a collection not found error.
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "collection",
            name: name.into(),
        }
    }

    /// Create a definition not found error.
    pub fn definition_not_found(word: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "definition",
            name: word.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether this error means the store can no longer be trusted for the
    /// current session.
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Database { .. } | Self::LockTimeout { .. }
        )
    }

    /// Whether this error reports a missing collection or definition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<io::Error> for DrillError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for DrillError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for DrillError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
                Self::LockTimeout {
                    message: err.to_string(),
                }
            }
            _ => Self::Database {
                message: err.to_string(),
            },
        }
    }
}

/// Exit codes for the lexdrill CLI.
pub mod exit_codes {
    /// Command completed.
    pub const SUCCESS: i32 = 0;

    /// Command failed with a reported error.
    pub const ERROR: i32 = 1;

    /// The process panicked.
    pub const CRASH: i32 = 3;
}
