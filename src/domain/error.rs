//! Domain-level error types for cursor-md-export.
//!
//! All errors are typed with `thiserror`. Per-record variants (`Decode`) are
//! logged and skipped by the scan loop; everything else aborts the command.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database file not found at expected location.
    #[error("Cursor database not found at: {path}")]
    DatabaseNotFound { path: PathBuf },

    /// Failed to open or query the database.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A stored record could not be decoded into a conversation.
    #[error("Failed to decode record '{key}': {message}")]
    Decode {
        key: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Stored record decoded but is not a user-visible conversation.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// No stored record for the requested session.
    #[error("Session not found: {id}")]
    SessionNotFound { id: String },

    /// A time argument matched none of the accepted formats.
    #[error("Invalid time '{value}': expected YYYY-MM-DD, YYYY-MM-DD HH:MM or YYYY-MM-DD HH:MM:SS")]
    InvalidTime { value: String },

    /// JSON serialization failed.
    #[error("JSON error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a database error from rusqlite error.
    pub fn database(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Create a JSON error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a decode error tagged with the originating store key.
    pub fn decode(key: impl Into<String>, err: serde_json::Error) -> Self {
        Self::Decode {
            key: key.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
