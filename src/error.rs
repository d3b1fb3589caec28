//! Error types for Memfog
//!
//! This module defines the error type used throughout the library. Uses
//! `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations. Interactive validation problems (a bad
//! menu selection, a duplicate title) are reported to the user directly and
//! never surface here.

use thiserror::Error;

/// The primary error type for Memfog operations.
#[derive(Error, Debug)]
pub enum MemfogError {
    /// Configuration-related errors (unreadable config.json, bad overrides, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record store errors surfaced by SQLite
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// External editor could not be launched or exited unsuccessfully
    #[error("Editor error: {0}")]
    Editor(String),

    /// Import file has the wrong shape
    #[error("Import error: {0}")]
    Import(String),

    /// Record id unknown to the store
    #[error("Not found: {0}")]
    NotFound(String),
}

/// A specialized `Result` type for Memfog operations.
pub type Result<T> = std::result::Result<T, MemfogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MemfogError::Config("MEMFOG_TOP must be a non-negative integer".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: MEMFOG_TOP must be a non-negative integer"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MemfogError = io_err.into();
        assert!(matches!(err, MemfogError::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let err: MemfogError = json_err.into();
        assert!(matches!(err, MemfogError::Json(_)));
    }

    #[test]
    fn test_error_from_sqlite() {
        let err: MemfogError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, MemfogError::Store(_)));
        assert!(err.to_string().starts_with("Store error:"));
    }

    #[test]
    fn test_not_found_display() {
        let err = MemfogError::NotFound("record 42".to_string());
        assert_eq!(err.to_string(), "Not found: record 42");
    }
}
