//! Error types for the check system
//!
//! Problems found in site content are reported as diagnostics. These errors
//! cover failures of the tool itself.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while running checks or maintenance commands
#[derive(Debug, Error)]
pub enum CheckError {
    /// Filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path involved in the failed operation
        path:   PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON input could not be read or written
    #[error("JSON error in {path}: {message}")]
    Json {
        /// Path of the JSON document
        path:    String,
        /// Parser or serializer message
        message: String,
    },

    /// Configuration file is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Site layout problem that prevents a command from running
    #[error("Site error: {0}")]
    Site(String),

    /// Invalid glob or regex pattern
    #[error("Invalid pattern: {0}")]
    Pattern(String),

    /// Directory traversal failed
    #[error("Failed to walk {path}: {message}")]
    Walk {
        /// Directory being walked
        path:    PathBuf,
        /// Walker message
        message: String,
    },
}

impl CheckError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type used across the check system
pub type CheckResult<T> = Result<T, CheckError>;
