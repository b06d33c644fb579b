//! Error types shared across KSG crates.

use std::path::PathBuf;

/// Top-level error type for KSG operations.
#[derive(Debug, thiserror::Error)]
pub enum KsgError {
    /// The input project file could not be parsed.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Missing or invalid profile settings, or an unusable configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A media source lacks metadata the animator needs.
    #[error("Data error: {message}")]
    Data { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    IoAt {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using KsgError.
pub type KsgResult<T> = Result<T, KsgError>;

impl KsgError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data {
            message: msg.into(),
        }
    }
}
