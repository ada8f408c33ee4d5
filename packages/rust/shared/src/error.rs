//! Error types for civis.
//!
//! Library crates use [`CivisError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for every civis operation.
#[derive(Debug, thiserror::Error)]
pub enum CivisError {
    /// The field registry was queried with a key it never declared.
    #[error("unknown field key: {key}")]
    UnknownFieldKey { key: String },

    /// One or more required fields resolved to an empty value.
    ///
    /// Carries every candidate variable name of every missing field.
    #[error("missing required env vars: {}", names.join(", "))]
    MissingRequiredFields { names: Vec<String> },

    /// The built event could not be encoded as JSON.
    #[error("error encoding ci pipeline visibility: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport failure or a rejecting response from the intake endpoint.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CivisError>;

impl CivisError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an unknown-key error.
    pub fn unknown_key(key: impl Into<String>) -> Self {
        Self::UnknownFieldKey { key: key.into() }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
