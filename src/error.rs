//! Error types for radix_manifest

use thiserror::Error;

/// Result type alias for radix_manifest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving or walking a manifest
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The loader could not produce data for a reference
    #[error("Fetch failed for {reference}: {reason}")]
    Fetch { reference: String, reason: String },

    /// Retrieved bytes are not a valid fork table
    #[error("Decode error: {0}")]
    Decode(String),

    /// No vertex stands for the requested path
    #[error("Path not found: {0}")]
    NotFound(String),

    /// Cooperative cancellation observed at a resolution checkpoint
    #[error("Walk cancelled at '{path}'")]
    Cancelled { path: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Corruption detected: {0}")]
    Corruption(String),

    #[error("Invalid store file: {0}")]
    InvalidFile(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn fetch(reference: &crate::Reference, reason: impl ToString) -> Self {
        Error::Fetch {
            reference: reference.to_hex(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn cancelled(path: &[u8]) -> Self {
        Error::Cancelled {
            path: String::from_utf8_lossy(path).into_owned(),
        }
    }

    pub(crate) fn not_found(path: &[u8]) -> Self {
        Error::NotFound(String::from_utf8_lossy(path).into_owned())
    }

    /// Whether this error is a cancellation rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }

    /// Whether this error is a lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
