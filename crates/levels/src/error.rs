//! Error types for the levels crate

use swlevel_core::{CoreError, ObjectId};
use swlevel_protocol::WireError;

/// Level-specific error types
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// File I/O error
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    /// Document JSON could not be read or written
    #[error("Document error: {0}")]
    DocumentError(#[from] serde_json::Error),

    /// Byte-level encode/decode failure
    #[error("Wire error: {0}")]
    Wire(#[from] WireError),

    /// A layer the format needs is not in the document
    #[error("Missing layer: {0}")]
    MissingLayer(String),

    /// Object cannot be placed or classified
    #[error("Invalid object {id}: {message}")]
    InvalidObject { id: ObjectId, message: String },

    /// Format has no reader or no writer
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Format name not registered
    #[error("Unknown format: {0}")]
    UnknownFormat(String),
}

impl From<LevelError> for CoreError {
    fn from(err: LevelError) -> Self {
        match err {
            LevelError::FileError(io) => CoreError::Io(io),
            LevelError::UnknownFormat(name) => CoreError::NotFound(name),
            other => CoreError::InvalidData(other.to_string()),
        }
    }
}

/// Result type for level operations
pub type Result<T> = std::result::Result<T, LevelError>;
