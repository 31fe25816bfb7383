//! Error types for document loading and mutation.

use thiserror::Error;

/// Errors raised while building or editing a [`crate::Document`].
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The input is not valid JSON, or could not be serialized back.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input parsed but its root is not an object.
    #[error("document root must be a JSON object, found {0}")]
    MalformedRoot(&'static str),

    /// A mutation targeted a buffer that is not in the document.
    #[error("buffer {0} does not exist")]
    MissingBuffer(usize),
}
