//! Error types for canvas operations.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
///
/// Every error is scoped to the single operation that raised it; none of
/// them leaves the document in a partially modified state.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// An element with this ID is already in the document.
    #[error("Duplicate element id: {0}")]
    DuplicateId(String),

    /// A patch or request targets the wrong element variant.
    #[error("Expected a {expected} element, got a {found} patch")]
    KindMismatch {
        /// Variant of the element.
        expected: &'static str,
        /// Variant the request was written for.
        found: &'static str,
    },

    /// An image source could not be decoded into pixel data.
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    /// Snapshot or command serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
