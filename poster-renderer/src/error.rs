//! Renderer error types.

use poster_core::CanvasError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while resolving images or exporting.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An image source could not be read or decoded.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// The canvas cannot be rendered at the requested size.
    #[error("Invalid canvas size: {width}x{height}")]
    InvalidCanvas {
        /// Requested width in pixels.
        width: f32,
        /// Requested height in pixels.
        height: f32,
    },

    /// Building, rasterizing, or encoding the export failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl From<RenderError> for CanvasError {
    fn from(err: RenderError) -> Self {
        Self::ImageDecode(err.to_string())
    }
}
