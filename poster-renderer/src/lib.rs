//! # Poster Renderer
//!
//! Compositing and raster export for poster documents.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────────┐   ┌─────────────┐   ┌──────────────┐   ┌──────────┐
//! │ DocumentSnapshot │ → │ SVG builder │ → │ usvg + resvg │ → │ PNG/JPEG │
//! └──────────────────┘   └─────────────┘   └──────────────┘   └──────────┘
//! ```
//!
//! Image sources are resolved by [`SourceResolver`], which also serves as
//! the editor's [`poster_core::ImageResolver`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod image;

pub use error::{RenderError, RenderResult};
pub use export::{
    parse_hex_color, ExportArtifact, ExportConfig, ExportFormat, PosterExporter,
    MAX_EXPORT_DIMENSION,
};
pub use crate::image::{DecodedImage, ImageFormat, SourceResolver};
