//! Image source loading.
//!
//! Image elements carry an opaque source string. Supported sources are
//! base64 and percent-encoded `data:` URIs and file paths (absolute, or
//! relative to a base directory).

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::Engine;
use poster_core::{CanvasResult, ImageInfo, ImageResolver};

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// MIME type the rasterizer accepts for embedded bytes of this format.
    #[must_use]
    pub const fn embeddable_mime(self) -> Option<&'static str> {
        match self {
            Self::Png => Some("image/png"),
            Self::Jpeg => Some("image/jpeg"),
            Self::WebP | Self::Unknown => None,
        }
    }
}

/// A decoded image source.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Format sniffed from the bytes.
    pub format: ImageFormat,
    /// The encoded bytes as read from the source.
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// Pixel dimensions.
    #[must_use]
    pub const fn info(&self) -> ImageInfo {
        ImageInfo {
            width: self.width,
            height: self.height,
        }
    }

    /// A base64 data URI the rasterizer can embed.
    ///
    /// PNG and JPEG bytes are embedded as-is; other formats are re-encoded
    /// as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if re-encoding fails.
    pub fn to_embedded_uri(&self) -> RenderResult<String> {
        let engine = base64::engine::general_purpose::STANDARD;
        if let Some(mime) = self.format.embeddable_mime() {
            return Ok(format!("data:{mime};base64,{}", engine.encode(&self.bytes)));
        }
        let img = image::load_from_memory(&self.bytes)
            .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;
        let mut png = Cursor::new(Vec::new());
        img.write_to(&mut png, image::ImageFormat::Png)
            .map_err(|e| RenderError::Resource(format!("Failed to re-encode image: {e}")))?;
        Ok(format!(
            "data:image/png;base64,{}",
            engine.encode(png.into_inner())
        ))
    }
}

/// Decode an image from raw bytes.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded.
pub fn load_image_from_bytes(data: Vec<u8>) -> RenderResult<DecodedImage> {
    let format = ImageFormat::from_magic_bytes(&data);

    let img = image::load_from_memory(&data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;

    Ok(DecodedImage {
        width: img.width(),
        height: img.height(),
        format,
        bytes: data,
    })
}

/// Decode the payload of a data URI.
///
/// Supports forms like `data:image/png;base64,iVBORw0KGgo...` and
/// percent-encoded payloads without `;base64`.
///
/// # Errors
///
/// Returns an error if the URI is malformed.
pub fn decode_data_uri(uri: &str) -> RenderResult<Vec<u8>> {
    let (metadata, payload) = split_data_uri(uri)?;
    if metadata.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))
    } else {
        Ok(percent_encoding::percent_decode_str(payload).collect())
    }
}

fn split_data_uri(uri: &str) -> RenderResult<(&str, &str)> {
    uri.strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))
}

/// Load and decode an image from a data URI.
///
/// The format is sniffed from the decoded bytes. A declared MIME type that
/// disagrees with them is logged and otherwise ignored.
///
/// # Errors
///
/// Returns an error if the data URI is malformed or the image cannot be
/// decoded.
pub fn load_image_from_data_uri(uri: &str) -> RenderResult<DecodedImage> {
    let (metadata, _) = split_data_uri(uri)?;
    let declared = ImageFormat::from_mime(metadata.split(';').next().unwrap_or_default());
    let decoded = load_image_from_bytes(decode_data_uri(uri)?)?;
    if declared != ImageFormat::Unknown
        && decoded.format != ImageFormat::Unknown
        && declared != decoded.format
    {
        tracing::warn!(
            ?declared,
            sniffed = ?decoded.format,
            "Data URI MIME type does not match image bytes"
        );
    }
    Ok(decoded)
}

/// Resolves image sources from data URIs and the filesystem.
#[derive(Debug, Clone, Default)]
pub struct SourceResolver {
    base_dir: Option<PathBuf>,
}

impl SourceResolver {
    /// Resolver for data URIs and absolute paths, with relative paths taken
    /// from the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `dir`.
    #[must_use]
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    /// Read and decode `src`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or decoded.
    pub fn load(&self, src: &str) -> RenderResult<DecodedImage> {
        if src.starts_with("data:") {
            return load_image_from_data_uri(src);
        }
        let path = self.path_for(src);
        let bytes = std::fs::read(&path).map_err(|e| {
            RenderError::Resource(format!("Failed to read {}: {e}", path.display()))
        })?;
        load_image_from_bytes(bytes)
    }

    fn path_for(&self, src: &str) -> PathBuf {
        let path = Path::new(src.strip_prefix("file://").unwrap_or(src));
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ImageResolver for SourceResolver {
    fn resolve(&self, src: &str) -> CanvasResult<ImageInfo> {
        let decoded = self.load(src)?;
        tracing::debug!(
            width = decoded.width,
            height = decoded.height,
            format = ?decoded.format,
            "Decoded image source"
        );
        Ok(decoded.info())
    }
}
