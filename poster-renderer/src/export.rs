//! Document export to raster images.
//!
//! Renders a [`DocumentSnapshot`] to PNG or JPEG using an SVG intermediate
//! representation and the resvg/tiny-skia rasterization pipeline.

use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use image::ImageEncoder;
use poster_core::{DocumentSnapshot, Element, ElementKind, ShapeType, TextAlign};
use usvg::fontdb;

use crate::error::{RenderError, RenderResult};
use crate::image::SourceResolver;

/// Largest output edge in pixels.
pub const MAX_EXPORT_DIMENSION: u32 = 16_384;

/// Baseline-to-baseline distance as a multiple of the font size.
const LINE_HEIGHT: f32 = 1.2;

/// Distinguishes exports made within the same millisecond.
static EXPORT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Export output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// PNG image.
    #[default]
    Png,
    /// JPEG image.
    Jpeg,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// MIME type of the encoded bytes.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(RenderError::Export(format!(
                "Unsupported export format: {other}"
            ))),
        }
    }
}

/// Configuration for document export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output format.
    pub format: ExportFormat,
    /// Background color as RGBA bytes; alpha is always painted as 255.
    pub background: [u8; 4],
    /// JPEG quality 1-100 (default: 85).
    pub jpeg_quality: u8,
    /// Output pixels per canvas unit (e.g. 2.0 for retina).
    pub pixel_ratio: f32,
    /// Directory relative image paths are resolved against.
    pub resources_dir: Option<PathBuf>,
    /// Load the system fonts for text rendering.
    pub system_fonts: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            background: [255, 255, 255, 255],
            jpeg_quality: 85,
            pixel_ratio: 1.0,
            resources_dir: None,
            system_fonts: true,
        }
    }
}

/// One encoded export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name, `poster-<unix-ms>-<seq>.<ext>`.
    pub file_name: String,
    /// Encoding of `bytes`.
    pub format: ExportFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoded image.
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_in(&self, dir: &Path) -> RenderResult<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .map_err(|e| RenderError::Export(format!("Failed to write {}: {e}", path.display())))?;
        Ok(path)
    }
}

/// Exports document snapshots to raster images.
pub struct PosterExporter {
    config: ExportConfig,
    fontdb: Arc<fontdb::Database>,
    resolver: SourceResolver,
}

impl std::fmt::Debug for PosterExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosterExporter")
            .field("config", &self.config)
            .field("fonts", &self.fontdb.len())
            .finish_non_exhaustive()
    }
}

impl PosterExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        let fontdb = Arc::new(load_fonts(config.system_fonts));
        let resolver = config
            .resources_dir
            .clone()
            .map_or_else(SourceResolver::new, SourceResolver::with_base_dir);
        Self {
            config,
            fontdb,
            resolver,
        }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Number of font faces available for text.
    #[must_use]
    pub fn font_faces(&self) -> usize {
        self.fontdb.len()
    }

    /// Export a snapshot in the configured format.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas size cannot be rendered or encoding
    /// fails.
    pub fn export(&self, snapshot: &DocumentSnapshot) -> RenderResult<ExportArtifact> {
        self.export_as(snapshot, self.config.format)
    }

    /// Export a snapshot in a specific format.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas size cannot be rendered or encoding
    /// fails.
    pub fn export_as(
        &self,
        snapshot: &DocumentSnapshot,
        format: ExportFormat,
    ) -> RenderResult<ExportArtifact> {
        let pixmap = self.render_pixmap(snapshot)?;
        let (width, height) = (pixmap.width(), pixmap.height());
        let bytes = match format {
            ExportFormat::Png => pixmap
                .encode_png()
                .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?,
            ExportFormat::Jpeg => self.encode_jpeg(&pixmap)?,
        };
        let artifact = ExportArtifact {
            file_name: next_file_name(format),
            format,
            width,
            height,
            bytes,
        };
        tracing::info!(
            file = %artifact.file_name,
            width,
            height,
            bytes = artifact.bytes.len(),
            revision = snapshot.revision,
            "Exported poster"
        );
        Ok(artifact)
    }

    /// Rasterize a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas size cannot be rendered.
    pub fn render_pixmap(&self, snapshot: &DocumentSnapshot) -> RenderResult<tiny_skia::Pixmap> {
        let (px_w, px_h) = self.output_dimensions(snapshot)?;
        let svg = self.render_to_svg(snapshot)?;

        let opt = usvg::Options {
            resources_dir: self.config.resources_dir.clone(),
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opt)
            .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

        let mut pixmap = tiny_skia::Pixmap::new(px_w, px_h)
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }

    /// Build the SVG intermediate for a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas size cannot be rendered.
    pub fn render_to_svg(&self, snapshot: &DocumentSnapshot) -> RenderResult<String> {
        let (out_w, out_h) = self.output_dimensions(snapshot)?;
        let view_w = snapshot.canvas_size.width;
        let view_h = snapshot.canvas_size.height;

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
        );

        let [r, g, b, _] = self.config.background;
        let _ = write!(
            svg,
            "<rect x=\"0\" y=\"0\" width=\"{view_w}\" height=\"{view_h}\" fill=\"rgb({r},{g},{b})\"/>",
        );

        for element in snapshot.paint_order() {
            self.render_element_svg(&mut svg, element);
        }

        svg.push_str("</svg>");
        Ok(svg)
    }

    /// Output size in pixels, validated.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn output_dimensions(&self, snapshot: &DocumentSnapshot) -> RenderResult<(u32, u32)> {
        let size = snapshot.canvas_size;
        let ratio = self.config.pixel_ratio;
        let invalid = || RenderError::InvalidCanvas {
            width: size.width * ratio,
            height: size.height * ratio,
        };

        let to_pixels = |edge: f32| -> Option<u32> {
            let scaled = (edge * ratio).round();
            (scaled.is_finite() && scaled >= 1.0 && scaled <= MAX_EXPORT_DIMENSION as f32)
                .then_some(scaled as u32)
        };

        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(invalid());
        }
        let width = to_pixels(size.width).ok_or_else(invalid)?;
        let height = to_pixels(size.height).ok_or_else(invalid)?;
        Ok((width, height))
    }

    fn encode_jpeg(&self, pixmap: &tiny_skia::Pixmap) -> RenderResult<Vec<u8>> {
        let (width, height) = (pixmap.width(), pixmap.height());
        // The background is opaque, so dropping alpha loses nothing.
        let rgb_data: Vec<u8> = pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|pixel| [pixel[0], pixel[1], pixel[2]])
            .collect();

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// Render a single element to SVG, in its own translated and rotated
    /// group.
    #[allow(clippy::cast_precision_loss)]
    fn render_element_svg(&self, svg: &mut String, element: &Element) {
        let tf = &element.transform;
        let (w, h) = (tf.width, tf.height);

        let body = match &element.kind {
            ElementKind::Shape {
                shape_type,
                fill_color,
                stroke_color,
                stroke_width,
            } => {
                let fill = escape_xml(fill_color);
                let stroke = if *stroke_width > 0.0 {
                    escape_xml(stroke_color)
                } else {
                    "none".to_string()
                };
                let paint = format!("fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"");
                shape_svg(*shape_type, w, h, &paint)
            }

            ElementKind::Text {
                text_content,
                font_size,
                font_family,
                font_weight,
                color,
                text_align,
            } => {
                let (anchor, ax) = match text_align {
                    TextAlign::Left => ("start", 0.0),
                    TextAlign::Center => ("middle", w / 2.0),
                    TextAlign::Right => ("end", w),
                };
                let mut text = format!(
                    "<text font-family=\"{}, sans-serif\" font-size=\"{font_size}\" font-weight=\"{}\" fill=\"{}\" text-anchor=\"{anchor}\" xml:space=\"preserve\">",
                    escape_xml(font_family),
                    font_weight.css_value(),
                    escape_xml(color),
                );
                for (line_no, line) in text_content.split('\n').enumerate() {
                    let baseline = font_size + line_no as f32 * font_size * LINE_HEIGHT;
                    let _ = write!(
                        text,
                        "<tspan x=\"{ax}\" y=\"{baseline}\">{}</tspan>",
                        escape_xml(line)
                    );
                }
                text.push_str("</text>");
                text
            }

            ElementKind::Image { src } => {
                let embedded = self
                    .resolver
                    .load(src)
                    .and_then(|decoded| decoded.to_embedded_uri());
                match embedded {
                    Ok(href) => format!(
                        "<image width=\"{w}\" height=\"{h}\" preserveAspectRatio=\"none\" href=\"{href}\"/>",
                    ),
                    Err(e) => {
                        tracing::warn!(id = %element.id, "Skipping image that no longer loads: {e}");
                        return;
                    }
                }
            }
        };

        let _ = write!(
            svg,
            "<g transform=\"translate({} {}) rotate({})\" opacity=\"{}\">{body}</g>",
            tf.x,
            tf.y,
            tf.rotation,
            element.effective_opacity(),
        );
    }
}

/// Geometry of a shape inside its `w × h` box.
fn shape_svg(shape_type: ShapeType, w: f32, h: f32, paint: &str) -> String {
    match shape_type {
        ShapeType::Rect => format!("<rect width=\"{w}\" height=\"{h}\" {paint}/>"),
        ShapeType::Circle => {
            let (rx, ry) = (w / 2.0, h / 2.0);
            format!("<ellipse cx=\"{rx}\" cy=\"{ry}\" rx=\"{rx}\" ry=\"{ry}\" {paint}/>")
        }
        ShapeType::Triangle => {
            let mid = w / 2.0;
            format!("<polygon points=\"{mid},0 {w},{h} 0,{h}\" {paint}/>")
        }
        ShapeType::Star => {
            let points = star_points(w, h)
                .iter()
                .map(|(x, y)| format!("{x},{y}"))
                .collect::<Vec<_>>()
                .join(" ");
            format!("<polygon points=\"{points}\" {paint}/>")
        }
    }
}

/// Vertices of a five-pointed star centered in the box, starting at the top.
#[allow(clippy::cast_precision_loss)]
fn star_points(w: f32, h: f32) -> Vec<(f32, f32)> {
    let (cx, cy) = (w / 2.0, h / 2.0);
    (0..10)
        .map(|i| {
            let angle = -std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
            let scale = if i % 2 == 0 { 1.0 } else { 0.5 };
            (
                cx + cx * scale * angle.cos(),
                cy + cy * scale * angle.sin(),
            )
        })
        .collect()
}

fn load_fonts(system_fonts: bool) -> fontdb::Database {
    let mut db = fontdb::Database::new();
    if !system_fonts {
        return db;
    }
    db.load_system_fonts();

    let sans = fontdb::Query {
        families: &[fontdb::Family::SansSerif],
        ..fontdb::Query::default()
    };
    if db.query(&sans).is_none() {
        let fallback = db
            .faces()
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()));
        if let Some(family) = fallback {
            tracing::debug!(%family, "Using fallback sans-serif family");
            db.set_sans_serif_family(family);
        }
    }
    tracing::debug!(faces = db.len(), "Loaded system fonts");
    db
}

fn next_file_name(format: ExportFormat) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    let seq = EXPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("poster-{millis}-{seq}.{}", format.extension())
}

/// Parse a `#rrggbb` or `#rrggbbaa` color into RGBA bytes.
///
/// # Errors
///
/// Returns an error if the string is not a hex color.
pub fn parse_hex_color(input: &str) -> RenderResult<[u8; 4]> {
    let invalid = || RenderError::Export(format!("Invalid color: {input}"));
    let hex = input.strip_prefix('#').ok_or_else(invalid)?;
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok([channel(0)?, channel(2)?, channel(4)?, alpha])
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
