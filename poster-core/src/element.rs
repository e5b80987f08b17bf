//! Canvas elements - the building blocks of a poster.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum width/height of a shape element.
pub const SHAPE_MIN_SIZE: f32 = 5.0;

/// Minimum width/height of a text or image element.
pub const BOX_MIN_SIZE: f32 = 10.0;

/// Smallest font size a resize gesture can produce.
pub const MIN_FONT_SIZE: f32 = 8.0;

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(input: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(input).map(Self)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geometric primitive drawn by a shape element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    /// Axis-aligned rectangle filling the element box.
    Rect,
    /// Ellipse inscribed in the element box.
    Circle,
    /// Isosceles triangle with its apex at the top center.
    Triangle,
    /// Five-pointed star centered in the element box.
    Star,
}

/// Horizontal alignment of text inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// CSS-style font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "FontWeightRepr", into = "FontWeightRepr")]
pub enum FontWeight {
    /// Regular weight (400).
    #[default]
    Normal,
    /// Bold weight (700).
    Bold,
    /// One step bolder than the inherited weight.
    Bolder,
    /// One step lighter than the inherited weight.
    Lighter,
    /// Explicit numeric weight in `1..=1000`.
    Numeric(u16),
}

impl FontWeight {
    /// The value as written in CSS/SVG `font-weight`.
    #[must_use]
    pub fn css_value(self) -> String {
        match self {
            Self::Normal => "normal".to_string(),
            Self::Bold => "bold".to_string(),
            Self::Bolder => "bolder".to_string(),
            Self::Lighter => "lighter".to_string(),
            Self::Numeric(weight) => weight.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FontWeightRepr {
    Numeric(u16),
    Keyword(String),
}

impl TryFrom<FontWeightRepr> for FontWeight {
    type Error = String;

    fn try_from(repr: FontWeightRepr) -> Result<Self, Self::Error> {
        match repr {
            FontWeightRepr::Numeric(weight) if (1..=1000).contains(&weight) => {
                Ok(Self::Numeric(weight))
            }
            FontWeightRepr::Numeric(weight) => Err(format!("font weight out of range: {weight}")),
            FontWeightRepr::Keyword(keyword) => match keyword.as_str() {
                "normal" => Ok(Self::Normal),
                "bold" => Ok(Self::Bold),
                "bolder" => Ok(Self::Bolder),
                "lighter" => Ok(Self::Lighter),
                other => Err(format!("unknown font weight: {other}")),
            },
        }
    }
}

impl From<FontWeight> for FontWeightRepr {
    fn from(weight: FontWeight) -> Self {
        match weight {
            FontWeight::Numeric(value) => Self::Numeric(value),
            other => Self::Keyword(other.css_value()),
        }
    }
}

/// The type of content an element contains.
///
/// Every consumer matches on this exhaustively; the variant of an element
/// never changes after it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ElementKind {
    /// A filled and stroked geometric primitive.
    Shape {
        /// Which primitive to draw.
        shape_type: ShapeType,
        /// Fill color as hex.
        fill_color: String,
        /// Stroke color as hex.
        stroke_color: String,
        /// Stroke width in pixels.
        stroke_width: f32,
    },

    /// A block of text.
    Text {
        /// Text content; may contain newlines.
        text_content: String,
        /// Font size in pixels.
        font_size: f32,
        /// Font family name.
        font_family: String,
        /// Font weight.
        font_weight: FontWeight,
        /// Text color as hex.
        color: String,
        /// Horizontal alignment inside the element box.
        text_align: TextAlign,
    },

    /// A raster image.
    Image {
        /// Image source: a data URI or a path resolvable to pixel data.
        src: String,
    },
}

impl ElementKind {
    /// Smallest width/height an element of this kind may have.
    #[must_use]
    pub const fn min_size(&self) -> f32 {
        match self {
            Self::Shape { .. } => SHAPE_MIN_SIZE,
            Self::Text { .. } | Self::Image { .. } => BOX_MIN_SIZE,
        }
    }

    /// Short lowercase name of the variant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Shape { .. } => "shape",
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
        }
    }
}

/// Position, size, rotation and depth of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transform {
    /// X position of the top-left corner.
    pub x: f32,
    /// Y position of the top-left corner.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Rotation in degrees about the top-left corner.
    pub rotation: f32,
    /// Depth rank; assigned by the document, 0 is the bottom layer.
    pub z_index: usize,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
            z_index: 0,
        }
    }
}

/// A canvas element with content and transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier.
    #[serde(default)]
    pub id: ElementId,
    /// Element content type.
    pub kind: ElementKind,
    /// Position and size.
    #[serde(default)]
    pub transform: Transform,
    /// Opacity in `[0, 1]`; `None` means fully opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

impl Element {
    /// Create a new element with the given kind and a default transform.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            transform: Transform::default(),
            opacity: Some(1.0),
        }
    }

    /// A shape with the editor's default colors at (100, 100), 100×100.
    #[must_use]
    pub fn shape(shape_type: ShapeType) -> Self {
        Self::new(ElementKind::Shape {
            shape_type,
            fill_color: "#3b82f6".to_string(),
            stroke_color: "#1e40af".to_string(),
            stroke_width: 2.0,
        })
        .with_position(100.0, 100.0)
        .with_size(100.0, 100.0)
    }

    /// A text block with the editor's default font at (100, 100), 200×50.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(ElementKind::Text {
            text_content: content.into(),
            font_size: 24.0,
            font_family: "Arial".to_string(),
            font_weight: FontWeight::Normal,
            color: "#000000".to_string(),
            text_align: TextAlign::Left,
        })
        .with_position(100.0, 100.0)
        .with_size(200.0, 50.0)
    }

    /// An image at (50, 50) with its natural pixel size.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn image(src: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(ElementKind::Image { src: src.into() })
            .with_position(50.0, 50.0)
            .with_size(width as f32, height as f32)
    }

    /// Set the identifier.
    #[must_use]
    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = id;
        self
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the top-left position.
    #[must_use]
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.transform.x = x;
        self.transform.y = y;
        self
    }

    /// Set the size.
    #[must_use]
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.transform.width = width;
        self.transform.height = height;
        self
    }

    /// Set the rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.transform.rotation = degrees;
        self
    }

    /// Set the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: Option<f32>) -> Self {
        self.opacity = opacity;
        self
    }

    /// Opacity to paint with; absent means fully opaque.
    #[must_use]
    pub fn effective_opacity(&self) -> f32 {
        self.opacity.unwrap_or(1.0)
    }

    /// Smallest width/height this element may have.
    #[must_use]
    pub const fn min_size(&self) -> f32 {
        self.kind.min_size()
    }

    /// Check if a point (in canvas coordinates) is within this element's
    /// unrotated box.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let t = &self.transform;
        x >= t.x && x <= t.x + t.width && y >= t.y && y <= t.y + t.height
    }

    /// Bring geometry and opacity back inside their legal ranges.
    /// Non-finite position or rotation becomes 0.
    pub(crate) fn normalize(&mut self) {
        let min = self.min_size();
        let t = &mut self.transform;
        for value in [&mut t.x, &mut t.y, &mut t.rotation] {
            if !value.is_finite() {
                *value = 0.0;
            }
        }
        self.transform.width = crate::geometry::clamp_dimension(self.transform.width, min);
        self.transform.height = crate::geometry::clamp_dimension(self.transform.height, min);
        self.opacity = self.opacity.and_then(clamp_opacity);
    }
}

/// Clamp an opacity into `[0, 1]`, discarding non-finite values.
pub(crate) fn clamp_opacity(opacity: f32) -> Option<f32> {
    opacity.is_finite().then(|| opacity.clamp(0.0, 1.0))
}
