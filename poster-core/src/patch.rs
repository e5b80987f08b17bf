//! Partial element updates.
//!
//! An [`ElementPatch`] carries the subset of attributes an `update` should
//! change. Shared geometry lives at the top level; variant-specific
//! attributes live in a [`KindPatch`] whose variant must match the element's.

use serde::{Deserialize, Serialize};

use crate::element::{clamp_opacity, Element, ElementKind, FontWeight, ShapeType, TextAlign};
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::clamp_dimension;

/// Shape-specific attributes to change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapePatch {
    /// New primitive.
    pub shape_type: Option<ShapeType>,
    /// New fill color.
    pub fill_color: Option<String>,
    /// New stroke color.
    pub stroke_color: Option<String>,
    /// New stroke width.
    pub stroke_width: Option<f32>,
}

/// Text-specific attributes to change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextPatch {
    /// New content.
    pub text_content: Option<String>,
    /// New font size.
    pub font_size: Option<f32>,
    /// New font family.
    pub font_family: Option<String>,
    /// New font weight.
    pub font_weight: Option<FontWeight>,
    /// New text color.
    pub color: Option<String>,
    /// New alignment.
    pub text_align: Option<TextAlign>,
}

/// Image-specific attributes to change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImagePatch {
    /// New image source.
    pub src: Option<String>,
}

/// Variant-specific part of a patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KindPatch {
    /// Applies to shape elements only.
    Shape(ShapePatch),
    /// Applies to text elements only.
    Text(TextPatch),
    /// Applies to image elements only.
    Image(ImagePatch),
}

impl KindPatch {
    const fn type_name(&self) -> &'static str {
        match self {
            Self::Shape(_) => "shape",
            Self::Text(_) => "text",
            Self::Image(_) => "image",
        }
    }
}

/// A partial update for one element. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    /// New x position.
    pub x: Option<f32>,
    /// New y position.
    pub y: Option<f32>,
    /// New width; clamped to the element's minimum.
    pub width: Option<f32>,
    /// New height; clamped to the element's minimum.
    pub height: Option<f32>,
    /// New rotation in degrees.
    pub rotation: Option<f32>,
    /// New opacity; clamped into `[0, 1]`.
    pub opacity: Option<f32>,
    /// Variant-specific attributes.
    pub kind: Option<KindPatch>,
}

impl ElementPatch {
    /// An empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the position.
    #[must_use]
    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Set the size.
    #[must_use]
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the rotation.
    #[must_use]
    pub fn rotation(mut self, degrees: f32) -> Self {
        self.rotation = Some(degrees);
        self
    }

    /// Set the opacity.
    #[must_use]
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Set the variant-specific part.
    #[must_use]
    pub fn kind(mut self, kind: KindPatch) -> Self {
        self.kind = Some(kind);
        self
    }

    /// A patch that only replaces the text content of a text element.
    #[must_use]
    pub fn text_content(text: impl Into<String>) -> Self {
        Self::new().kind(KindPatch::Text(TextPatch {
            text_content: Some(text.into()),
            ..TextPatch::default()
        }))
    }

    /// A patch that recolors an element: fill for shapes, color for text.
    ///
    /// Returns an empty patch for images, which have no color.
    #[must_use]
    pub fn recolor(element: &Element, color: impl Into<String>) -> Self {
        let color = color.into();
        match element.kind {
            ElementKind::Shape { .. } => Self::new().kind(KindPatch::Shape(ShapePatch {
                fill_color: Some(color),
                ..ShapePatch::default()
            })),
            ElementKind::Text { .. } => Self::new().kind(KindPatch::Text(TextPatch {
                color: Some(color),
                ..TextPatch::default()
            })),
            ElementKind::Image { .. } => Self::new(),
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// The new image source, if this patch carries one.
    #[must_use]
    pub fn image_src(&self) -> Option<&str> {
        match &self.kind {
            Some(KindPatch::Image(ImagePatch { src })) => src.as_deref(),
            _ => None,
        }
    }

    /// Merge this patch into `element`.
    ///
    /// The patch is applied atomically: if its variant-specific part targets
    /// a different variant, nothing is changed.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::KindMismatch`] if the variant does not match.
    pub fn apply_to(&self, element: &mut Element) -> CanvasResult<()> {
        if let Some(kind) = &self.kind {
            if kind.type_name() != element.kind.type_name() {
                return Err(CanvasError::KindMismatch {
                    expected: element.kind.type_name(),
                    found: kind.type_name(),
                });
            }
        }

        let min = element.min_size();
        let t = &mut element.transform;
        if let Some(x) = self.x.filter(|v| v.is_finite()) {
            t.x = x;
        }
        if let Some(y) = self.y.filter(|v| v.is_finite()) {
            t.y = y;
        }
        if let Some(width) = self.width {
            t.width = clamp_dimension(width, min);
        }
        if let Some(height) = self.height {
            t.height = clamp_dimension(height, min);
        }
        if let Some(rotation) = self.rotation.filter(|v| v.is_finite()) {
            t.rotation = rotation;
        }
        if let Some(opacity) = self.opacity {
            element.opacity = clamp_opacity(opacity);
        }

        match (&self.kind, &mut element.kind) {
            (
                Some(KindPatch::Shape(patch)),
                ElementKind::Shape {
                    shape_type,
                    fill_color,
                    stroke_color,
                    stroke_width,
                },
            ) => {
                assign(shape_type, patch.shape_type);
                assign(fill_color, patch.fill_color.clone());
                assign(stroke_color, patch.stroke_color.clone());
                assign(stroke_width, patch.stroke_width.map(|w| w.max(0.0)));
            }
            (
                Some(KindPatch::Text(patch)),
                ElementKind::Text {
                    text_content,
                    font_size,
                    font_family,
                    font_weight,
                    color,
                    text_align,
                },
            ) => {
                assign(text_content, patch.text_content.clone());
                assign(
                    font_size,
                    patch.font_size.filter(|s| s.is_finite() && *s > 0.0),
                );
                assign(font_family, patch.font_family.clone());
                assign(font_weight, patch.font_weight);
                assign(color, patch.color.clone());
                assign(text_align, patch.text_align);
            }
            (Some(KindPatch::Image(patch)), ElementKind::Image { src }) => {
                assign(src, patch.src.clone());
            }
            _ => {}
        }

        Ok(())
    }
}

fn assign<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ShapeType, SHAPE_MIN_SIZE};

    #[test]
    fn test_patch_merges_subset() {
        let mut element = Element::shape(ShapeType::Rect);
        ElementPatch::new()
            .position(-20.0, 900.0)
            .apply_to(&mut element)
            .expect("apply");
        assert!((element.transform.x + 20.0).abs() < f32::EPSILON);
        assert!((element.transform.y - 900.0).abs() < f32::EPSILON);
        assert!((element.transform.width - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_patch_clamps_size() {
        let mut element = Element::shape(ShapeType::Circle);
        ElementPatch::new()
            .size(1.0, -40.0)
            .apply_to(&mut element)
            .expect("apply");
        assert!((element.transform.width - SHAPE_MIN_SIZE).abs() < f32::EPSILON);
        assert!((element.transform.height - SHAPE_MIN_SIZE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_kind_mismatch_is_atomic() {
        let mut element = Element::shape(ShapeType::Rect);
        let before = element.clone();
        let patch = ElementPatch::text_content("nope").position(1.0, 1.0);
        let result = patch.apply_to(&mut element);
        assert!(matches!(result, Err(CanvasError::KindMismatch { .. })));
        assert_eq!(element, before);
    }

    #[test]
    fn test_recolor_targets_fill_or_text_color() {
        let mut shape = Element::shape(ShapeType::Star);
        ElementPatch::recolor(&shape, "#ff0000")
            .apply_to(&mut shape)
            .expect("apply");
        assert!(matches!(
            &shape.kind,
            ElementKind::Shape { fill_color, stroke_color, .. }
                if fill_color == "#ff0000" && stroke_color == "#1e40af"
        ));

        let mut text = Element::text("hello");
        ElementPatch::recolor(&text, "#00ff00")
            .apply_to(&mut text)
            .expect("apply");
        assert!(matches!(&text.kind, ElementKind::Text { color, .. } if color == "#00ff00"));

        let image = Element::image("data:,", 4, 4);
        assert!(ElementPatch::recolor(&image, "#123456").is_empty());
    }

    #[test]
    fn test_patch_json() {
        let patch: ElementPatch = serde_json::from_str(
            r#"{"width": 40, "kind": {"type": "text", "textContent": "Hi", "textAlign": "center"}}"#,
        )
        .expect("parse");
        assert_eq!(patch.width, Some(40.0));
        assert_eq!(
            patch.kind,
            Some(KindPatch::Text(TextPatch {
                text_content: Some("Hi".to_string()),
                text_align: Some(TextAlign::Center),
                ..TextPatch::default()
            }))
        );
    }
}
