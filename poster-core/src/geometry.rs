//! Gesture results to element geometry.
//!
//! A resize/rotate gesture reports raw scale factors relative to the
//! element's stored size. They are folded into an absolute width/height here
//! and never stored, so repeated transforms cannot compound scale drift.

use crate::element::{Element, ElementKind, MIN_FONT_SIZE};
use crate::patch::{ElementPatch, KindPatch, TextPatch};

/// Clamp a width or height to `min`. Positive overflow saturates at
/// `f32::MAX`; NaN and negative infinity collapse to `min`.
#[must_use]
pub fn clamp_dimension(value: f32, min: f32) -> f32 {
    if value.is_infinite() && value.is_sign_positive() {
        f32::MAX
    } else if value.is_finite() {
        value.max(min)
    } else {
        min
    }
}

/// Rotation as shown to the user, in `[0, 360)`.
#[must_use]
pub fn normalize_rotation(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Turn the end of a resize/rotate gesture into an update for `element`.
///
/// `width = max(min, width * scale_x)`, `height = max(min, height * scale_y)`,
/// and position/rotation are taken as reported. Text elements also scale
/// their font size vertically, never below [`MIN_FONT_SIZE`]. Non-finite
/// scale factors count as 1.
#[must_use]
pub fn apply_transform_result(
    element: &Element,
    raw_scale_x: f32,
    raw_scale_y: f32,
    new_x: f32,
    new_y: f32,
    new_rotation: f32,
) -> ElementPatch {
    let scale_x = finite_or_one(raw_scale_x);
    let scale_y = finite_or_one(raw_scale_y);
    let min = element.min_size();
    let t = &element.transform;

    let mut patch = ElementPatch::new()
        .position(new_x, new_y)
        .size(
            clamp_dimension(t.width * scale_x, min),
            clamp_dimension(t.height * scale_y, min),
        )
        .rotation(new_rotation);

    if let ElementKind::Text { font_size, .. } = &element.kind {
        patch = patch.kind(KindPatch::Text(TextPatch {
            font_size: Some(clamp_dimension(font_size * scale_y, MIN_FONT_SIZE)),
            ..TextPatch::default()
        }));
    }

    patch
}

/// Turn the end of a drag gesture into a position-only update.
#[must_use]
pub fn apply_drag_result(new_x: f32, new_y: f32) -> ElementPatch {
    ElementPatch::new().position(new_x, new_y)
}

fn finite_or_one(scale: f32) -> f32 {
    if scale.is_finite() {
        scale
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ShapeType, BOX_MIN_SIZE, SHAPE_MIN_SIZE};

    fn applied(element: &Element, patch: &ElementPatch) -> Element {
        let mut out = element.clone();
        patch.apply_to(&mut out).expect("apply");
        out
    }

    #[test]
    fn test_scale_folds_into_size() {
        let rect = Element::shape(ShapeType::Rect);
        let patch = apply_transform_result(&rect, 1.5, 0.5, 12.0, 34.0, 45.0);
        assert_eq!(patch.width, Some(150.0));
        assert_eq!(patch.height, Some(50.0));
        assert_eq!(patch.x, Some(12.0));
        assert_eq!(patch.y, Some(34.0));
        assert_eq!(patch.rotation, Some(45.0));
        assert!(patch.kind.is_none());
    }

    #[test]
    fn test_min_size_per_variant() {
        let shape = Element::shape(ShapeType::Star);
        let patch = apply_transform_result(&shape, 0.001, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(patch.width, Some(SHAPE_MIN_SIZE));
        assert_eq!(patch.height, Some(SHAPE_MIN_SIZE));

        let image = Element::image("data:,", 300, 200);
        let patch = apply_transform_result(&image, -2.0, 0.01, 0.0, 0.0, 0.0);
        assert_eq!(patch.width, Some(BOX_MIN_SIZE));
        assert_eq!(patch.height, Some(BOX_MIN_SIZE));
    }

    #[test]
    fn test_text_font_scales_with_height() {
        let text = Element::text("Poster");
        let patch = apply_transform_result(&text, 1.0, 2.0, 0.0, 0.0, 0.0);
        let out = applied(&text, &patch);
        assert!(matches!(out.kind, ElementKind::Text { font_size, .. } if (font_size - 48.0).abs() < f32::EPSILON));

        let patch = apply_transform_result(&text, 1.0, 0.01, 0.0, 0.0, 0.0);
        let out = applied(&text, &patch);
        assert!(matches!(out.kind, ElementKind::Text { font_size, .. } if (font_size - MIN_FONT_SIZE).abs() < f32::EPSILON));
    }

    #[test]
    fn test_repeated_transforms_do_not_compound() {
        let mut rect = Element::shape(ShapeType::Rect);
        for _ in 0..3 {
            let patch = apply_transform_result(&rect, 2.0, 1.0, 0.0, 0.0, 0.0);
            rect = applied(&rect, &patch);
        }
        assert!((rect.transform.width - 800.0).abs() < f32::EPSILON);
        assert!((rect.transform.height - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_non_finite_scale_is_identity() {
        let rect = Element::shape(ShapeType::Rect);
        let patch = apply_transform_result(&rect, f32::NAN, f32::INFINITY, 0.0, 0.0, 0.0);
        assert_eq!(patch.width, Some(100.0));
        assert_eq!(patch.height, Some(100.0));
    }

    #[test]
    fn test_overflowing_scale_stays_large() {
        let rect = Element::shape(ShapeType::Rect);
        let patch = apply_transform_result(&rect, 1e37, 1.0, 0.0, 0.0, 0.0);
        assert_eq!(patch.width, Some(f32::MAX));
        assert_eq!(patch.height, Some(100.0));

        assert!((clamp_dimension(f32::NEG_INFINITY, 5.0) - 5.0).abs() < f32::EPSILON);
        assert!((clamp_dimension(f32::NAN, 5.0) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_normalize_rotation() {
        assert!((normalize_rotation(370.0) - 10.0).abs() < 1e-4);
        assert!((normalize_rotation(-90.0) - 270.0).abs() < 1e-4);
        assert!(normalize_rotation(720.0).abs() < 1e-4);
        assert!(normalize_rotation(f32::NAN).abs() < f32::EPSILON);
    }

    #[test]
    fn test_drag_result() {
        let patch = apply_drag_result(-5.0, 1200.0);
        assert_eq!(patch.x, Some(-5.0));
        assert_eq!(patch.y, Some(1200.0));
        assert!(patch.width.is_none());
    }
}
