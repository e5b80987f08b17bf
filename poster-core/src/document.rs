//! The poster document: the single source of truth for canvas elements.
//!
//! Elements are kept in a `Vec` ordered bottom to top, and every element's
//! `z_index` equals its position in that `Vec`. Each structural change
//! (add, delete, reorder, clear) renumbers the whole collection so the
//! z-indices are always exactly `0..len`.

use serde::{Deserialize, Serialize};

use crate::patch::{ImagePatch, KindPatch};
use crate::{CanvasError, CanvasResult, DocumentSnapshot, Element, ElementId, ElementPatch};

/// Default canvas width in pixels.
pub const DEFAULT_WIDTH: f32 = 800.0;

/// Default canvas height in pixels.
pub const DEFAULT_HEIGHT: f32 = 600.0;

/// Fixed canvas dimensions, chosen when the document is created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl CanvasSize {
    /// Create a canvas size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Direction for [`Document::reorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
    /// Swap with the element directly above.
    Up,
    /// Swap with the element directly below.
    Down,
    /// Move above every other element.
    Top,
    /// Move below every other element.
    Bottom,
}

/// The authoritative in-memory poster.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Elements ordered bottom (index 0) to top.
    elements: Vec<Element>,
    /// Currently selected element, if any.
    selected: Option<ElementId>,
    canvas_size: CanvasSize,
    /// Bumped on every state change.
    revision: u64,
}

impl Document {
    /// Create an empty document with the given canvas size.
    #[must_use]
    pub fn new(canvas_size: CanvasSize) -> Self {
        Self {
            elements: Vec::new(),
            selected: None,
            canvas_size,
            revision: 0,
        }
    }

    /// Add an element on top of every existing element.
    ///
    /// Any `z_index` the caller set is ignored. Geometry and opacity are
    /// brought into range.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::DuplicateId`] if an element with the same ID is
    /// already present; the document is left unchanged.
    pub fn add(&mut self, mut element: Element) -> CanvasResult<ElementId> {
        if self.position(element.id).is_some() {
            tracing::warn!(id = %element.id, "Rejected element with duplicate id");
            return Err(CanvasError::DuplicateId(element.id.to_string()));
        }
        element.normalize();
        element.transform.z_index = self.elements.len();
        let id = element.id;
        tracing::debug!(%id, kind = element.kind.type_name(), z = element.transform.z_index, "Added element");
        self.elements.push(element);
        self.touch();
        Ok(id)
    }

    /// Merge `patch` into the element with the given ID.
    ///
    /// Returns `false` (and changes nothing) if the element does not exist,
    /// the patch targets a different element variant, or the patch carries
    /// an image source. Image sources only change once they have been
    /// decoded, through the editor's image loads.
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        if patch.image_src().is_some() {
            tracing::warn!(%id, "Image source changes must go through an image load");
            return false;
        }
        self.apply_patch(id, patch)
    }

    /// Point an image element at a source that has already been decoded.
    pub(crate) fn replace_image_source(&mut self, id: ElementId, src: String) -> bool {
        let patch = ElementPatch::new().kind(KindPatch::Image(ImagePatch { src: Some(src) }));
        self.apply_patch(id, &patch)
    }

    fn apply_patch(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        let Some(element) = self.elements.iter_mut().find(|e| e.id == id) else {
            tracing::debug!(%id, "Update ignored: element not found");
            return false;
        };
        match patch.apply_to(element) {
            Ok(()) => {
                tracing::debug!(%id, "Updated element");
                self.touch();
                true
            }
            Err(e) => {
                tracing::warn!(%id, "Update rejected: {e}");
                false
            }
        }
    }

    /// Remove an element, deselecting it if it was selected.
    ///
    /// Remaining elements keep their relative order and are renumbered so
    /// the z-indices stay contiguous. Returns the removed element, or `None`
    /// if it did not exist.
    pub fn delete(&mut self, id: ElementId) -> Option<Element> {
        let index = self.position(id)?;
        let removed = self.elements.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.renumber();
        self.touch();
        tracing::debug!(%id, "Deleted element");
        Some(removed)
    }

    /// Select an element, or deselect with `None`.
    ///
    /// The ID is not validated; selecting an unknown ID simply results in
    /// nothing being reported as selected. Returns whether the selection
    /// changed.
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        if self.selected == id {
            return false;
        }
        self.selected = id;
        self.touch();
        true
    }

    /// Move an element in the stacking order and renumber every element.
    ///
    /// Returns `false` if the element does not exist or is already at the
    /// requested boundary.
    pub fn reorder(&mut self, id: ElementId, direction: ReorderDirection) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let last = self.elements.len() - 1;
        match direction {
            ReorderDirection::Up if index < last => self.elements.swap(index, index + 1),
            ReorderDirection::Down if index > 0 => self.elements.swap(index, index - 1),
            ReorderDirection::Top if index < last => {
                let element = self.elements.remove(index);
                self.elements.push(element);
            }
            ReorderDirection::Bottom if index > 0 => {
                let element = self.elements.remove(index);
                self.elements.insert(0, element);
            }
            _ => return false,
        }
        self.renumber();
        self.touch();
        tracing::debug!(%id, ?direction, "Reordered element");
        true
    }

    /// Remove every element and clear the selection.
    pub fn clear(&mut self) {
        if self.elements.is_empty() && self.selected.is_none() {
            return;
        }
        self.elements.clear();
        self.selected = None;
        self.touch();
        tracing::debug!("Cleared document");
    }

    /// The selected element, if the selection refers to an existing element.
    #[must_use]
    pub fn selected(&self) -> Option<&Element> {
        self.selected.and_then(|id| self.get(id))
    }

    /// The selected ID, if it refers to an existing element.
    #[must_use]
    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected().map(|e| e.id)
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// All elements, bottom to top.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// All elements, top to bottom, as a layer list shows them.
    pub fn layers(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().rev()
    }

    /// Find the topmost element whose box contains the point.
    #[must_use]
    pub fn element_at(&self, x: f32, y: f32) -> Option<ElementId> {
        self.layers().find(|e| e.contains_point(x, y)).map(|e| e.id)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the document has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The canvas dimensions.
    #[must_use]
    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas_size
    }

    /// Counter bumped by every operation that changed the document.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Read-only projection for renderers.
    #[must_use]
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot::from_document(self)
    }

    fn position(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    fn renumber(&mut self) {
        for (z_index, element) in self.elements.iter_mut().enumerate() {
            element.transform.z_index = z_index;
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ShapeType;

    fn abc() -> (Document, ElementId, ElementId, ElementId) {
        let mut doc = Document::new(CanvasSize::default());
        let a = doc.add(Element::shape(ShapeType::Rect)).expect("add a");
        let b = doc.add(Element::shape(ShapeType::Circle)).expect("add b");
        let c = doc.add(Element::text("c")).expect("add c");
        (doc, a, b, c)
    }

    fn order(doc: &Document) -> Vec<ElementId> {
        doc.elements().iter().map(|e| e.id).collect()
    }

    fn z_indices(doc: &Document) -> Vec<usize> {
        doc.elements().iter().map(|e| e.transform.z_index).collect()
    }

    #[test]
    fn test_add_assigns_top_z_index() {
        let mut doc = Document::new(CanvasSize::default());
        for _ in 0..3 {
            let mut element = Element::shape(ShapeType::Rect);
            element.transform.z_index = 42;
            doc.add(element).expect("add");
        }
        assert_eq!(z_indices(&doc), vec![0, 1, 2]);
    }

    #[test]
    fn test_add_duplicate_id_rejected() {
        let mut doc = Document::new(CanvasSize::default());
        let element = Element::shape(ShapeType::Rect);
        doc.add(element.clone()).expect("first add");
        let revision = doc.revision();
        let result = doc.add(element);
        assert!(matches!(result, Err(CanvasError::DuplicateId(_))));
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.revision(), revision);
    }

    #[test]
    fn test_reorder_top_and_bottom() {
        let (mut doc, a, b, c) = abc();
        assert!(doc.reorder(a, ReorderDirection::Top));
        assert_eq!(order(&doc), vec![b, c, a]);
        assert_eq!(z_indices(&doc), vec![0, 1, 2]);

        let (mut doc, a, b, c) = abc();
        assert!(doc.reorder(c, ReorderDirection::Bottom));
        assert_eq!(order(&doc), vec![c, a, b]);
        assert_eq!(z_indices(&doc), vec![0, 1, 2]);
    }

    #[test]
    fn test_reorder_up_down_and_boundaries() {
        let (mut doc, a, b, c) = abc();
        assert!(doc.reorder(a, ReorderDirection::Up));
        assert_eq!(order(&doc), vec![b, a, c]);
        assert!(doc.reorder(c, ReorderDirection::Down));
        assert_eq!(order(&doc), vec![b, c, a]);

        let revision = doc.revision();
        assert!(!doc.reorder(a, ReorderDirection::Up));
        assert!(!doc.reorder(a, ReorderDirection::Top));
        assert!(!doc.reorder(b, ReorderDirection::Down));
        assert!(!doc.reorder(b, ReorderDirection::Bottom));
        assert!(!doc.reorder(ElementId::new(), ReorderDirection::Top));
        assert_eq!(doc.revision(), revision);
        assert_eq!(z_indices(&doc), vec![0, 1, 2]);
    }

    #[test]
    fn test_delete_compacts_and_deselects() {
        let (mut doc, a, b, c) = abc();
        doc.select(Some(b));
        let removed = doc.delete(b).expect("removed");
        assert_eq!(removed.id, b);
        assert!(doc.selected().is_none());
        assert_eq!(order(&doc), vec![a, c]);
        assert_eq!(z_indices(&doc), vec![0, 1]);
        assert!(doc.delete(b).is_none());
    }

    #[test]
    fn test_delete_unselected_keeps_selection() {
        let (mut doc, a, b, _) = abc();
        doc.select(Some(a));
        doc.delete(b);
        assert_eq!(doc.selected_id(), Some(a));
    }

    #[test]
    fn test_select_unknown_id_reports_nothing() {
        let (mut doc, ..) = abc();
        assert!(doc.select(Some(ElementId::new())));
        assert!(doc.selected().is_none());
        assert!(doc.selected_id().is_none());
        assert!(doc.select(None));
        assert!(!doc.select(None));
    }

    #[test]
    fn test_update_missing_is_noop() {
        let (mut doc, ..) = abc();
        let revision = doc.revision();
        assert!(!doc.update(ElementId::new(), &ElementPatch::new().position(1.0, 1.0)));
        assert_eq!(doc.revision(), revision);
    }

    #[test]
    fn test_update_cannot_touch_z_index_or_variant() {
        let (mut doc, a, ..) = abc();
        assert!(!doc.update(a, &ElementPatch::text_content("x")));
        assert!(doc.update(a, &ElementPatch::new().size(0.0, 300.0)));
        let element = doc.get(a).expect("exists");
        assert_eq!(element.kind.type_name(), "shape");
        assert_eq!(element.transform.z_index, 0);
        assert!((element.transform.width - 5.0).abs() < f32::EPSILON);
        assert!((element.transform.height - 300.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_update_refuses_undecoded_image_source() {
        let mut doc = Document::new(CanvasSize::default());
        let id = doc.add(Element::image("a.png", 10, 10)).expect("add");
        let revision = doc.revision();
        let patch = ElementPatch::new().kind(KindPatch::Image(ImagePatch {
            src: Some("b.png".to_string()),
        }));
        assert!(!doc.update(id, &patch));
        assert_eq!(doc.revision(), revision);

        assert!(doc.replace_image_source(id, "b.png".to_string()));
        let element = doc.get(id).expect("exists");
        assert!(matches!(&element.kind, crate::ElementKind::Image { src, .. } if src == "b.png"));
    }

    #[test]
    fn test_add_resets_non_finite_geometry() {
        let mut doc = Document::new(CanvasSize::default());
        let id = doc
            .add(
                Element::shape(ShapeType::Circle)
                    .with_position(f32::NAN, 5.0)
                    .with_rotation(f32::INFINITY),
            )
            .expect("add");
        let t = &doc.get(id).expect("exists").transform;
        assert!(t.x.abs() < f32::EPSILON);
        assert!((t.y - 5.0).abs() < f32::EPSILON);
        assert!(t.rotation.abs() < f32::EPSILON);
    }

    #[test]
    fn test_clear() {
        let (mut doc, a, ..) = abc();
        doc.select(Some(a));
        doc.clear();
        assert!(doc.is_empty());
        assert!(doc.selected().is_none());
        let revision = doc.revision();
        doc.clear();
        assert_eq!(doc.revision(), revision);
    }

    #[test]
    fn test_element_at_prefers_topmost() {
        let mut doc = Document::new(CanvasSize::default());
        let below = doc
            .add(Element::shape(ShapeType::Rect).with_position(0.0, 0.0))
            .expect("add");
        let above = doc
            .add(Element::shape(ShapeType::Rect).with_position(50.0, 50.0))
            .expect("add");
        assert_eq!(doc.element_at(75.0, 75.0), Some(above));
        assert_eq!(doc.element_at(10.0, 10.0), Some(below));
        assert_eq!(doc.element_at(500.0, 500.0), None);
    }

    #[test]
    fn test_layers_are_top_down() {
        let (doc, a, b, c) = abc();
        let layers: Vec<_> = doc.layers().map(|e| e.id).collect();
        assert_eq!(layers, vec![c, b, a]);
    }
}
