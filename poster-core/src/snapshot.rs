//! Read-only document projection handed to rendering collaborators.

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult, CanvasSize, Document, Element, ElementId};

/// Snapshot of a [`Document`] at one revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    /// Document revision the snapshot was taken at.
    pub revision: u64,
    /// Canvas dimensions.
    pub canvas_size: CanvasSize,
    /// Elements in ascending z-index order.
    pub elements: Vec<Element>,
    /// Selected element; only set when it refers to one of `elements`.
    pub selected_id: Option<ElementId>,
}

impl DocumentSnapshot {
    /// Build a snapshot from a document.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        Self {
            revision: document.revision(),
            canvas_size: document.canvas_size(),
            elements: document.elements().to_vec(),
            selected_id: document.selected_id(),
        }
    }

    /// The selected element, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&Element> {
        self.selected_id
            .and_then(|id| self.elements.iter().find(|e| e.id == id))
    }

    /// Elements sorted by z-index, bottom first.
    ///
    /// Snapshots built from a document are already in this order; this
    /// guards snapshots that were deserialized or assembled by hand.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&Element> {
        let mut ordered: Vec<_> = self.elements.iter().collect();
        ordered.sort_by_key(|e| e.transform.z_index);
        ordered
    }

    /// Serialize the snapshot to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string(self).map_err(CanvasError::Serialization)
    }
}
