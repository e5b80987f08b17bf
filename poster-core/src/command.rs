//! Data form of every inbound editor operation.
//!
//! UI collaborators and scripts drive an [`crate::Editor`] with these
//! commands instead of calling its methods directly.
//!
//! ```text
//! {"op": "addShape", "shapeType": "star"}
//! {"op": "reorder", "id": "…", "direction": "top"}
//! {"op": "export"}
//! ```

use serde::{Deserialize, Serialize};

use crate::{Element, ElementId, ElementPatch, ReorderDirection, ShapeType};

/// An operation on the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    /// Add a fully specified element.
    Add {
        /// The element; its z-index is ignored.
        element: Element,
    },
    /// Add a shape with default attributes.
    AddShape {
        /// Primitive to draw.
        shape_type: ShapeType,
        /// Optional ID, so later commands can refer to the element.
        #[serde(default)]
        id: Option<ElementId>,
    },
    /// Add a text block with default attributes.
    AddText {
        /// Initial content.
        text: String,
        /// Optional ID, so later commands can refer to the element.
        #[serde(default)]
        id: Option<ElementId>,
    },
    /// Decode an image source and add it at its natural size.
    AddImage {
        /// Image source.
        src: String,
        /// Optional ID, so later commands can refer to the element.
        #[serde(default)]
        id: Option<ElementId>,
    },
    /// Merge a partial update into an element.
    Update {
        /// Target element.
        id: ElementId,
        /// Attributes to change.
        patch: ElementPatch,
    },
    /// Decode a new source for an image element.
    SetImageSource {
        /// Target image element.
        id: ElementId,
        /// New source.
        src: String,
    },
    /// Apply the result of a resize/rotate gesture.
    Transform {
        /// Target element.
        id: ElementId,
        /// Horizontal scale relative to the stored width.
        scale_x: f32,
        /// Vertical scale relative to the stored height.
        scale_y: f32,
        /// Resulting x position.
        x: f32,
        /// Resulting y position.
        y: f32,
        /// Resulting rotation in degrees.
        rotation: f32,
    },
    /// Apply the result of a drag gesture.
    Drag {
        /// Target element.
        id: ElementId,
        /// Resulting x position.
        x: f32,
        /// Resulting y position.
        y: f32,
    },
    /// Recolor an element: fill for shapes, color for text.
    Recolor {
        /// Target element.
        id: ElementId,
        /// New color.
        color: String,
    },
    /// Remove an element.
    Delete {
        /// Target element.
        id: ElementId,
    },
    /// Select an element, or deselect with `null`.
    Select {
        /// Element to select.
        #[serde(default)]
        id: Option<ElementId>,
    },
    /// Select whatever is under a canvas point, or deselect on empty canvas.
    SelectAt {
        /// Canvas x.
        x: f32,
        /// Canvas y.
        y: f32,
    },
    /// Change an element's depth.
    Reorder {
        /// Target element.
        id: ElementId,
        /// Where to move it.
        direction: ReorderDirection,
    },
    /// Remove every element.
    Clear,
    /// Open a text-edit session.
    BeginTextEdit {
        /// Text element to edit.
        id: ElementId,
    },
    /// Push the editing surface's current value.
    SetTextDraft {
        /// Element being edited.
        id: ElementId,
        /// Current value.
        text: String,
    },
    /// Close a text-edit session and write its value.
    CommitTextEdit {
        /// Element being edited.
        id: ElementId,
        /// Final value.
        text: String,
    },
    /// Close a text-edit session without writing.
    CancelTextEdit {
        /// Element being edited.
        id: ElementId,
    },
    /// Ask the host to export the current document.
    Export,
}

impl Command {
    /// Short name of the command, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::AddShape { .. } => "addShape",
            Self::AddText { .. } => "addText",
            Self::AddImage { .. } => "addImage",
            Self::Update { .. } => "update",
            Self::SetImageSource { .. } => "setImageSource",
            Self::Transform { .. } => "transform",
            Self::Drag { .. } => "drag",
            Self::Recolor { .. } => "recolor",
            Self::Delete { .. } => "delete",
            Self::Select { .. } => "select",
            Self::SelectAt { .. } => "selectAt",
            Self::Reorder { .. } => "reorder",
            Self::Clear => "clear",
            Self::BeginTextEdit { .. } => "beginTextEdit",
            Self::SetTextDraft { .. } => "setTextDraft",
            Self::CommitTextEdit { .. } => "commitTextEdit",
            Self::CancelTextEdit { .. } => "cancelTextEdit",
            Self::Export => "export",
        }
    }
}

/// What applying a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The document changed.
    Changed,
    /// The command was a no-op (unknown ID, boundary reorder, …).
    Unchanged,
    /// A new element was added.
    Added(ElementId),
    /// The host should export the document now.
    ExportRequested,
}
