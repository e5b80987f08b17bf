//! # Poster Core
//!
//! Document model for the poster editor: elements, geometry rules, the
//! layered document store, and the editing session that UI collaborators
//! drive.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 poster-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Element Model   │  Editor Session          │
//! │  - Shapes/Text   │  - Commands              │
//! │  - Images        │  - Text edit sessions    │
//! │  - Patches       │  - Image load tickets    │
//! ├─────────────────────────────────────────────┤
//! │  Document        │  Geometry                │
//! │  - Dense z-order │  - Size clamping         │
//! │  - Selection     │  - Gesture results       │
//! │  - Snapshots     │  - Font scaling          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Rendering and export live in `poster-renderer`, which consumes
//! [`DocumentSnapshot`]s.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod command;
pub mod document;
pub mod editor;
pub mod element;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod patch;
pub mod snapshot;
pub mod text_edit;

pub use command::{Command, CommandOutcome};
pub use document::{CanvasSize, Document, ReorderDirection};
pub use editor::{Editor, LoadOutcome, SnapshotListener};
pub use element::{
    Element, ElementId, ElementKind, FontWeight, ShapeType, TextAlign, Transform,
};
pub use error::{CanvasError, CanvasResult};
pub use geometry::{apply_drag_result, apply_transform_result, clamp_dimension, normalize_rotation};
pub use loader::{ImageInfo, ImageLoader, ImageResolver, LoadTicket, PendingLoad};
pub use patch::{ElementPatch, ImagePatch, KindPatch, ShapePatch, TextPatch};
pub use snapshot::DocumentSnapshot;
pub use text_edit::{TextCommit, TextEditSession, TextEditor};

/// Poster core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
