//! Editor session: the document plus the transient state around it.
//!
//! The [`Editor`] is the surface UI collaborators talk to. It owns the
//! [`Document`], the open text-edit session, and the pending image loads,
//! and it publishes a fresh [`DocumentSnapshot`] to every subscriber after
//! each operation that changed the document.

use crate::command::{Command, CommandOutcome};
use crate::element::{Element, ElementKind};
use crate::geometry::{apply_drag_result, apply_transform_result};
use crate::loader::{ImageInfo, ImageLoader, ImageResolver, LoadTicket, PendingLoad};
use crate::patch::ElementPatch;
use crate::text_edit::{TextCommit, TextEditSession, TextEditor};
use crate::{
    CanvasError, CanvasResult, CanvasSize, Document, DocumentSnapshot, ElementId,
    ReorderDirection,
};

/// Callback receiving a snapshot after every change.
pub type SnapshotListener = Box<dyn FnMut(&DocumentSnapshot)>;

/// Result of completing an image load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A new image element was inserted.
    Inserted(ElementId),
    /// An existing image element got its new source.
    SourceReplaced(ElementId),
    /// The load was superseded, cancelled, or its element is gone.
    Discarded,
}

/// One editing session over one document.
pub struct Editor {
    document: Document,
    text_edit: TextEditor,
    loader: ImageLoader,
    listeners: Vec<SnapshotListener>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("document", &self.document)
            .field("text_edit", &self.text_edit)
            .field("loader", &self.loader)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(CanvasSize::default())
    }
}

impl Editor {
    /// Start a session on an empty document.
    #[must_use]
    pub fn new(canvas_size: CanvasSize) -> Self {
        Self {
            document: Document::new(canvas_size),
            text_edit: TextEditor::new(),
            loader: ImageLoader::new(),
            listeners: Vec::new(),
        }
    }

    /// Read-only access to the document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Current snapshot of the document.
    #[must_use]
    pub fn snapshot(&self) -> DocumentSnapshot {
        self.document.snapshot()
    }

    /// Register a listener; it is called after every change.
    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentSnapshot) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// The selected element, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&Element> {
        self.document.selected()
    }

    // -----------------------------------------------------------------------
    // Document operations
    // -----------------------------------------------------------------------

    /// Add an element on top.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::DuplicateId`] if the ID is already in use.
    pub fn add(&mut self, element: Element) -> CanvasResult<ElementId> {
        self.mutate(|editor| editor.document.add(element))
    }

    /// Merge a partial update into an element.
    ///
    /// Image sources cannot be changed this way because they must be
    /// decoded first; use [`Editor::request_image_source`].
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        self.mutate(|editor| editor.document.update(id, patch))
    }

    /// Remove an element, closing its text edit and pending image load.
    pub fn delete(&mut self, id: ElementId) -> bool {
        self.mutate(|editor| {
            editor.text_edit.abandon(id);
            editor.loader.cancel(id);
            editor.document.delete(id).is_some()
        })
    }

    /// Select an element, or deselect with `None`.
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        self.mutate(|editor| editor.document.select(id))
    }

    /// Select the topmost element under a point; deselect on empty canvas.
    pub fn select_at(&mut self, x: f32, y: f32) -> bool {
        let hit = self.document.element_at(x, y);
        self.select(hit)
    }

    /// Change an element's depth.
    pub fn reorder(&mut self, id: ElementId, direction: ReorderDirection) -> bool {
        self.mutate(|editor| editor.document.reorder(id, direction))
    }

    /// Remove every element and deselect, dropping any open text edit and
    /// pending image loads.
    pub fn clear(&mut self) {
        self.mutate(|editor| {
            editor.text_edit.abandon_all();
            editor.loader.cancel_all();
            editor.document.clear();
        });
    }

    /// Apply the end of a resize/rotate gesture.
    pub fn transform(
        &mut self,
        id: ElementId,
        scale_x: f32,
        scale_y: f32,
        x: f32,
        y: f32,
        rotation: f32,
    ) -> bool {
        let Some(element) = self.document.get(id) else {
            return false;
        };
        let patch = apply_transform_result(element, scale_x, scale_y, x, y, rotation);
        self.update(id, &patch)
    }

    /// Apply the end of a drag gesture.
    pub fn drag(&mut self, id: ElementId, x: f32, y: f32) -> bool {
        self.update(id, &apply_drag_result(x, y))
    }

    /// Recolor an element: fill for shapes, color for text, nothing for
    /// images.
    pub fn recolor(&mut self, id: ElementId, color: &str) -> bool {
        let Some(element) = self.document.get(id) else {
            return false;
        };
        let patch = ElementPatch::recolor(element, color);
        if patch.is_empty() {
            return false;
        }
        self.update(id, &patch)
    }

    // -----------------------------------------------------------------------
    // Text editing
    // -----------------------------------------------------------------------

    /// Open a text-edit session on a text element and select it.
    ///
    /// An open session on another element is committed first. Returns
    /// `false` if `id` is not a text element.
    pub fn begin_text_edit(&mut self, id: ElementId) -> bool {
        let original = match self.document.get(id).map(|e| &e.kind) {
            Some(ElementKind::Text { text_content, .. }) => text_content.clone(),
            Some(other) => {
                tracing::debug!(%id, kind = other.type_name(), "Cannot text-edit this element");
                return false;
            }
            None => return false,
        };
        self.mutate(|editor| {
            if let Some(previous) = editor.text_edit.begin(id, original) {
                tracing::debug!(id = %previous.id, "Auto-committing previous text edit");
                editor.apply_text_commit(&previous);
            }
            editor.document.select(Some(id));
        });
        true
    }

    /// Push the editing surface's current value for the open session.
    pub fn set_text_draft(&mut self, id: ElementId, text: impl Into<String>) -> bool {
        self.text_edit.set_draft(id, text.into())
    }

    /// Close the session on `id` and write `text` as its content.
    pub fn commit_text_edit(&mut self, id: ElementId, text: impl Into<String>) -> bool {
        let Some(commit) = self.text_edit.commit(id, text.into()) else {
            tracing::debug!(%id, "Commit ignored: no open text edit for element");
            return false;
        };
        self.mutate(|editor| editor.apply_text_commit(&commit))
    }

    /// Close the session on `id` without writing.
    pub fn cancel_text_edit(&mut self, id: ElementId) -> bool {
        self.text_edit.cancel(id)
    }

    /// The open text-edit session, if any.
    #[must_use]
    pub fn text_edit_session(&self) -> Option<&TextEditSession> {
        self.text_edit.active()
    }

    fn apply_text_commit(&mut self, commit: &TextCommit) -> bool {
        self.document
            .update(commit.id, &ElementPatch::text_content(commit.text.clone()))
    }

    // -----------------------------------------------------------------------
    // Image loading
    // -----------------------------------------------------------------------

    /// Start loading an image that will be added as a new element.
    ///
    /// Nothing is added until [`Editor::complete_image_load`] succeeds.
    pub fn request_image_insert(&mut self, src: impl Into<String>) -> LoadTicket {
        self.request_image_insert_with_id(ElementId::new(), src)
    }

    /// Like [`Editor::request_image_insert`], with a caller-chosen ID.
    pub fn request_image_insert_with_id(
        &mut self,
        id: ElementId,
        src: impl Into<String>,
    ) -> LoadTicket {
        let src = src.into();
        let template = Element::image(src.clone(), 0, 0).with_id(id);
        self.loader.request_insert(template, src)
    }

    /// Start loading a new source for an existing image element.
    ///
    /// Returns `None` if `id` is not an image element.
    pub fn request_image_source(
        &mut self,
        id: ElementId,
        src: impl Into<String>,
    ) -> Option<LoadTicket> {
        match self.document.get(id).map(|e| &e.kind) {
            Some(ElementKind::Image { .. }) => Some(self.loader.request_replace(id, src.into())),
            _ => None,
        }
    }

    /// Finish a load started with one of the `request_image_*` methods.
    ///
    /// Stale tickets are discarded without looking at `result`.
    ///
    /// # Errors
    ///
    /// Returns the decode error if `result` is an error; the document is
    /// left unchanged. Returns [`CanvasError::DuplicateId`] if an insert's ID
    /// was taken in the meantime.
    pub fn complete_image_load(
        &mut self,
        ticket: &LoadTicket,
        result: CanvasResult<ImageInfo>,
    ) -> CanvasResult<LoadOutcome> {
        let Some(pending) = self.loader.take(ticket) else {
            tracing::warn!(id = %ticket.id, "Discarding stale image load");
            return Ok(LoadOutcome::Discarded);
        };
        let info = result.map_err(|e| {
            tracing::warn!(id = %ticket.id, src = %abbreviate(&ticket.src), "Image load failed: {e}");
            match e {
                CanvasError::ImageDecode(_) => e,
                other => CanvasError::ImageDecode(other.to_string()),
            }
        })?;

        match pending {
            PendingLoad::Insert(template) => {
                #[allow(clippy::cast_precision_loss)]
                let element = template.with_size(info.width as f32, info.height as f32);
                let id = self.add(element)?;
                Ok(LoadOutcome::Inserted(id))
            }
            PendingLoad::Replace => {
                let src = ticket.src.clone();
                let replaced =
                    self.mutate(|editor| editor.document.replace_image_source(ticket.id, src));
                Ok(if replaced {
                    LoadOutcome::SourceReplaced(ticket.id)
                } else {
                    LoadOutcome::Discarded
                })
            }
        }
    }

    /// Number of image loads still waiting for a result.
    #[must_use]
    pub fn pending_image_loads(&self) -> usize {
        self.loader.pending_count()
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Apply one command. Image sources are decoded synchronously with
    /// `resolver`.
    ///
    /// # Errors
    ///
    /// Returns an error if an image cannot be decoded or an added element's
    /// ID is already in use.
    pub fn apply(
        &mut self,
        command: Command,
        resolver: &dyn ImageResolver,
    ) -> CanvasResult<CommandOutcome> {
        tracing::debug!(op = command.name(), "Applying command");
        let changed = match command {
            Command::Add { element } => return self.add(element).map(CommandOutcome::Added),
            Command::AddShape { shape_type, id } => {
                let element = Element::shape(shape_type).with_id(id.unwrap_or_default());
                return self.add(element).map(CommandOutcome::Added);
            }
            Command::AddText { text, id } => {
                let element = Element::text(text).with_id(id.unwrap_or_default());
                return self.add(element).map(CommandOutcome::Added);
            }
            Command::AddImage { src, id } => {
                let ticket = self.request_image_insert_with_id(id.unwrap_or_default(), src);
                return match self.complete_image_load(&ticket, resolver.resolve(&ticket.src))? {
                    LoadOutcome::Inserted(id) => Ok(CommandOutcome::Added(id)),
                    _ => Ok(CommandOutcome::Unchanged),
                };
            }
            Command::SetImageSource { id, src } => match self.request_image_source(id, src) {
                Some(ticket) => {
                    let outcome =
                        self.complete_image_load(&ticket, resolver.resolve(&ticket.src))?;
                    outcome != LoadOutcome::Discarded
                }
                None => false,
            },
            Command::Update { id, patch } => self.update(id, &patch),
            Command::Transform {
                id,
                scale_x,
                scale_y,
                x,
                y,
                rotation,
            } => self.transform(id, scale_x, scale_y, x, y, rotation),
            Command::Drag { id, x, y } => self.drag(id, x, y),
            Command::Recolor { id, color } => self.recolor(id, &color),
            Command::Delete { id } => self.delete(id),
            Command::Select { id } => self.select(id),
            Command::SelectAt { x, y } => self.select_at(x, y),
            Command::Reorder { id, direction } => self.reorder(id, direction),
            Command::Clear => {
                let before = self.document.revision();
                self.clear();
                self.document.revision() != before
            }
            Command::BeginTextEdit { id } => self.begin_text_edit(id),
            Command::SetTextDraft { id, text } => {
                self.set_text_draft(id, text);
                false
            }
            Command::CommitTextEdit { id, text } => self.commit_text_edit(id, text),
            Command::CancelTextEdit { id } => {
                self.cancel_text_edit(id);
                false
            }
            Command::Export => return Ok(CommandOutcome::ExportRequested),
        };
        Ok(if changed {
            CommandOutcome::Changed
        } else {
            CommandOutcome::Unchanged
        })
    }

    /// Run `f` and publish a snapshot if the document revision moved.
    fn mutate<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let before = self.document.revision();
        let result = f(self);
        if self.document.revision() != before {
            let snapshot = self.document.snapshot();
            for listener in &mut self.listeners {
                listener(&snapshot);
            }
        }
        result
    }
}

/// Shorten long sources (data URIs) for log lines.
fn abbreviate(src: &str) -> &str {
    match src.char_indices().nth(64) {
        Some((end, _)) => &src[..end],
        None => src,
    }
}
