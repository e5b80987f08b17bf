//! In-place text editing sessions.
//!
//! While a session is open, an external editable surface owns the text; the
//! element's stored content is only replaced when the session commits. At
//! most one session is open at a time: beginning another one commits the
//! current one with its latest draft.

use crate::ElementId;

/// An open editing session for one text element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEditSession {
    /// Element being edited.
    pub id: ElementId,
    /// Content when the session began.
    pub original: String,
    /// Latest value pushed by the editing surface.
    pub draft: Option<String>,
}

impl TextEditSession {
    /// The value a commit without explicit text would write.
    #[must_use]
    pub fn current_text(&self) -> &str {
        self.draft.as_deref().unwrap_or(&self.original)
    }
}

/// A text-content update the caller must apply to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCommit {
    /// Element to update.
    pub id: ElementId,
    /// Final text content.
    pub text: String,
}

/// Tracks the single open text-edit session.
#[derive(Debug, Clone, Default)]
pub struct TextEditor {
    active: Option<TextEditSession>,
}

impl TextEditor {
    /// Create an editor with no open session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for `id`.
    ///
    /// If another element's session is open, it is closed and its commit is
    /// returned. Beginning a session for the element already being edited
    /// keeps the existing session.
    pub fn begin(&mut self, id: ElementId, original: String) -> Option<TextCommit> {
        if self.active_id() == Some(id) {
            return None;
        }
        let previous = self.active.take().map(|session| TextCommit {
            text: session.current_text().to_string(),
            id: session.id,
        });
        self.active = Some(TextEditSession {
            id,
            original,
            draft: None,
        });
        previous
    }

    /// Record the surface's current value. Ignored unless `id` is the
    /// active session.
    pub fn set_draft(&mut self, id: ElementId, text: String) -> bool {
        match self.active.as_mut() {
            Some(session) if session.id == id => {
                session.draft = Some(text);
                true
            }
            _ => false,
        }
    }

    /// Close the session for `id` and return its commit.
    pub fn commit(&mut self, id: ElementId, text: String) -> Option<TextCommit> {
        if self.active_id() != Some(id) {
            return None;
        }
        self.active = None;
        Some(TextCommit { id, text })
    }

    /// Close the session for `id` without producing an update.
    pub fn cancel(&mut self, id: ElementId) -> bool {
        if self.active_id() != Some(id) {
            return false;
        }
        self.active = None;
        true
    }

    /// Drop the session if it belongs to `id`, e.g. because the element was
    /// deleted.
    pub fn abandon(&mut self, id: ElementId) {
        if self.active_id() == Some(id) {
            tracing::debug!(%id, "Abandoned text edit for removed element");
            self.active = None;
        }
    }

    /// Drop any open session.
    pub fn abandon_all(&mut self) {
        self.active = None;
    }

    /// The open session, if any.
    #[must_use]
    pub fn active(&self) -> Option<&TextEditSession> {
        self.active.as_ref()
    }

    /// ID of the element being edited.
    #[must_use]
    pub fn active_id(&self) -> Option<ElementId> {
        self.active.as_ref().map(|s| s.id)
    }
}
