//! Pending image loads.
//!
//! Decoding an image source is the one asynchronous step in the editor.
//! A request produces a [`LoadTicket`]; whoever decodes the source hands the
//! ticket back together with the result. Requests are keyed by the element
//! they target, and only the most recent request for an element is honoured:
//! a ticket that completes after a newer request was made is stale.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{CanvasResult, Element, ElementId};

/// Pixel dimensions of a decoded image source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Resolves an image source string to its pixel dimensions.
pub trait ImageResolver {
    /// Decode `src` far enough to know its dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CanvasError::ImageDecode`] if the source cannot be
    /// decoded.
    fn resolve(&self, src: &str) -> CanvasResult<ImageInfo>;
}

/// Handle for one in-flight image load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    /// Element the load targets; for inserts, the ID the new element gets.
    pub id: ElementId,
    /// Source to decode.
    pub src: String,
    generation: u64,
}

/// What a completed load will do to the document.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingLoad {
    /// Insert a new image element; its size comes from the decoded image.
    Insert(Element),
    /// Replace the source of an existing image element.
    Replace,
}

/// Outstanding image loads, newest request per element.
#[derive(Debug, Clone, Default)]
pub struct ImageLoader {
    next_generation: u64,
    pending: HashMap<ElementId, (u64, PendingLoad)>,
}

impl ImageLoader {
    /// Create a loader with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a load that inserts `template` once decoded.
    pub fn request_insert(&mut self, template: Element, src: String) -> LoadTicket {
        let id = template.id;
        self.register(id, src, PendingLoad::Insert(template))
    }

    /// Register a load that replaces the source of element `id`.
    pub fn request_replace(&mut self, id: ElementId, src: String) -> LoadTicket {
        self.register(id, src, PendingLoad::Replace)
    }

    /// Claim the pending load for `ticket`.
    ///
    /// Returns `None` if the ticket was superseded or already claimed.
    pub fn take(&mut self, ticket: &LoadTicket) -> Option<PendingLoad> {
        match self.pending.get(&ticket.id) {
            Some((generation, _)) if *generation == ticket.generation => {
                self.pending.remove(&ticket.id).map(|(_, load)| load)
            }
            _ => None,
        }
    }

    /// Forget any pending load for `id`.
    pub fn cancel(&mut self, id: ElementId) {
        if self.pending.remove(&id).is_some() {
            tracing::debug!(%id, "Cancelled pending image load");
        }
    }

    /// Forget every pending load.
    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(count = self.pending.len(), "Cancelled all pending image loads");
            self.pending.clear();
        }
    }

    /// Whether a load for `id` is outstanding.
    #[must_use]
    pub fn is_pending(&self, id: ElementId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Number of outstanding loads.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn register(&mut self, id: ElementId, src: String, load: PendingLoad) -> LoadTicket {
        self.next_generation += 1;
        let generation = self.next_generation;
        if self.pending.insert(id, (generation, load)).is_some() {
            tracing::debug!(%id, "Superseded earlier image load");
        }
        LoadTicket {
            id,
            src,
            generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_once() {
        let mut loader = ImageLoader::new();
        let id = ElementId::new();
        let ticket = loader.request_replace(id, "a.png".to_string());
        assert!(loader.is_pending(id));
        assert_eq!(loader.take(&ticket), Some(PendingLoad::Replace));
        assert_eq!(loader.take(&ticket), None);
        assert_eq!(loader.pending_count(), 0);
    }

    #[test]
    fn test_last_submitted_wins() {
        let mut loader = ImageLoader::new();
        let id = ElementId::new();
        let old = loader.request_replace(id, "old.png".to_string());
        let new = loader.request_replace(id, "new.png".to_string());
        assert_eq!(loader.take(&old), None);
        assert_eq!(loader.take(&new), Some(PendingLoad::Replace));
    }

    #[test]
    fn test_inserts_are_independent() {
        let mut loader = ImageLoader::new();
        let first = loader.request_insert(Element::image("a", 1, 1), "a".to_string());
        let second = loader.request_insert(Element::image("b", 1, 1), "b".to_string());
        assert_ne!(first.id, second.id);
        assert!(matches!(loader.take(&second), Some(PendingLoad::Insert(_))));
        assert!(matches!(loader.take(&first), Some(PendingLoad::Insert(_))));
    }

    #[test]
    fn test_cancel() {
        let mut loader = ImageLoader::new();
        let id = ElementId::new();
        let ticket = loader.request_replace(id, "a.png".to_string());
        loader.cancel(id);
        assert_eq!(loader.take(&ticket), None);
    }

    #[test]
    fn test_cancel_all() {
        let mut loader = ImageLoader::new();
        let insert = loader.request_insert(Element::image("a", 1, 1), "a".to_string());
        let replace = loader.request_replace(ElementId::new(), "b.png".to_string());
        loader.cancel_all();
        assert_eq!(loader.pending_count(), 0);
        assert_eq!(loader.take(&insert), None);
        assert_eq!(loader.take(&replace), None);
    }
}
