//! Listener tracking
//!
//! Records every (element, event type, callback) registration made through
//! it so a page's listeners can be dropped in bulk when it is hidden, and
//! re-attached after a markup refresh replaced the nodes they lived on.

use crate::events::{EventTarget, HandlerId, Listener};
use crate::{DomError, Document};
use std::collections::BTreeMap;

/// Registry key reserved for the global window object
pub const WINDOW_KEY: &str = "window";

#[derive(Debug)]
struct TrackedElement {
    /// Node the listeners are attached to right now. Kept because the
    /// element's id may have been namespaced since registration.
    target: EventTarget,
    by_type: BTreeMap<String, Vec<Listener>>,
}

/// Tracks listener registrations keyed by element identifier
#[derive(Debug, Default)]
pub struct ListenerTracker {
    registry: BTreeMap<String, TrackedElement>,
}

impl ListenerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_for(doc: &Document, target: EventTarget) -> Result<String, DomError> {
        match target {
            EventTarget::Window => Ok(WINDOW_KEY.to_string()),
            EventTarget::Node(node) => doc
                .tree()
                .element(node)?
                .id()
                .map(str::to_string)
                .ok_or(DomError::Unidentified(node)),
        }
    }

    /// Registry key currently holding `target`, falling back to its id
    fn tracked_key(&self, doc: &Document, target: EventTarget) -> Option<String> {
        self.registry
            .iter()
            .find(|(_, tracked)| tracked.target == target)
            .map(|(key, _)| key.clone())
            .or_else(|| Self::key_for(doc, target).ok())
    }

    /// Attach `listener` and record it under the target's identifier
    pub fn add_listener(
        &mut self,
        doc: &mut Document,
        target: EventTarget,
        event_type: &str,
        listener: Listener,
    ) -> Result<(), DomError> {
        let key = Self::key_for(doc, target)?;
        doc.add_event_listener(target, event_type, listener.clone())?;

        let tracked = self.registry.entry(key).or_insert_with(|| TrackedElement {
            target,
            by_type: BTreeMap::new(),
        });
        tracked.target = target;
        tracked.by_type.entry(event_type.to_string()).or_default().push(listener);
        Ok(())
    }

    /// Detach and forget one registration
    pub fn remove_listener(
        &mut self,
        doc: &mut Document,
        target: EventTarget,
        event_type: &str,
        handler: HandlerId,
    ) -> bool {
        let Some(key) = self.tracked_key(doc, target) else {
            return false;
        };
        let Some(tracked) = self.registry.get_mut(&key) else {
            return false;
        };
        let Some(list) = tracked.by_type.get_mut(event_type) else {
            return false;
        };

        let before = list.len();
        list.retain(|l| l.id != handler);
        let removed = list.len() < before;
        if list.is_empty() {
            tracked.by_type.remove(event_type);
        }
        if tracked.by_type.is_empty() {
            self.registry.remove(&key);
        }

        if removed {
            doc.remove_event_listener(target, event_type, handler);
        }
        removed
    }

    /// Detach tracked listeners. With no target every registration in the
    /// system is dropped; otherwise only the target's.
    pub fn remove_all_listeners(&mut self, doc: &mut Document, target: Option<EventTarget>) {
        match target {
            None => {
                let registry = std::mem::take(&mut self.registry);
                let count: usize = registry.values().map(|t| t.by_type.len()).sum();
                for tracked in registry.into_values() {
                    Self::detach(doc, &tracked);
                }
                tracing::debug!("Removed listeners for {} element/event pairs", count);
            }
            Some(target) => {
                if let Some(tracked) = self
                    .tracked_key(doc, target)
                    .and_then(|key| self.registry.remove(&key))
                {
                    Self::detach(doc, &tracked);
                }
            }
        }
    }

    fn detach(doc: &mut Document, tracked: &TrackedElement) {
        for (event_type, listeners) in &tracked.by_type {
            for listener in listeners {
                doc.remove_event_listener(tracked.target, event_type, listener.id);
            }
        }
    }

    /// Re-resolve every recorded identifier against the live tree and attach
    /// its listeners again. Identifiers that no longer resolve are dropped.
    /// Returns the number of listeners attached.
    pub fn reapply_listeners(&mut self, doc: &mut Document) -> usize {
        let snapshot = std::mem::take(&mut self.registry);
        for tracked in snapshot.values() {
            Self::detach(doc, tracked);
        }

        let mut attached = 0;
        for (key, tracked) in snapshot {
            let target = if key == WINDOW_KEY {
                EventTarget::Window
            } else if let Some(node) = doc.get_element_by_id(&key) {
                EventTarget::Node(node)
            } else {
                tracing::debug!("Dropping listeners for vanished element #{}", key);
                continue;
            };

            for (event_type, listeners) in tracked.by_type {
                for listener in listeners {
                    if self.add_listener(doc, target, &event_type, listener).is_ok() {
                        attached += 1;
                    }
                }
            }
        }
        attached
    }

    /// Total number of tracked registrations
    pub fn len(&self) -> usize {
        self.registry
            .values()
            .flat_map(|t| t.by_type.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Check whether anything is tracked under `key`
    pub fn is_tracked(&self, key: &str) -> bool {
        self.registry.contains_key(key)
    }

    /// Tracked event types for `key`
    pub fn event_types(&self, key: &str) -> Vec<&str> {
        self.registry
            .get(key)
            .map(|t| t.by_type.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_button() -> (Document, EventTarget) {
        let mut doc = Document::new();
        let body = doc.body();
        let button = doc.append_element(body, "button", Some("save"));
        (doc, EventTarget::Node(button))
    }

    #[test]
    fn test_add_records_under_id() {
        let (mut doc, button) = doc_with_button();
        let mut tracker = ListenerTracker::new();
        tracker.add_listener(&mut doc, button, "click", Listener::new(|_| {})).unwrap();

        assert!(tracker.is_tracked("save"));
        assert_eq!(tracker.event_types("save"), vec!["click"]);
        assert_eq!(doc.listener_count(button), 1);
    }

    #[test]
    fn test_window_uses_reserved_key() {
        let mut doc = Document::new();
        let mut tracker = ListenerTracker::new();
        tracker
            .add_listener(&mut doc, EventTarget::Window, "resize", Listener::new(|_| {}))
            .unwrap();
        assert!(tracker.is_tracked(WINDOW_KEY));
    }

    #[test]
    fn test_unidentified_element_rejected() {
        let mut doc = Document::new();
        let body = doc.body();
        let div = doc.append_element(body, "div", None);
        let mut tracker = ListenerTracker::new();

        let err = tracker
            .add_listener(&mut doc, EventTarget::Node(div), "click", Listener::new(|_| {}))
            .unwrap_err();
        assert_eq!(err, DomError::Unidentified(div));
        assert_eq!(doc.listener_count(EventTarget::Node(div)), 0);
    }

    #[test]
    fn test_remove_listener_prunes_entry() {
        let (mut doc, button) = doc_with_button();
        let mut tracker = ListenerTracker::new();
        let listener = Listener::new(|_| {});
        tracker.add_listener(&mut doc, button, "click", listener.clone()).unwrap();

        assert!(tracker.remove_listener(&mut doc, button, "click", listener.id));
        assert!(!tracker.is_tracked("save"));
        assert_eq!(doc.listener_count(button), 0);
        assert!(!tracker.remove_listener(&mut doc, button, "click", listener.id));
    }

    #[test]
    fn test_remove_all_for_one_element() {
        let (mut doc, button) = doc_with_button();
        let mut tracker = ListenerTracker::new();
        tracker.add_listener(&mut doc, button, "click", Listener::new(|_| {})).unwrap();
        tracker
            .add_listener(&mut doc, EventTarget::Window, "resize", Listener::new(|_| {}))
            .unwrap();

        tracker.remove_all_listeners(&mut doc, Some(button));
        assert!(!tracker.is_tracked("save"));
        assert!(tracker.is_tracked(WINDOW_KEY));
        assert_eq!(doc.listener_count(button), 0);
    }

    #[test]
    fn test_remove_all_after_id_changed() {
        let (mut doc, button) = doc_with_button();
        let mut tracker = ListenerTracker::new();
        tracker.add_listener(&mut doc, button, "click", Listener::new(|_| {})).unwrap();

        if let EventTarget::Node(node) = button {
            doc.tree_mut().element_mut(node).unwrap().set_id("page_home:save");
        }
        tracker.remove_all_listeners(&mut doc, None);

        assert!(tracker.is_empty());
        assert_eq!(doc.listener_count(button), 0);
    }
}
