//! DOM Events
//!
//! Listener handles and the minimal event object passed to callbacks.

use crate::NodeId;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Event handler identity. Two listeners are the same registration only if
/// their handler IDs match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub u64);

impl HandlerId {
    /// Allocate a process-unique handler ID
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        HandlerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Something listeners can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The global window object
    Window,
    /// An element in the document arena
    Node(NodeId),
}

/// Event delivered to listener callbacks
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub event_type: String,
    pub target: EventTarget,
    /// `value` attribute of the target element, if any
    pub value: Option<String>,
}

/// A callback together with its identity
#[derive(Clone)]
pub struct Listener {
    pub id: HandlerId,
    callback: Rc<dyn Fn(&DomEvent)>,
}

impl Listener {
    /// Wrap a closure with a fresh handler ID
    pub fn new(callback: impl Fn(&DomEvent) + 'static) -> Self {
        Self {
            id: HandlerId::next(),
            callback: Rc::new(callback),
        }
    }

    /// Invoke the callback
    pub fn call(&self, event: &DomEvent) {
        (self.callback)(event)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_handler_ids_are_unique() {
        let a = Listener::new(|_| {});
        let b = Listener::new(|_| {});
        assert_ne!(a.id, b.id);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_listener_call() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let listener = Listener::new(move |event| {
            assert_eq!(event.event_type, "click");
            counter.set(counter.get() + 1);
        });

        let event = DomEvent {
            event_type: "click".to_string(),
            target: EventTarget::Window,
            value: None,
        };
        listener.call(&event);
        listener.call(&event);
        assert_eq!(hits.get(), 2);
    }
}
