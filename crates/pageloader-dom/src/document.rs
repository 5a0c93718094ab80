//! Document - High-level document API
//!
//! One long-lived document hosts every page container, stylesheet and
//! script tag the loader creates.

use crate::events::{DomEvent, EventTarget, HandlerId, Listener};
use crate::markup::{parse_fragment, serialize_children};
use crate::{DomError, DomTree, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    /// Listeners attached to the global window object
    window_listeners: Vec<(String, Listener)>,
}

impl Document {
    /// Create a document with an html/head/body skeleton
    pub fn new() -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.append_child(tree.root(), html);
        tree.append_child(html, head);
        tree.append_child(html, body);

        Self {
            tree,
            html_element: html,
            head_element: head,
            body_element: body,
            window_listeners: Vec::new(),
        }
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Create an element, optionally with an id, and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str, id: Option<&str>) -> NodeId {
        let node = self.tree.create_element(tag);
        if let (Some(id), Ok(elem)) = (id, self.tree.element_mut(node)) {
            elem.set_id(id);
        }
        self.tree.append_child(parent, node);
        node
    }

    /// Get element by ID. Only the attached tree is searched.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.descendants(self.tree.root()).into_iter().find(|&node| {
            self.tree
                .get(node)
                .and_then(|n| n.as_element())
                .is_some_and(|e| e.id() == Some(id))
        })
    }

    /// All attached elements with the given tag, in document order
    pub fn get_elements_by_tag_name(&self, tag: &str) -> Vec<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .filter(|&node| {
                self.tree
                    .get(node)
                    .and_then(|n| n.as_element())
                    .is_some_and(|e| e.tag.eq_ignore_ascii_case(tag))
            })
            .collect()
    }

    /// Serialized children of `node`
    pub fn inner_markup(&self, node: NodeId) -> String {
        serialize_children(&self.tree, node)
    }

    /// Replace the children of `node` with freshly parsed `markup`.
    ///
    /// Old children are detached, so any handle or listener pointing at them
    /// goes stale.
    pub fn set_inner_markup(&mut self, node: NodeId, markup: &str) -> Result<(), DomError> {
        self.tree.element(node)?;
        self.tree.remove_children(node);
        parse_fragment(&mut self.tree, node, markup);
        Ok(())
    }

    /// Replace the children of `node` with a single text node
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.tree.element(node)?;
        self.tree.remove_children(node);
        let child = self.tree.create_text(text);
        self.tree.append_child(node, child);
        Ok(())
    }

    /// Attach a listener to a target
    pub fn add_event_listener(
        &mut self,
        target: EventTarget,
        event_type: &str,
        listener: Listener,
    ) -> Result<(), DomError> {
        let list = match target {
            EventTarget::Window => &mut self.window_listeners,
            EventTarget::Node(node) => &mut self.tree.element_mut(node)?.listeners,
        };
        list.push((event_type.to_string(), listener));
        Ok(())
    }

    /// Detach one listener. Returns false if it was not attached.
    pub fn remove_event_listener(
        &mut self,
        target: EventTarget,
        event_type: &str,
        handler: HandlerId,
    ) -> bool {
        let list = match target {
            EventTarget::Window => &mut self.window_listeners,
            EventTarget::Node(node) => match self.tree.element_mut(node) {
                Ok(elem) => &mut elem.listeners,
                Err(_) => return false,
            },
        };
        let before = list.len();
        list.retain(|(ty, l)| !(ty == event_type && l.id == handler));
        list.len() < before
    }

    /// Number of listeners attached to a target, across all event types
    pub fn listener_count(&self, target: EventTarget) -> usize {
        match target {
            EventTarget::Window => self.window_listeners.len(),
            EventTarget::Node(node) => self.tree.element(node).map_or(0, |e| e.listeners.len()),
        }
    }

    /// Fire an event at a target, returning how many listeners ran
    pub fn dispatch_event(&self, target: EventTarget, event_type: &str) -> usize {
        let (listeners, value) = match target {
            EventTarget::Window => (&self.window_listeners, None),
            EventTarget::Node(node) => match self.tree.element(node) {
                Ok(elem) => (&elem.listeners, elem.get_attr("value").map(str::to_string)),
                Err(_) => return 0,
            },
        };

        let event = DomEvent {
            event_type: event_type.to_string(),
            target,
            value,
        };
        let matching: Vec<Listener> = listeners
            .iter()
            .filter(|(ty, _)| ty == event_type)
            .map(|(_, l)| l.clone())
            .collect();
        for listener in &matching {
            listener.call(&event);
        }
        matching.len()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
