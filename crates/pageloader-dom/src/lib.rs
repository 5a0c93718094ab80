//! Page Loader DOM
//!
//! Arena-based document tree shared by every mounted page, plus the two
//! transforms the page loader runs over it: id/class namespacing and
//! listener tracking.

mod classlist;
mod document;
mod events;
mod listeners;
mod markup;
mod namespace;
mod node;
mod tree;

pub use classlist::ClassList;
pub use document::Document;
pub use events::{DomEvent, EventTarget, HandlerId, Listener};
pub use listeners::{ListenerTracker, WINDOW_KEY};
pub use markup::{parse_fragment, serialize_children};
pub use namespace::{Namespacer, CHECKED_SENTINEL};
pub use node::{Attribute, ElementData, Node, NodeData};
pub use tree::DomTree;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Invalid / absent node
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// DOM error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    NoSuchNode(NodeId),

    #[error("no element with id {0}")]
    NoSuchId(String),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("element {0:?} has no id to track listeners under")]
    Unidentified(NodeId),

    #[error("subtree {root:?} is already namespaced for page {page}")]
    AlreadyNamespaced { root: NodeId, page: String },
}
