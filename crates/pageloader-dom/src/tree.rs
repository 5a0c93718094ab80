//! DOM Tree (arena-based allocation)
//!
//! Nodes unlinked with [`DomTree::detach`] stay in the arena, unreachable
//! from the root. Subtrees dropped by [`DomTree::remove_children`] are
//! released instead: their slots go on a free list and are handed out again
//! by the next node creation, so replacing markup over and over keeps the
//! arena at a steady size.

use std::collections::VecDeque;

use crate::{DomError, ElementData, Node, NodeId};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    free: VecDeque<NodeId>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            free: VecDeque::new(),
        }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Element data of `id`
    pub fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        self.get(id)
            .ok_or(DomError::NoSuchNode(id))?
            .as_element()
            .ok_or(DomError::NotAnElement(id))
    }

    /// Mutable element data of `id`
    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        self.get_mut(id)
            .ok_or(DomError::NoSuchNode(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    /// Number of live nodes, detached ones included and released ones not
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Total slots allocated, released ones included
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop_front() {
            self.nodes[id.index()] = node;
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Return the slots of `root` and its descendants to the free list.
    /// Attached listeners are dropped with the node data.
    fn release(&mut self, root: NodeId) {
        let mut doomed = vec![root];
        doomed.extend(self.descendants(root));
        for id in doomed {
            self.nodes[id.index()] = Node::text("");
            self.free.push_back(id);
        }
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content))
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, NodeId::NONE);
    }

    /// Insert `child` before `reference` (or append when `reference` is NONE)
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        self.detach(child);

        let prev = if reference.is_valid() {
            self.nodes[reference.index()].prev_sibling
        } else {
            self.nodes[parent.index()].last_child
        };

        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if reference.is_valid() {
            self.nodes[reference.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }
    }

    /// Unlink a node from its parent and siblings
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Remove every child of `parent` and release their subtrees. Ids of
    /// the removed nodes become invalid and may be reused.
    pub fn remove_children(&mut self, parent: NodeId) {
        for child in self.child_ids(parent) {
            self.detach(child);
            self.release(child);
        }
    }

    /// Iterate over direct children
    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = (NodeId, &Node)> {
        let mut current = self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        std::iter::from_fn(move || {
            let node = self.get(current)?;
            let id = current;
            current = node.next_sibling;
            Some((id, node))
        })
    }

    /// Direct child IDs, collected so the tree can be mutated while walking
    pub fn child_ids(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent).map(|(id, _)| id).collect()
    }

    /// All descendants of `root` in document order, `root` excluded
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_ids(root).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.child_ids(id).into_iter().rev());
        }
        out
    }

    /// Check whether `id` is reachable from the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(node) = self.get(current) {
            if current == NodeId::ROOT {
                return true;
            }
            current = node.parent;
        }
        false
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.get(d).and_then(|n| n.as_text()))
            .collect()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}
