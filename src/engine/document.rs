//! Document - Arena that owns every node of one tree.
//!
//! Nodes live in a `SlotMap` keyed by [`NodeId`]. A [`Node`] is a cheap
//! handle (document + id), the same way a browser hands out element
//! references. Each node counts the handles that point at it. A detached
//! subtree stays in the arena while any of its nodes is still held, so it
//! can be re-inserted; once the last handle is gone it is freed.
//! [`Document::collect`] frees a detached subtree explicitly.
//!
//! A bare [`NodeId`] is not a handle and does not keep its node alive.
//!
//! The document is single-threaded (`Rc<RefCell<..>>`). Every public method
//! keeps its borrow short and never calls user code while borrowed.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use super::events::ListenerEntry;
use super::node::Node;
use crate::config::DomConfig;
use crate::error::{Error, Result};
use crate::types::DomValue;

new_key_type! {
    /// Key of a node inside its document's arena.
    pub struct NodeId;
}

// =============================================================================
// Node storage
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Element(String),
    Text(String),
}

pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Attributes in insertion order.
    pub(crate) attributes: Vec<(String, String)>,
    /// Live property state that does not reflect to attributes (`value`, `checked`).
    pub(crate) state: HashMap<String, DomValue>,
    pub(crate) listeners: Vec<ListenerEntry>,
    /// Live `Node` handles.
    pub(crate) handles: Cell<usize>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            state: HashMap::new(),
            listeners: Vec::new(),
            handles: Cell::new(0),
        }
    }

    pub(crate) fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub(crate) fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub(crate) struct Tree {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    next_listener: u64,
}

impl Tree {
    pub(crate) fn insert(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.insert(NodeData::new(kind))
    }

    pub(crate) fn next_listener_id(&mut self) -> u64 {
        let id = self.next_listener;
        self.next_listener += 1;
        id
    }

    /// Unlink `id` from its parent's child list.
    pub(crate) fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get_mut(id).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|child| *child != id);
        }
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub(crate) fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.nodes.get(node).and_then(|n| n.parent);
        }
        false
    }

    pub(crate) fn text_content(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else { return };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(_) => {
                for child in &node.children {
                    self.text_content(*child, out);
                }
            }
        }
    }

    fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.nodes.get(current).and_then(|n| n.parent) {
            current = parent;
        }
        current
    }

    /// Whether any node in the subtree of `id` is held by a handle.
    fn is_held(&self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(id) else { return false };
        node.handles.get() > 0 || node.children.iter().any(|child| self.is_held(*child))
    }

    /// Detached, and nothing in the subtree is held.
    fn is_unreachable(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.parent.is_none()) && !self.is_held(id)
    }

    /// Remove the subtree of `id` from the arena. The removed data is
    /// returned so the caller drops it (and the listeners it owns) after
    /// releasing the borrow.
    fn remove_subtree(&mut self, id: NodeId) -> Vec<NodeData> {
        let mut freed = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(id) {
                stack.extend(node.children.iter().copied());
                freed.push(node);
            }
        }
        freed
    }
}

// =============================================================================
// Document
// =============================================================================

/// Handle to a document. Cloning shares the same tree.
#[derive(Clone)]
pub struct Document {
    pub(crate) tree: Rc<RefCell<Tree>>,
    config: Rc<DomConfig>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.node_count())
            .field("origin", &self.config.origin.as_str())
            .finish()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }
}

impl Document {
    /// Empty document with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DomConfig::default())
    }

    pub fn with_config(config: DomConfig) -> Self {
        Self {
            tree: Rc::new(RefCell::new(Tree {
                nodes: SlotMap::with_key(),
                next_listener: 0,
            })),
            config: Rc::new(config),
        }
    }

    pub fn config(&self) -> &DomConfig {
        &self.config
    }

    /// Create a detached element. Tag names are lowercased.
    pub fn create_element(&self, tag: &str) -> Result<Node> {
        let tag = validate_tag(tag)?;
        let id = self.tree.borrow_mut().insert(NodeKind::Element(tag));
        Ok(Node::from_parts(self.clone(), id))
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> Node {
        let id = self
            .tree
            .borrow_mut()
            .insert(NodeKind::Text(text.to_string()));
        Node::from_parts(self.clone(), id)
    }

    /// Handle for `id`, if it still exists.
    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.contains(id)
            .then(|| Node::from_parts(self.clone(), id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.tree.borrow().nodes.contains_key(id)
    }

    /// Number of nodes alive in the arena (attached or not).
    pub fn node_count(&self) -> usize {
        self.tree.borrow().nodes.len()
    }

    /// Free a detached subtree. Returns the number of nodes freed.
    ///
    /// Handles to freed nodes become stale: structural operations on them
    /// fail with [`Error::StaleNode`] and reads return nothing.
    pub fn collect(&self, node: &Node) -> Result<usize> {
        let freed = {
            let mut tree = self.tree.borrow_mut();
            let data = tree.nodes.get(node.id()).ok_or(Error::StaleNode)?;
            if data.parent.is_some() {
                return Err(Error::HierarchyRequest);
            }
            tree.remove_subtree(node.id())
        };
        Ok(freed.len())
    }

    // =========================================================================
    // Handle tracking
    // =========================================================================

    /// Count a new handle to `id`. `false` when it could not be counted.
    pub(crate) fn retain_handle(&self, id: NodeId) -> bool {
        let Ok(tree) = self.tree.try_borrow() else {
            return false;
        };
        tree.nodes
            .get(id)
            .map(|data| data.handles.set(data.handles.get() + 1))
            .is_some()
    }

    /// Drop a handle to `id`, freeing its tree if that was the last way to
    /// reach it.
    pub(crate) fn release_handle(&self, id: NodeId) {
        let root = {
            let Ok(tree) = self.tree.try_borrow() else { return };
            let Some(data) = tree.nodes.get(id) else { return };
            let remaining = data.handles.get().saturating_sub(1);
            data.handles.set(remaining);
            if remaining > 0 {
                return;
            }
            tree.root_of(id)
        };
        self.free_if_unreachable(root);
    }

    /// Free the subtree of `id` if it is detached and nothing in it is held.
    /// Returns the number of nodes freed.
    pub(crate) fn free_if_unreachable(&self, id: NodeId) -> usize {
        let freed = {
            let Ok(mut tree) = self.tree.try_borrow_mut() else {
                return 0;
            };
            if !tree.is_unreachable(id) {
                return 0;
            }
            tree.remove_subtree(id)
        };
        freed.len()
    }
}

/// Validate and lowercase a tag name.
pub(crate) fn validate_tag(tag: &str) -> Result<String> {
    let mut chars = tag.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(tag.to_ascii_lowercase())
    } else {
        Err(Error::InvalidTag(tag.to_string()))
    }
}
