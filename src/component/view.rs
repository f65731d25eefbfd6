//! View - What a component's node builder produces.
//!
//! The runtime only needs one thing from a view: the root to append into
//! the mount container (and detach on destroy). Everything else in the view
//! is for the component's own hooks.

use std::collections::HashMap;

use crate::engine::Node;

/// Key under which a [`NodeMap`] stores its root.
pub const CONTAINER: &str = "container";

pub trait View {
    /// Root node appended on mount and removed on destroy.
    fn container(&self) -> Option<Node>;
}

impl View for Node {
    fn container(&self) -> Option<Node> {
        Some(self.clone())
    }
}

impl View for Option<Node> {
    fn container(&self) -> Option<Node> {
        self.clone()
    }
}

impl View for () {
    fn container(&self) -> Option<Node> {
        None
    }
}

/// Named nodes; the entry under `"container"` is the root.
#[derive(Clone, Debug, Default)]
pub struct NodeMap {
    nodes: HashMap<String, Node>,
}

impl NodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, node: Node) -> Self {
        self.insert(name, node);
        self
    }

    pub fn insert(&mut self, name: &str, node: Node) -> Option<Node> {
        self.nodes.insert(name.to_string(), node)
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }
}

impl View for NodeMap {
    fn container(&self) -> Option<Node> {
        self.get(CONTAINER).cloned()
    }
}

impl<S: Into<String>> FromIterator<(S, Node)> for NodeMap {
    fn from_iter<I: IntoIterator<Item = (S, Node)>>(iter: I) -> Self {
        Self {
            nodes: iter
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        }
    }
}
