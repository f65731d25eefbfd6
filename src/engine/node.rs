//! Node - Handle to one element or text node.
//!
//! Structural operations (`append_child`, `replace_with`) return `Result`
//! because they can violate the tree shape. Reads on a freed node return
//! nothing and writes are ignored, like operating on a detached element
//! that nobody will ever look at again.
//!
//! ```ignore
//! let doc = Document::new();
//! let list = doc.create_element("ul")?;
//! let item = doc.create_element("li")?;
//! item.set_text_content("milk");
//! list.append_child(&item)?;
//! assert_eq!(list.outer_html(), "<ul><li>milk</li></ul>");
//! ```

use std::fmt;

use super::document::{Document, NodeData, NodeId, NodeKind};
use super::events::{self, Event, Listener, ListenerEntry, ListenerId, ListenerOptions};
use super::html;
use super::properties::{property_kind, PropertyKind};
use crate::error::{Error, Result};
use crate::types::DomValue;

/// Handle to a node in a [`Document`]. Cloning is cheap; equality is identity.
///
/// Handles keep detached nodes alive. Dropping the last handle to a
/// detached subtree frees it.
pub struct Node {
    doc: Document,
    id: NodeId,
    counted: bool,
}

impl Clone for Node {
    fn clone(&self) -> Self {
        Node::from_parts(self.doc.clone(), self.id)
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        if self.counted {
            self.doc.release_handle(self.id);
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.doc == other.doc
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.with(|data| match &data.kind {
            NodeKind::Element(tag) => tag.clone(),
            NodeKind::Text(_) => "#text".to_string(),
        });
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &kind.unwrap_or_else(|| "<freed>".to_string()))
            .finish()
    }
}

impl Node {
    pub(crate) fn from_parts(doc: Document, id: NodeId) -> Self {
        let counted = doc.retain_handle(id);
        Self { doc, id, counted }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    fn with<R>(&self, f: impl FnOnce(&NodeData) -> R) -> Option<R> {
        self.doc.tree.borrow().nodes.get(self.id).map(f)
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut NodeData) -> R) -> Option<R> {
        self.doc.tree.borrow_mut().nodes.get_mut(self.id).map(f)
    }

    fn handle(&self, id: NodeId) -> Node {
        Node::from_parts(self.doc.clone(), id)
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Whether the node is still alive in its document.
    pub fn exists(&self) -> bool {
        self.doc.contains(self.id)
    }

    /// Lowercase tag name, or `None` for text nodes.
    pub fn tag(&self) -> Option<String> {
        self.with(|data| data.tag().map(str::to_string)).flatten()
    }

    pub fn is_element(&self) -> bool {
        self.with(|data| matches!(data.kind, NodeKind::Element(_)))
            .unwrap_or(false)
    }

    pub fn is_text(&self) -> bool {
        self.with(|data| matches!(data.kind, NodeKind::Text(_)))
            .unwrap_or(false)
    }

    // =========================================================================
    // Structure
    // =========================================================================

    pub fn parent(&self) -> Option<Node> {
        self.with(|data| data.parent)
            .flatten()
            .map(|id| self.handle(id))
    }

    pub fn children(&self) -> Vec<Node> {
        self.with(|data| data.children.clone())
            .unwrap_or_default()
            .into_iter()
            .map(|id| self.handle(id))
            .collect()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.with(|data| data.children.first().copied())
            .flatten()
            .map(|id| self.handle(id))
    }

    pub fn child_count(&self) -> usize {
        self.with(|data| data.children.len()).unwrap_or(0)
    }

    /// Append `child` as the last child, moving it out of any previous parent.
    ///
    /// Fails with [`Error::HierarchyRequest`] when `self` is a text node, when
    /// `child` is `self` or one of its ancestors, or when the nodes belong to
    /// different documents.
    pub fn append_child(&self, child: &Node) -> Result<()> {
        if child.doc != self.doc {
            return Err(Error::HierarchyRequest);
        }
        let mut tree = self.doc.tree.borrow_mut();
        let parent = tree.nodes.get(self.id).ok_or(Error::StaleNode)?;
        if parent.tag().is_none() {
            return Err(Error::HierarchyRequest);
        }
        if !tree.nodes.contains_key(child.id) {
            return Err(Error::StaleNode);
        }
        if tree.is_inclusive_ancestor(child.id, self.id) {
            return Err(Error::HierarchyRequest);
        }

        tree.detach(child.id);
        if let Some(data) = tree.nodes.get_mut(child.id) {
            data.parent = Some(self.id);
        }
        if let Some(data) = tree.nodes.get_mut(self.id) {
            data.children.push(child.id);
        }
        Ok(())
    }

    /// Append several children in order. Stops at the first failure.
    pub fn append<'a>(&self, children: impl IntoIterator<Item = &'a Node>) -> Result<()> {
        children
            .into_iter()
            .try_for_each(|child| self.append_child(child))
    }

    /// Detach from the parent. The node stays alive and can be re-inserted.
    pub fn remove(&self) {
        self.doc.tree.borrow_mut().detach(self.id);
    }

    /// Put `other` where `self` is. No-op when `self` has no parent.
    pub fn replace_with(&self, other: &Node) -> Result<()> {
        if other == self {
            return Ok(());
        }
        if other.doc != self.doc {
            return Err(Error::HierarchyRequest);
        }
        let mut tree = self.doc.tree.borrow_mut();
        let current = tree.nodes.get(self.id).ok_or(Error::StaleNode)?;
        if !tree.nodes.contains_key(other.id) {
            return Err(Error::StaleNode);
        }
        let Some(parent) = current.parent else {
            return Ok(());
        };
        if tree.is_inclusive_ancestor(other.id, parent) {
            return Err(Error::HierarchyRequest);
        }

        tree.detach(other.id);
        let slot = tree.nodes.get(parent).and_then(|p| {
            p.children.iter().position(|child| *child == self.id)
        });
        if let (Some(slot), Some(data)) = (slot, tree.nodes.get_mut(parent)) {
            data.children[slot] = other.id;
        }
        if let Some(data) = tree.nodes.get_mut(other.id) {
            data.parent = Some(parent);
        }
        if let Some(data) = tree.nodes.get_mut(self.id) {
            data.parent = None;
        }
        Ok(())
    }

    /// Detach every child. Children nobody holds a handle to are freed.
    pub fn clear_children(&self) {
        let children = {
            let mut tree = self.doc.tree.borrow_mut();
            let children = tree
                .nodes
                .get_mut(self.id)
                .map(|data| std::mem::take(&mut data.children))
                .unwrap_or_default();
            for child in &children {
                if let Some(data) = tree.nodes.get_mut(*child) {
                    data.parent = None;
                }
            }
            children
        };
        for child in children {
            self.doc.free_if_unreachable(child);
        }
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Set an attribute. Names are lowercased; text nodes ignore this.
    pub fn set_attribute(&self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        self.with_mut(|data| {
            if data.tag().is_none() {
                return;
            }
            match data.attributes.iter_mut().find(|(key, _)| *key == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => data.attributes.push((name, value.to_string())),
            }
        });
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.with(|data| data.attribute(&name).map(str::to_string))
            .flatten()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn remove_attribute(&self, name: &str) {
        let name = name.to_ascii_lowercase();
        self.with_mut(|data| data.attributes.retain(|(key, _)| *key != name));
    }

    /// Attribute names in insertion order.
    pub fn attribute_names(&self) -> Vec<String> {
        self.with(|data| data.attributes.iter().map(|(key, _)| key.clone()).collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // Properties
    // =========================================================================

    fn property_kind(&self, name: &str) -> Option<PropertyKind> {
        self.with(|data| property_kind(data.tag(), name)).flatten()
    }

    /// Whether `name` is a property of this node (as opposed to an attribute).
    pub fn has_property(&self, name: &str) -> bool {
        self.property_kind(name).is_some()
    }

    /// Read a property. `None` if the node has no such property.
    pub fn property(&self, name: &str) -> Option<DomValue> {
        let kind = self.property_kind(name)?;
        match kind {
            PropertyKind::Reflect(attribute) => {
                Some(DomValue::Text(self.attribute(attribute).unwrap_or_default()))
            }
            PropertyKind::BoolReflect(attribute) => {
                Some(DomValue::Bool(self.has_attribute(attribute)))
            }
            PropertyKind::State {
                default_attribute,
                boolean,
            } => {
                let live = self.with(|data| data.state.get(name).cloned()).flatten();
                Some(live.unwrap_or_else(|| {
                    if boolean {
                        DomValue::Bool(self.has_attribute(default_attribute))
                    } else if self.tag().as_deref() == Some("textarea") {
                        DomValue::Text(self.text_content())
                    } else {
                        DomValue::Text(self.attribute(default_attribute).unwrap_or_default())
                    }
                }))
            }
            PropertyKind::TextContent => Some(DomValue::Text(self.text_content())),
        }
    }

    /// Write a property. Returns `false` (and does nothing) if the node has
    /// no such property.
    pub fn set_property(&self, name: &str, value: impl Into<DomValue>) -> bool {
        let Some(kind) = self.property_kind(name) else {
            return false;
        };
        let value = value.into();
        match kind {
            PropertyKind::Reflect(attribute) => self.set_attribute(attribute, &value.to_string()),
            PropertyKind::BoolReflect(attribute) => {
                if value.truthy() {
                    self.set_attribute(attribute, "");
                } else {
                    self.remove_attribute(attribute);
                }
            }
            PropertyKind::State { boolean, .. } => {
                let value = if boolean {
                    DomValue::Bool(value.truthy())
                } else {
                    DomValue::Text(value.to_string())
                };
                self.with_mut(|data| data.state.insert(name.to_string(), value));
            }
            PropertyKind::TextContent => self.set_text_content(&value.to_string()),
        }
        true
    }

    /// Write `value` to the property `key` if there is one, else to the
    /// attribute `key`. `Null` removes the attribute.
    pub fn set_property_or_attribute(&self, key: &str, value: &DomValue) {
        if self.set_property(key, value.clone()) {
            return;
        }
        match value {
            DomValue::Null | DomValue::Bool(false) => self.remove_attribute(key),
            DomValue::Bool(true) => self.set_attribute(key, ""),
            other => self.set_attribute(key, &other.to_string()),
        }
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Concatenated text of the subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.doc.tree.borrow().text_content(self.id, &mut out);
        out
    }

    /// Replace all children with one text node (none for an empty string).
    /// On a text node this replaces its data.
    ///
    /// When the only child is already a text node, its data is rewritten in
    /// place.
    pub fn set_text_content(&self, text: &str) {
        let is_text = self
            .with_mut(|data| match &mut data.kind {
                NodeKind::Text(existing) => {
                    *existing = text.to_string();
                    true
                }
                NodeKind::Element(_) => false,
            })
            .unwrap_or(true);
        if is_text {
            return;
        }

        if !text.is_empty() && self.rewrite_lone_text(text) {
            return;
        }

        self.clear_children();
        if !text.is_empty() {
            let child = self.doc.create_text(text);
            let mut tree = self.doc.tree.borrow_mut();
            if let Some(data) = tree.nodes.get_mut(child.id) {
                data.parent = Some(self.id);
            }
            if let Some(data) = tree.nodes.get_mut(self.id) {
                data.children.push(child.id);
            }
        }
    }

    fn rewrite_lone_text(&self, text: &str) -> bool {
        let mut tree = self.doc.tree.borrow_mut();
        let lone = match tree.nodes.get(self.id).map(|data| data.children.as_slice()) {
            Some([only]) => *only,
            _ => return false,
        };
        match tree.nodes.get_mut(lone).map(|data| &mut data.kind) {
            Some(NodeKind::Text(existing)) => {
                *existing = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// Serialized children.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        html::serialize_children(&self.doc.tree.borrow(), self.id, &mut out);
        out
    }

    /// Replace all children with the nodes parsed from `markup`.
    pub fn set_inner_html(&self, markup: &str) {
        if !self.is_element() {
            return;
        }
        self.clear_children();
        html::parse_into(&mut self.doc.tree.borrow_mut(), self.id, markup);
    }

    /// Serialized node, including itself.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        html::serialize_node(&self.doc.tree.borrow(), self.id, &mut out);
        out
    }

    // =========================================================================
    // Class list
    // =========================================================================

    pub fn class_list(&self) -> Vec<String> {
        self.attribute("class")
            .map(|classes| classes.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn class_list_contains(&self, class: &str) -> bool {
        self.class_list().iter().any(|c| c == class)
    }

    /// Toggle `class`, or force it on/off. Returns whether it is now present.
    pub fn class_list_toggle(&self, class: &str, force: Option<bool>) -> bool {
        let mut classes = self.class_list();
        let present = classes.iter().any(|c| c == class);
        let wanted = force.unwrap_or(!present);
        if wanted && !present {
            classes.push(class.to_string());
        } else if !wanted && present {
            classes.retain(|c| c != class);
        } else {
            return wanted;
        }
        self.set_attribute("class", &classes.join(" "));
        wanted
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register `listener` for `event` (case-insensitive).
    pub fn add_event_listener(
        &self,
        event: &str,
        listener: Listener,
        options: ListenerOptions,
    ) -> ListenerId {
        let mut tree = self.doc.tree.borrow_mut();
        let id = ListenerId(tree.next_listener_id());
        if let Some(data) = tree.nodes.get_mut(self.id) {
            data.listeners.push(ListenerEntry {
                id,
                event: event.to_ascii_lowercase(),
                options,
                listener,
            });
        }
        id
    }

    /// Remove one registration. Returns whether it was present.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        // Dropped after the borrow ends; the listener may own node handles.
        let removed: Vec<ListenerEntry> = self
            .with_mut(|data| {
                let (removed, kept) = std::mem::take(&mut data.listeners)
                    .into_iter()
                    .partition(|entry| entry.id == id);
                data.listeners = kept;
                removed
            })
            .unwrap_or_default();
        !removed.is_empty()
    }

    pub fn listener_count(&self) -> usize {
        self.with(|data| data.listeners.len()).unwrap_or(0)
    }

    pub(crate) fn listeners_for(&self, kind: &str) -> Vec<(ListenerId, ListenerOptions, Listener)> {
        self.with(|data| {
            data.listeners
                .iter()
                .filter(|entry| entry.event == kind)
                .map(|entry| (entry.id, entry.options, entry.listener.clone()))
                .collect()
        })
        .unwrap_or_default()
    }

    pub(crate) fn has_listener(&self, id: ListenerId) -> bool {
        self.with(|data| data.listeners.iter().any(|entry| entry.id == id))
            .unwrap_or(false)
    }

    /// Dispatch `event` here, bubbling if the event bubbles.
    /// Returns `false` if a listener called `prevent_default`.
    pub fn dispatch_event(&self, event: &mut Event) -> bool {
        events::dispatch(self, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Document, Node) {
        let doc = Document::new();
        let root = doc.create_element("div").unwrap();
        (doc, root)
    }

    #[test]
    fn test_append_moves_between_parents() {
        let (doc, root) = setup();
        let other = doc.create_element("section").unwrap();
        let child = doc.create_element("p").unwrap();

        root.append_child(&child).unwrap();
        other.append_child(&child).unwrap();

        assert!(root.children().is_empty());
        assert_eq!(other.children(), vec![child.clone()]);
        assert_eq!(child.parent(), Some(other));
    }

    #[test]
    fn test_hierarchy_errors() {
        let (doc, root) = setup();
        let child = doc.create_element("p").unwrap();
        root.append_child(&child).unwrap();
        let text = doc.create_text("t");

        assert!(matches!(root.append_child(&root), Err(Error::HierarchyRequest)));
        assert!(matches!(child.append_child(&root), Err(Error::HierarchyRequest)));
        assert!(matches!(text.append_child(&child), Err(Error::HierarchyRequest)));

        let foreign = Document::new().create_element("b").unwrap();
        assert!(matches!(root.append_child(&foreign), Err(Error::HierarchyRequest)));
    }

    #[test]
    fn test_replace_with_keeps_position() {
        let (doc, root) = setup();
        let a = doc.create_element("a").unwrap();
        let b = doc.create_element("b").unwrap();
        let c = doc.create_element("i").unwrap();
        root.append([&a, &b]).unwrap();

        a.replace_with(&c).unwrap();
        assert_eq!(root.inner_html(), "<i></i><b></b>");
        assert_eq!(a.parent(), None);

        // Parentless: nothing happens.
        a.replace_with(&b).unwrap();
        assert_eq!(root.inner_html(), "<i></i><b></b>");
    }

    #[test]
    fn test_attributes_lowercase_and_order() {
        let (_, root) = setup();
        root.set_attribute("Data-Id", "7");
        root.set_attribute("title", "x");
        root.set_attribute("data-id", "8");
        assert_eq!(root.attribute_names(), vec!["data-id", "title"]);
        assert_eq!(root.attribute("DATA-ID").as_deref(), Some("8"));
        root.remove_attribute("title");
        assert!(!root.has_attribute("title"));
    }

    #[test]
    fn test_reflected_properties() {
        let (_, root) = setup();
        assert!(root.set_property("className", "card active"));
        assert_eq!(root.attribute("class").as_deref(), Some("card active"));
        assert_eq!(root.property("className"), Some(DomValue::from("card active")));

        root.set_property("hidden", true);
        assert_eq!(root.attribute("hidden").as_deref(), Some(""));
        root.set_property("hidden", false);
        assert!(!root.has_attribute("hidden"));

        assert!(!root.set_property("data-x", 1));
        assert_eq!(root.property("data-x"), None);
    }

    #[test]
    fn test_state_properties_do_not_reflect() {
        let doc = Document::new();
        let input = doc.create_element("input").unwrap();
        input.set_attribute("value", "initial");
        assert_eq!(input.property("value"), Some(DomValue::from("initial")));

        input.set_property("value", "typed");
        assert_eq!(input.property("value"), Some(DomValue::from("typed")));
        assert_eq!(input.attribute("value").as_deref(), Some("initial"));

        input.set_property("checked", 1);
        assert_eq!(input.property("checked"), Some(DomValue::Bool(true)));
        assert!(!input.has_attribute("checked"));
    }

    #[test]
    fn test_set_property_or_attribute() {
        let (_, root) = setup();
        root.set_property_or_attribute("textContent", &DomValue::from(3));
        assert_eq!(root.text_content(), "3");

        root.set_property_or_attribute("aria-label", &DomValue::from("menu"));
        assert_eq!(root.attribute("aria-label").as_deref(), Some("menu"));
        root.set_property_or_attribute("aria-label", &DomValue::Null);
        assert!(!root.has_attribute("aria-label"));
    }

    #[test]
    fn test_text_content_roundtrip() {
        let (doc, root) = setup();
        root.append_child(&doc.create_element("b").unwrap()).unwrap();
        root.set_text_content("a < b");
        assert_eq!(root.child_count(), 1);
        assert_eq!(root.text_content(), "a < b");
        assert_eq!(root.inner_html(), "a &lt; b");

        root.set_text_content("");
        assert_eq!(root.child_count(), 0);

        let text = doc.create_text("old");
        text.set_text_content("new");
        assert_eq!(text.text_content(), "new");
    }

    #[test]
    fn test_class_list_toggle() {
        let (_, root) = setup();
        assert!(root.class_list_toggle("done", None));
        assert!(root.class_list_contains("done"));
        assert!(root.class_list_toggle("done", Some(true)));
        assert!(!root.class_list_toggle("done", None));
        assert_eq!(root.attribute("class").as_deref(), Some(""));
    }

    #[test]
    fn test_freed_node_is_inert() {
        let (doc, root) = setup();
        let child = doc.create_element("p").unwrap();
        doc.collect(&child).unwrap();

        assert!(!child.exists());
        assert_eq!(child.tag(), None);
        child.set_attribute("id", "x");
        assert_eq!(child.attribute("id"), None);
        assert!(matches!(root.append_child(&child), Err(Error::StaleNode)));
    }

    #[test]
    fn test_text_content_writes_reuse_the_text_node() {
        let (doc, root) = setup();
        root.set_text_content("0");
        let before = doc.node_count();
        for n in 1..=100 {
            root.set_property("textContent", n);
        }
        assert_eq!(doc.node_count(), before);
        assert_eq!(root.text_content(), "100");

        root.set_text_content("");
        assert_eq!(doc.node_count(), before - 1);
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn test_unheld_children_are_freed() {
        let (doc, root) = setup();
        root.set_inner_html("<p>a</p><p>b</p>");
        assert_eq!(doc.node_count(), 5);

        let kept = root.first_child().unwrap();
        root.set_inner_html("<i>c</i>");
        assert_eq!(doc.node_count(), 5);
        assert!(kept.exists());
        assert_eq!(kept.text_content(), "a");

        let kept_id = kept.id();
        drop(kept);
        assert!(!doc.contains(kept_id));
        assert_eq!(doc.node_count(), 3);

        root.clear_children();
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn test_dropping_last_handle_frees_detached_tree() {
        let (doc, root) = setup();
        let item = doc.create_element("li").unwrap();
        item.set_text_content("milk");
        root.append_child(&item).unwrap();
        let item_id = item.id();
        drop(item);
        assert!(doc.contains(item_id));

        let item = doc.node(item_id).unwrap();
        item.remove();
        assert_eq!(doc.node_count(), 3);
        drop(item);
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn test_removed_listener_may_own_its_node() {
        let (doc, root) = setup();
        let button = doc.create_element("button").unwrap();
        let held = button.clone();
        let id = button.add_event_listener(
            "click",
            std::rc::Rc::new(move |_: &mut Event| {
                held.set_attribute("data-clicked", "");
            }),
            ListenerOptions::ONCE,
        );
        root.append_child(&button).unwrap();

        assert!(button.dispatch_event(&mut Event::new("click")));
        assert!(button.has_attribute("data-clicked"));
        assert!(!button.remove_event_listener(id));

        button.remove();
        drop(button);
        assert_eq!(doc.node_count(), 1);
    }
}
