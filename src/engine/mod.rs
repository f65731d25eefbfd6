//! DOM Engine - In-memory document tree.
//!
//! The engine is the host the binder and components write into:
//! - Document: arena of nodes (`SlotMap`), configuration
//! - Node: handle with a browser-like API (attributes, properties, children)
//! - Events: listener registration and bubbling dispatch
//! - HTML: fragment parser and serializer (`inner_html` / `set_inner_html`)
//!
//! # Architecture
//!
//! Nodes are NOT reference-counted objects. They are keys into one arena:
//!
//! ```text
//! NodeId(1v1): Element("ul")   parent=None      children=[2, 3]
//! NodeId(2v1): Element("li")   parent=Some(1)   children=[4]
//! NodeId(4v1): Text("milk")    parent=Some(2)
//! ```
//!
//! A [`Node`] is the pair (document, key). Removing a node only unlinks it;
//! [`Document::collect`] frees a detached subtree.

mod document;
mod events;
mod html;
mod node;
mod properties;

pub use document::{Document, NodeId};
pub use events::{Event, Listener, ListenerId, ListenerOptions};
pub use html::{decode_entities, escape_attribute, escape_text, is_void, VOID_ELEMENTS};
pub use node::Node;
