//! Text Primitive - Standalone text nodes, static or signal-bound.
//!
//! # Example
//!
//! ```ignore
//! let count = signal(0);
//! let (label, subscription) = text(&doc, &count);
//! count.set(42);
//! assert_eq!(label.text_content(), "42");
//! ```

use crate::engine::{Document, Node};
use crate::signals::{ReadSignal, Signal, Subscription};
use crate::types::DomValue;

use super::types::BoundSignal;

/// Content of a text node.
#[derive(Clone, Debug)]
pub enum TextContent {
    Static(String),
    Signal(BoundSignal),
}

impl From<&str> for TextContent {
    fn from(text: &str) -> Self {
        TextContent::Static(text.to_string())
    }
}

impl From<String> for TextContent {
    fn from(text: String) -> Self {
        TextContent::Static(text)
    }
}

impl From<DomValue> for TextContent {
    fn from(value: DomValue) -> Self {
        TextContent::Static(value.to_string())
    }
}

impl From<BoundSignal> for TextContent {
    fn from(bound: BoundSignal) -> Self {
        TextContent::Signal(bound)
    }
}

impl<T: Clone + PartialEq + Into<DomValue> + 'static> From<&Signal<T>> for TextContent {
    fn from(signal: &Signal<T>) -> Self {
        TextContent::Signal(signal.into())
    }
}

impl<T: Clone + PartialEq + Into<DomValue> + 'static> From<&ReadSignal<T>> for TextContent {
    fn from(signal: &ReadSignal<T>) -> Self {
        TextContent::Signal(signal.into())
    }
}

/// Create a detached text node.
///
/// Signal content returns the subscription that keeps the node in sync;
/// static content returns `None`.
pub fn text(doc: &Document, content: impl Into<TextContent>) -> (Node, Option<Subscription>) {
    match content.into() {
        TextContent::Static(text) => (doc.create_text(&text), None),
        TextContent::Signal(bound) => {
            let (node, subscription) = bound_text(doc, &bound);
            (node, Some(subscription))
        }
    }
}

/// One persistent text node resynchronized on every notification.
pub(crate) fn bound_text(doc: &Document, bound: &BoundSignal) -> (Node, Subscription) {
    let node = doc.create_text("");
    let target = node.clone();
    let subscription = bound.subscribe(move |value| target.set_text_content(&value.to_string()));
    (node, subscription)
}
