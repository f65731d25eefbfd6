//! Element Primitive - Build a node tree from a description.
//!
//! Building is one-shot: the set of children is fixed here and only
//! signal-bound content inside that shape stays live.
//!
//! # Example
//!
//! ```ignore
//! use spark_dom::primitives::{element, Attrs, Child};
//! use spark_dom::signals::signal;
//!
//! let count = signal(0);
//! let clicks = count.clone();
//! let button = element(
//!     &doc,
//!     "button",
//!     Attrs::new()
//!         .attr("type", "button")
//!         .on("onclick", move |_| clicks.update(|n| n + 1)),
//!     vec![Child::from("Clicked "), Child::from(&count), Child::from(" times")],
//! )?;
//! ```

use tracing::{trace, warn};

use crate::engine::{Document, ListenerOptions, Node};
use crate::error::Result;
use crate::signals::Subscription;
use crate::types::DomValue;

use super::bind::bind_bound;
use super::text::bound_text;
use super::types::{AttrValue, Attrs, Child};

/// Build an element. Fails only on an invalid tag name; a child node that
/// cannot be appended (freed, from another document, or an ancestor) is
/// skipped with a warning.
///
/// Bindings created here live as long as their signals; use
/// [`element_with_bindings`] to get hold of them.
pub fn element(
    doc: &Document,
    tag: &str,
    attrs: Attrs,
    children: impl Into<Child>,
) -> Result<Node> {
    element_with_bindings(doc, tag, attrs, children).map(|(node, _)| node)
}

/// Build an element and return every subscription its bindings created.
pub fn element_with_bindings(
    doc: &Document,
    tag: &str,
    attrs: Attrs,
    children: impl Into<Child>,
) -> Result<(Node, Vec<Subscription>)> {
    let node = doc.create_element(tag)?;
    let mut subscriptions = Vec::new();

    // 1. ATTRIBUTES
    for (key, value) in attrs {
        match value {
            AttrValue::Handler(listener) => match event_name(&key) {
                Some(event) => {
                    node.add_event_listener(event, listener, ListenerOptions::NONE);
                }
                None => warn!(tag, key = %key, "handler under a non-event key ignored"),
            },
            AttrValue::Signal(bound) => subscriptions.push(bind_bound(&bound, &node, &key)),
            AttrValue::Literal(value) => set_literal(&node, &key, &value),
        }
    }

    // 2. CHILDREN
    append_child(doc, &node, children.into(), &mut subscriptions);

    trace!(tag, bindings = subscriptions.len(), "element built");
    Ok((node, subscriptions))
}

/// `"onclick"` → `"click"`. Case-insensitive prefix; the name must be non-empty.
fn event_name(key: &str) -> Option<&str> {
    let prefix = key.get(..2)?;
    let event = &key[2..];
    (prefix.eq_ignore_ascii_case("on") && !event.is_empty()).then_some(event)
}

fn set_literal(node: &Node, key: &str, value: &DomValue) {
    match value {
        DomValue::Null | DomValue::Bool(false) => {}
        DomValue::Bool(true) => node.set_attribute(key, ""),
        other => node.set_attribute(key, &other.to_string()),
    }
}

fn append_child(
    doc: &Document,
    parent: &Node,
    child: Child,
    subscriptions: &mut Vec<Subscription>,
) {
    let appended = match child {
        Child::Empty => Ok(()),
        Child::Text(text) => parent.append_child(&doc.create_text(&text)),
        Child::Node(node) => parent.append_child(&node),
        Child::Signal(bound) => {
            let (node, subscription) = bound_text(doc, &bound);
            let appended = parent.append_child(&node);
            match appended {
                Ok(()) => subscriptions.push(subscription),
                Err(_) => subscription.unsubscribe(),
            }
            appended
        }
        Child::Seq(children) => {
            for child in children {
                append_child(doc, parent, child, subscriptions);
            }
            Ok(())
        }
    };
    if let Err(err) = appended {
        warn!(%err, "child skipped");
    }
}
