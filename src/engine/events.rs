//! Events - Event objects, listener registration options and dispatch.
//!
//! Dispatch runs the target's listeners, then bubbles through its ancestors
//! until a listener calls [`Event::stop_propagation`]. Each node's listener
//! list is snapshotted before it runs, and no document borrow is held while
//! a listener executes, so listeners may freely mutate the tree or set
//! signals.

use std::fmt;
use std::rc::Rc;

use super::node::Node;
use crate::types::DomValue;

// =============================================================================
// Listener types
// =============================================================================

/// Event listener (Rc so one handler can be registered on several nodes).
pub type Listener = Rc<dyn Fn(&mut Event)>;

/// Identifies one registration, for `remove_event_listener`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

bitflags::bitflags! {
    /// Registration options for `add_event_listener`.
    ///
    /// Combine with bitwise OR: `ListenerOptions::ONCE | ListenerOptions::PASSIVE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ListenerOptions: u8 {
        const NONE = 0;
        /// Removed before its first invocation.
        const ONCE = 1 << 0;
        /// `prevent_default` has no effect inside this listener.
        const PASSIVE = 1 << 1;
    }
}

pub(crate) struct ListenerEntry {
    pub(crate) id: ListenerId,
    pub(crate) event: String,
    pub(crate) options: ListenerOptions,
    pub(crate) listener: Listener,
}

// =============================================================================
// Event
// =============================================================================

/// An event travelling through the tree.
pub struct Event {
    kind: String,
    bubbles: bool,
    detail: DomValue,
    target: Option<Node>,
    current_target: Option<Node>,
    default_prevented: bool,
    propagation_stopped: bool,
    in_passive: bool,
}

impl Event {
    /// A bubbling event of the given type (`"click"`, `"input"`, ...).
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into().to_ascii_lowercase(),
            bubbles: true,
            detail: DomValue::Null,
            target: None,
            current_target: None,
            default_prevented: false,
            propagation_stopped: false,
            in_passive: false,
        }
    }

    /// Attach a payload.
    pub fn with_detail(mut self, detail: impl Into<DomValue>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Deliver to the target only.
    pub fn non_bubbling(mut self) -> Self {
        self.bubbles = false;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn detail(&self) -> &DomValue {
        &self.detail
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Node the event was dispatched on.
    pub fn target(&self) -> Option<&Node> {
        self.target.as_ref()
    }

    /// Node whose listener is currently running.
    pub fn current_target(&self) -> Option<&Node> {
        self.current_target.as_ref()
    }

    pub fn prevent_default(&mut self) {
        if self.in_passive {
            tracing::trace!(event = %self.kind, "prevent_default ignored in passive listener");
            return;
        }
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("bubbles", &self.bubbles)
            .field("detail", &self.detail)
            .field("default_prevented", &self.default_prevented)
            .finish()
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Dispatch `event` at `target`. Returns `false` if a listener prevented the default.
pub(crate) fn dispatch(target: &Node, event: &mut Event) -> bool {
    event.target = Some(target.clone());
    event.default_prevented = false;
    event.propagation_stopped = false;

    let path: Vec<Node> = if event.bubbles {
        std::iter::successors(Some(target.clone()), Node::parent).collect()
    } else {
        vec![target.clone()]
    };

    for node in path {
        event.current_target = Some(node.clone());

        for (id, options, listener) in node.listeners_for(&event.kind) {
            // An earlier listener may have removed this one.
            if !node.has_listener(id) {
                continue;
            }
            if options.contains(ListenerOptions::ONCE) {
                node.remove_event_listener(id);
            }

            event.in_passive = options.contains(ListenerOptions::PASSIVE);
            listener(event);
            event.in_passive = false;
        }

        if event.propagation_stopped {
            break;
        }
    }

    event.current_target = None;
    !event.default_prevented
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Document;
    use std::cell::RefCell;

    fn log() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_bubbles_to_ancestors() {
        let doc = Document::new();
        let outer = doc.create_element("div").unwrap();
        let inner = doc.create_element("button").unwrap();
        outer.append_child(&inner).unwrap();

        let seen = log();
        for (name, node) in [("inner", &inner), ("outer", &outer)] {
            let seen = seen.clone();
            node.add_event_listener(
                "click",
                Rc::new(move |e: &mut Event| {
                    let current = e.current_target().and_then(Node::tag).unwrap_or_default();
                    seen.borrow_mut().push(format!("{name}:{current}"));
                }),
                ListenerOptions::NONE,
            );
        }

        assert!(inner.dispatch_event(&mut Event::new("click")));
        assert_eq!(*seen.borrow(), vec!["inner:button", "outer:div"]);
    }

    #[test]
    fn test_stop_propagation_and_non_bubbling() {
        let doc = Document::new();
        let outer = doc.create_element("div").unwrap();
        let inner = doc.create_element("span").unwrap();
        outer.append_child(&inner).unwrap();

        let seen = log();
        let seen_outer = seen.clone();
        outer.add_event_listener(
            "ping",
            Rc::new(move |_: &mut Event| seen_outer.borrow_mut().push("outer".into())),
            ListenerOptions::NONE,
        );
        let stopper = inner.add_event_listener(
            "ping",
            Rc::new(|e: &mut Event| e.stop_propagation()),
            ListenerOptions::NONE,
        );

        inner.dispatch_event(&mut Event::new("ping"));
        assert!(seen.borrow().is_empty());

        inner.remove_event_listener(stopper);
        inner.dispatch_event(&mut Event::new("ping").non_bubbling());
        assert!(seen.borrow().is_empty());

        inner.dispatch_event(&mut Event::new("ping"));
        assert_eq!(*seen.borrow(), vec!["outer"]);
    }

    #[test]
    fn test_once_and_passive() {
        let doc = Document::new();
        let form = doc.create_element("form").unwrap();

        let calls = Rc::new(RefCell::new(0));
        let calls_clone = calls.clone();
        form.add_event_listener(
            "submit",
            Rc::new(move |e: &mut Event| {
                *calls_clone.borrow_mut() += 1;
                e.prevent_default();
            }),
            ListenerOptions::ONCE | ListenerOptions::PASSIVE,
        );

        // Passive: prevent_default is ignored.
        assert!(form.dispatch_event(&mut Event::new("submit")));
        // Once: gone after the first dispatch.
        form.dispatch_event(&mut Event::new("submit"));
        assert_eq!(*calls.borrow(), 1);

        form.add_event_listener(
            "submit",
            Rc::new(|e: &mut Event| e.prevent_default()),
            ListenerOptions::NONE,
        );
        let mut event = Event::new("submit");
        assert!(!form.dispatch_event(&mut event));
        assert!(event.default_prevented());
    }

    #[test]
    fn test_listener_can_mutate_tree() {
        let doc = Document::new();
        let list = doc.create_element("ul").unwrap();
        let list_clone = list.clone();
        let doc_clone = doc.clone();
        list.add_event_listener(
            "add",
            Rc::new(move |e: &mut Event| {
                let item = doc_clone.create_element("li").unwrap();
                item.set_text_content(&e.detail().to_string());
                list_clone.append_child(&item).unwrap();
            }),
            ListenerOptions::NONE,
        );

        list.dispatch_event(&mut Event::new("add").with_detail("milk"));
        assert_eq!(list.inner_html(), "<li>milk</li>");
    }
}
