//! Binder types - Attribute values, children and bound signals.
//!
//! An element description is data, not code: each attribute is one of
//! [`AttrValue`]'s variants and each child one of [`Child`]'s. The builder
//! resolves them with a `match`, never by probing types at runtime.
//!
//! ```ignore
//! let count = signal(0);
//! let attrs = Attrs::new()
//!     .attr("class", "counter")
//!     .bind("title", &count)
//!     .on("onclick", move |_| count.update(|n| n + 1));
//! ```

use std::fmt;
use std::rc::Rc;

use crate::engine::{Event, Listener, Node};
use crate::signals::{Observable, ReadSignal, Signal, Subscription};
use crate::types::DomValue;

// =============================================================================
// BoundSignal - An observable erased to DomValue
// =============================================================================

/// Any observable whose value can be written into the document.
///
/// Cloning shares the underlying source.
#[derive(Clone)]
pub struct BoundSignal {
    current: Rc<dyn Fn() -> DomValue>,
    observe: Rc<dyn Fn(Box<dyn Fn(&DomValue)>) -> Subscription>,
}

impl BoundSignal {
    /// Bind `source` as-is.
    pub fn new<T, S>(source: &S) -> Self
    where
        T: Clone + Into<DomValue> + 'static,
        S: Observable<T> + Clone + 'static,
    {
        Self::mapped(source, |value: &T| value.clone().into())
    }

    /// Bind `source` through `transform`.
    pub fn mapped<T, S>(source: &S, transform: impl Fn(&T) -> DomValue + 'static) -> Self
    where
        T: 'static,
        S: Observable<T> + Clone + 'static,
    {
        let transform = Rc::new(transform);

        let reader = source.clone();
        let read_transform = transform.clone();
        let current = Rc::new(move || read_transform(&reader.current()));

        let source = source.clone();
        let observe = Rc::new(move |callback: Box<dyn Fn(&DomValue)>| {
            let transform = transform.clone();
            source.observe(Box::new(move |value: &T| callback(&transform(value))))
        });

        Self { current, observe }
    }

    pub fn current(&self) -> DomValue {
        (self.current)()
    }

    /// Subscribe with replay: `callback` runs once now and on every change.
    pub fn subscribe(&self, callback: impl Fn(&DomValue) + 'static) -> Subscription {
        (self.observe)(Box::new(callback))
    }
}

impl fmt::Debug for BoundSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoundSignal").field(&self.current()).finish()
    }
}

impl<T: Clone + PartialEq + Into<DomValue> + 'static> From<Signal<T>> for BoundSignal {
    fn from(signal: Signal<T>) -> Self {
        BoundSignal::new(&signal)
    }
}

impl<T: Clone + PartialEq + Into<DomValue> + 'static> From<&Signal<T>> for BoundSignal {
    fn from(signal: &Signal<T>) -> Self {
        BoundSignal::new(signal)
    }
}

impl<T: Clone + PartialEq + Into<DomValue> + 'static> From<ReadSignal<T>> for BoundSignal {
    fn from(signal: ReadSignal<T>) -> Self {
        BoundSignal::new(&signal)
    }
}

impl<T: Clone + PartialEq + Into<DomValue> + 'static> From<&ReadSignal<T>> for BoundSignal {
    fn from(signal: &ReadSignal<T>) -> Self {
        BoundSignal::new(signal)
    }
}

// =============================================================================
// AttrValue / Attrs
// =============================================================================

/// One attribute entry of an element description.
#[derive(Clone)]
pub enum AttrValue {
    /// Set once as an attribute at construction.
    ///
    /// Booleans follow HTML boolean attributes: `true` writes an empty
    /// attribute, `false` (like `Null`) writes nothing. Pass the string
    /// `"false"` to get a literal `key="false"`.
    Literal(DomValue),
    /// Event listener; only honoured under an `on*` key.
    Handler(Listener),
    /// Written to the property (or attribute) on every change.
    Signal(BoundSignal),
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            AttrValue::Handler(_) => f.write_str("Handler(..)"),
            AttrValue::Signal(bound) => f.debug_tuple("Signal").field(bound).finish(),
        }
    }
}

impl From<DomValue> for AttrValue {
    fn from(value: DomValue) -> Self {
        AttrValue::Literal(value)
    }
}

impl From<BoundSignal> for AttrValue {
    fn from(bound: BoundSignal) -> Self {
        AttrValue::Signal(bound)
    }
}

impl From<Listener> for AttrValue {
    fn from(listener: Listener) -> Self {
        AttrValue::Handler(listener)
    }
}

/// Ordered attribute map for [`element`](super::element).
#[derive(Clone, Debug, Default)]
pub struct Attrs {
    entries: Vec<(String, AttrValue)>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Static attribute.
    pub fn attr(self, key: &str, value: impl Into<DomValue>) -> Self {
        self.insert(key, AttrValue::Literal(value.into()))
    }

    /// Event handler under an `on*` key (`"onclick"`, `"onInput"`).
    pub fn on(self, key: &str, handler: impl Fn(&mut Event) + 'static) -> Self {
        self.insert(key, AttrValue::Handler(Rc::new(handler)))
    }

    /// Signal-bound property or attribute.
    pub fn bind(self, key: &str, source: impl Into<BoundSignal>) -> Self {
        self.insert(key, AttrValue::Signal(source.into()))
    }

    /// Insert or replace an entry. Replacing keeps the original position.
    pub fn insert(mut self, key: &str, value: AttrValue) -> Self {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key.to_string(), value)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl IntoIterator for Attrs {
    type Item = (String, AttrValue);
    type IntoIter = std::vec::IntoIter<(String, AttrValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter().fold(Attrs::new(), |attrs, (key, value)| {
            attrs.insert(&key.into(), value.into())
        })
    }
}

// =============================================================================
// Child
// =============================================================================

/// One child of an element description.
#[derive(Clone, Debug, Default)]
pub enum Child {
    /// Dropped (null, booleans).
    #[default]
    Empty,
    /// Static text node.
    Text(String),
    /// Appended as-is.
    Node(Node),
    /// One text node kept in sync with the signal.
    Signal(BoundSignal),
    /// Flattened recursively.
    Seq(Vec<Child>),
}

impl Child {
    /// Stringify anything displayable into a static text child.
    pub fn display(value: impl fmt::Display) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Child::Empty
    }
}

impl From<bool> for Child {
    fn from(_: bool) -> Self {
        Child::Empty
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<&String> for Child {
    fn from(text: &String) -> Self {
        Child::Text(text.clone())
    }
}

macro_rules! number_into_child {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Child::Text(DomValue::from(value).to_string())
                }
            }
        )*
    };
}

number_into_child!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<DomValue> for Child {
    fn from(value: DomValue) -> Self {
        match value {
            DomValue::Null | DomValue::Bool(_) => Child::Empty,
            other => Child::Text(other.to_string()),
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<&Node> for Child {
    fn from(node: &Node) -> Self {
        Child::Node(node.clone())
    }
}

impl From<BoundSignal> for Child {
    fn from(bound: BoundSignal) -> Self {
        Child::Signal(bound)
    }
}

impl<T: Clone + PartialEq + Into<DomValue> + 'static> From<Signal<T>> for Child {
    fn from(signal: Signal<T>) -> Self {
        Child::Signal(signal.into())
    }
}

impl<T: Clone + PartialEq + Into<DomValue> + 'static> From<&Signal<T>> for Child {
    fn from(signal: &Signal<T>) -> Self {
        Child::Signal(signal.into())
    }
}

impl<T: Clone + PartialEq + Into<DomValue> + 'static> From<ReadSignal<T>> for Child {
    fn from(signal: ReadSignal<T>) -> Self {
        Child::Signal(signal.into())
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Child::Empty, Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(children: Vec<T>) -> Self {
        Child::Seq(children.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Child>, const N: usize> From<[T; N]> for Child {
    fn from(children: [T; N]) -> Self {
        Child::Seq(children.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::signal;
    use std::cell::RefCell;

    #[test]
    fn test_bound_signal_tracks_source() {
        let count = signal(1);
        let bound = BoundSignal::from(&count);
        assert_eq!(bound.current(), DomValue::Number(1.0));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let sub = bound.subscribe(move |v| seen_clone.borrow_mut().push(v.to_string()));
        count.set(2);
        sub.unsubscribe();
        count.set(3);

        assert_eq!(*seen.borrow(), vec!["1", "2"]);
        assert_eq!(bound.current(), DomValue::Number(3.0));
    }

    #[test]
    fn test_bound_signal_mapped() {
        let done = signal(false);
        let bound = BoundSignal::mapped(&done, |d: &bool| {
            DomValue::from(if *d { "done" } else { "open" })
        });
        assert_eq!(bound.current(), DomValue::from("open"));
        done.set(true);
        assert_eq!(bound.current(), DomValue::from("done"));
    }

    #[test]
    fn test_attrs_keep_order_and_replace() {
        let attrs = Attrs::new()
            .attr("id", "a")
            .attr("class", "x")
            .attr("id", "b");
        let keys: Vec<String> = attrs.clone().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "class"]);
        assert!(matches!(
            attrs.get("id"),
            Some(AttrValue::Literal(DomValue::Text(id))) if id == "b"
        ));
    }

    #[test]
    fn test_child_conversions() {
        assert!(matches!(Child::from(true), Child::Empty));
        assert!(matches!(Child::from(None::<&str>), Child::Empty));
        assert!(matches!(Child::from(2.0), Child::Text(t) if t == "2"));
        assert!(matches!(Child::from(DomValue::Null), Child::Empty));
        assert!(matches!(Child::from(vec!["a", "b"]), Child::Seq(v) if v.len() == 2));
        assert!(matches!(Child::display('x'), Child::Text(t) if t == "x"));
    }
}
