//! Bindings - Push an observable's value into a node.
//!
//! The target key is resolved on every write: a property when the node has
//! one by that name (`value`, `checked`, `className`, `textContent`), an
//! attribute otherwise.

use crate::engine::Node;
use crate::signals::{Observable, Subscription};
use crate::types::DomValue;

use super::types::BoundSignal;

/// Bind `source` to `key` on `node`. Writes immediately, then on every change.
pub fn bind<T, S>(source: &S, node: &Node, key: &str) -> Subscription
where
    T: Clone + Into<DomValue> + 'static,
    S: Observable<T>,
{
    bind_with(source, node, key, T::clone)
}

/// Like [`bind`], writing `transform(value)` instead of the value itself.
///
/// ```ignore
/// let done = signal(false);
/// bind_with(&done, &item, "className", |d| if *d { "done" } else { "" });
/// ```
pub fn bind_with<T, S, V>(
    source: &S,
    node: &Node,
    key: &str,
    transform: impl Fn(&T) -> V + 'static,
) -> Subscription
where
    T: 'static,
    S: Observable<T>,
    V: Into<DomValue>,
{
    let node = node.clone();
    let key = key.to_string();
    source.observe(Box::new(move |value: &T| {
        node.set_property_or_attribute(&key, &transform(value).into());
    }))
}

pub(crate) fn bind_bound(bound: &BoundSignal, node: &Node, key: &str) -> Subscription {
    let node = node.clone();
    let key = key.to_string();
    bound.subscribe(move |value| node.set_property_or_attribute(&key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Document;
    use crate::signals::{flow, signal};

    #[test]
    fn test_property_takes_precedence() {
        let doc = Document::new();
        let input = doc.create_element("input").unwrap();
        let text = signal(String::from("a"));

        let _sub = bind(&text, &input, "value");
        text.set("b".into());

        assert_eq!(input.property("value"), Some(DomValue::from("b")));
        assert!(!input.has_attribute("value"));
    }

    #[test]
    fn test_attribute_fallback_and_unsubscribe() {
        let doc = Document::new();
        let div = doc.create_element("div").unwrap();
        let count = signal(1);

        let sub = bind(&count, &div, "data-count");
        assert_eq!(div.attribute("data-count").as_deref(), Some("1"));

        sub.unsubscribe();
        count.set(2);
        assert_eq!(div.attribute("data-count").as_deref(), Some("1"));
    }

    #[test]
    fn test_bind_with_transform() {
        let doc = Document::new();
        let item = doc.create_element("li").unwrap();
        let done = signal(false);

        let _sub = bind_with(&done, &item, "className", |d: &bool| {
            if *d { "done" } else { "" }
        });
        assert_eq!(item.attribute("class").as_deref(), Some(""));
        done.set(true);
        assert!(item.class_list_contains("done"));
    }

    #[test]
    fn test_bind_flow_length() {
        let doc = Document::new();
        let badge = doc.create_element("span").unwrap();
        let items = signal(vec![1, 2, 3]);
        let evens = flow(&items).filter(|n| n % 2 == 0);

        let _sub = bind_with(&evens, &badge, "textContent", |v: &Vec<i32>| v.len());
        assert_eq!(badge.text_content(), "1");
        items.set(vec![2, 4, 6, 8]);
        assert_eq!(badge.text_content(), "4");
    }

    #[test]
    fn test_text_content_binding_keeps_node_count() {
        let doc = Document::new();
        let span = doc.create_element("span").unwrap();
        let count = signal(0);

        let _sub = bind(&count, &span, "textContent");
        let before = doc.node_count();
        for n in 1..=1000 {
            count.set(n);
        }
        assert_eq!(doc.node_count(), before);
        assert_eq!(span.text_content(), "1000");
    }
}
