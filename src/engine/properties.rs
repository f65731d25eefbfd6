//! Element properties - which names are properties, and how they store.
//!
//! A binding writes a property when the node has one by that name and falls
//! back to an attribute otherwise. This table decides "has one".
//!
//! | Kind | Storage | Example |
//! |------|---------|---------|
//! | `Reflect` | string attribute | `id`, `className` → `class`, `href` |
//! | `BoolReflect` | attribute presence | `hidden`, `disabled` |
//! | `State` | live value, defaults from an attribute | `value`, `checked` |
//! | `TextContent` | replaces children | `textContent` |

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PropertyKind {
    Reflect(&'static str),
    BoolReflect(&'static str),
    State {
        default_attribute: &'static str,
        boolean: bool,
    },
    TextContent,
}

/// Property kind for `name` on an element with `tag` (`None` for text nodes).
pub(crate) fn property_kind(tag: Option<&str>, name: &str) -> Option<PropertyKind> {
    use PropertyKind::*;

    let Some(tag) = tag else {
        return matches!(name, "textContent" | "data" | "nodeValue").then_some(TextContent);
    };

    match name {
        "id" => return Some(Reflect("id")),
        "className" => return Some(Reflect("class")),
        "title" => return Some(Reflect("title")),
        "lang" => return Some(Reflect("lang")),
        "hidden" => return Some(BoolReflect("hidden")),
        "textContent" => return Some(TextContent),
        _ => {}
    }

    match (tag, name) {
        ("input" | "textarea" | "select" | "option", "value") => Some(State {
            default_attribute: "value",
            boolean: false,
        }),
        ("input", "checked") => Some(State {
            default_attribute: "checked",
            boolean: true,
        }),
        ("option", "selected") => Some(State {
            default_attribute: "selected",
            boolean: true,
        }),
        ("input" | "textarea" | "button" | "select" | "fieldset" | "option", "disabled") => {
            Some(BoolReflect("disabled"))
        }
        ("input" | "textarea", "placeholder") => Some(Reflect("placeholder")),
        ("input" | "button", "type") => Some(Reflect("type")),
        ("input" | "textarea" | "select" | "button", "name") => Some(Reflect("name")),
        ("a" | "link", "href") => Some(Reflect("href")),
        ("a" | "form", "target") => Some(Reflect("target")),
        ("img" | "iframe" | "script", "src") => Some(Reflect("src")),
        ("img", "alt") => Some(Reflect("alt")),
        ("label", "htmlFor") => Some(Reflect("for")),
        _ => None,
    }
}
