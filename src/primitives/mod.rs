//! DOM Binder - Element building blocks.
//!
//! This module provides the primitives components are built from:
//! - [`element`] - Build a node tree from (tag, attributes, children)
//! - [`text`] - Standalone text node, static or signal-bound
//! - [`bind`] / [`bind_with`] - Push a signal into a property or attribute
//! - [`sanitize`] / [`safe_url`] - Allowlist HTML cleaning and URL checking
//!
//! # Reactivity
//!
//! Attributes and children can be:
//! - Literals: `.attr("class", "card")`, `"text"`, `42`
//! - Signals: `.bind("title", &title)`, `Child::from(&count)` (stays connected!)
//! - Handlers: `.on("onclick", |event| ...)`
//!
//! Pass the signal itself, not its value:
//!
//! ```ignore
//! // CORRECT - text follows the signal
//! element(&doc, "span", Attrs::new(), Child::from(&count))?;
//!
//! // WRONG - snapshot, never updates
//! element(&doc, "span", Attrs::new(), count.get())?;
//! ```

mod bind;
mod element;
mod sanitize;
mod text;
mod types;

pub use bind::{bind, bind_with};
pub use element::{element, element_with_bindings};
pub use sanitize::{safe_url, safe_url_in, sanitize, sanitize_with, URL_PLACEHOLDER};
pub use text::{text, TextContent};
pub use types::{AttrValue, Attrs, BoundSignal, Child};
