//! Components - Data, view and lifecycle bundled into one instance.
//!
//! - [`ComponentDef`] - Declarative definition (data, node, hooks)
//! - [`create_component`] - Definition → [`ComponentFactory`]
//! - [`Component`] - Instance with `mount` / `update_props` / `destroy`
//! - [`Scope`] - What `on_create` / `on_props` / `on_destroy` receive
//! - [`View`] / [`NodeMap`] - The node side of a component
//!
//! # Example
//!
//! ```ignore
//! let factory = create_component(
//!     ComponentDef::new(
//!         |_props| signal(0),
//!         |doc, count| element(doc, "button", Attrs::new(), Child::from(count)).map_err(Into::into),
//!     )
//!     .on_create(|scope| {
//!         let count = scope.data().clone();
//!         scope.node().add_event_listener(
//!             "click",
//!             Rc::new(move |_| count.update(|n| n + 1)),
//!             ListenerOptions::NONE,
//!         );
//!         Ok(())
//!     }),
//! );
//!
//! let counter = mount(&factory, &doc, Some(&body), Props::new())?;
//! counter.destroy()?;
//! ```

mod definition;
mod instance;
mod mount;
mod view;

pub use definition::ComponentDef;
pub use instance::{Component, Lifecycle, Scope};
pub use mount::{create_component, mount, ComponentFactory};
pub use view::{NodeMap, View, CONTAINER};
