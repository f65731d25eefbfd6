//! # spark-dom
//!
//! Reactive DOM runtime for Rust.
//!
//! Fine-grained reactivity without a virtual DOM: signals push changes
//! straight into the nodes that display them.
//!
//! ## Architecture
//!
//! Everything is built from four layers, each usable on its own:
//!
//! ```text
//! Signal → Flow → element / bind / text → Component (mount, props, destroy)
//! ```
//!
//! - A [`Signal`] holds one value and notifies subscribers synchronously on
//!   every change. Subscribing replays the current value.
//! - A [`Flow`] derives sequences (`filter`, `map`, `sort`) from a signal
//!   and keeps them current.
//! - The binder builds nodes in a [`Document`] and ties attributes, text and
//!   children to signals.
//! - Components pair per-instance data with a view and own every
//!   subscription they create, so `destroy` leaves nothing behind.
//!
//! ## Modules
//!
//! - [`signals`] - Signal, ReadSignal, Flow, Subscription
//! - [`engine`] - Document arena, nodes, properties, events, HTML
//! - [`primitives`] - element, text, bind, sanitize, safe_url
//! - [`component`] - Definitions, instances and lifecycle
//! - [`bridge`] - Backend command errors and the invoke seam
//! - [`config`] - Origin and sanitize policy
//! - [`types`] - DomValue and Props

pub mod bridge;
pub mod component;
pub mod config;
pub mod engine;
pub mod error;
pub mod primitives;
pub mod signals;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{Error, Result};

pub use config::{DomConfig, SanitizeOptions};

pub use signals::{
    compute, flow, signal, watch, Cleanup, Flow, Observable, ReadSignal, Sequence, Signal,
    Subscription,
};

pub use engine::{Document, Event, Listener, ListenerId, ListenerOptions, Node, NodeId};

pub use primitives::{
    bind, bind_with, element, element_with_bindings, safe_url, safe_url_in, sanitize,
    sanitize_with, text, AttrValue, Attrs, BoundSignal, Child, TextContent,
};

pub use component::{
    create_component, mount, Component, ComponentDef, ComponentFactory, Lifecycle, NodeMap,
    Scope, View,
};

pub use bridge::{call, CommandError, Invoke, Severity};
