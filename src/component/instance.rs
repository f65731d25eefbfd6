//! Component instances - Lifecycle state machine and owned subscriptions.
//!
//! ```text
//! Created ──mount──▶ Mounted ──destroy──▶ Destroyed
//!    └──────────────destroy────────────────▲
//! ```
//!
//! `mount` on a mounted instance and `destroy` on a destroyed one are no-ops.
//! A destroyed instance cannot be mounted again.
//!
//! Every subscription registered through the instance (`watch`, `bind`,
//! `own`, `own_flow`, `Scope::element`) is released by `destroy`, in
//! registration order.

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::Serialize;
use tracing::debug;

use crate::engine::{Document, Node};
use crate::error::{Error, Result};
use crate::primitives::{element_with_bindings, Attrs, Child};
use crate::signals::{watch, Flow, Observable, ReadSignal, Sequence, Signal, Subscription};
use crate::types::{DomValue, Props};

use super::definition::ComponentDef;
use super::view::View;

// =============================================================================
// Lifecycle
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Lifecycle {
    Created,
    Mounted,
    Destroyed,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lifecycle::Created => "created",
            Lifecycle::Mounted => "mounted",
            Lifecycle::Destroyed => "destroyed",
        })
    }
}

// =============================================================================
// Component
// =============================================================================

struct Instance<D, N> {
    def: Rc<ComponentDef<D, N>>,
    document: Document,
    props: Signal<Props>,
    data: OnceCell<D>,
    node: OnceCell<N>,
    subscriptions: RefCell<Vec<Subscription>>,
    lifecycle: Cell<Lifecycle>,
    /// `on_create` has run (successfully or not); a retried mount skips it.
    created: Cell<bool>,
    /// Last `on_props` failure, handed back by `mount` / `update_props`.
    props_error: RefCell<Option<Error>>,
}

/// A live component. Cloning yields another handle to the same instance.
pub struct Component<D, N> {
    inner: Rc<Instance<D, N>>,
}

impl<D, N> Clone for Component<D, N> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D, N> fmt::Debug for Component<D, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("lifecycle", &self.inner.lifecycle.get())
            .field("subscriptions", &self.inner.subscriptions.borrow().len())
            .finish()
    }
}

impl<D: 'static, N: View + 'static> Component<D, N> {
    pub(crate) fn new(def: Rc<ComponentDef<D, N>>, document: &Document, props: Props) -> Self {
        Self {
            inner: Rc::new(Instance {
                def,
                document: document.clone(),
                props: Signal::new(props),
                data: OnceCell::new(),
                node: OnceCell::new(),
                subscriptions: RefCell::new(Vec::new()),
                lifecycle: Cell::new(Lifecycle::Created),
                created: Cell::new(false),
                props_error: RefCell::new(None),
            }),
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.lifecycle.get()
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle() == Lifecycle::Mounted
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle() == Lifecycle::Destroyed
    }

    /// Data, once materialized by `mount`.
    pub fn data(&self) -> Option<&D> {
        self.inner.data.get()
    }

    /// View, once materialized by `mount`.
    pub fn node(&self) -> Option<&N> {
        self.inner.node.get()
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    /// Root node of the view, if any.
    pub fn container(&self) -> Option<Node> {
        self.node().and_then(View::container)
    }

    pub fn props(&self) -> Props {
        self.inner.props.get()
    }

    pub fn props_signal(&self) -> ReadSignal<Props> {
        self.inner.props.read_only()
    }

    /// Number of live subscriptions owned by this instance.
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.borrow().len()
    }

    pub fn ptr_eq(&self, other: &Component<D, N>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn scope(&self) -> Option<Scope<'_, D, N>> {
        Some(Scope {
            component: self,
            data: self.inner.data.get()?,
            node: self.inner.node.get()?,
        })
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Take ownership of `subscription`; it is released on destroy.
    /// Owning after destroy releases it immediately.
    pub fn own(&self, subscription: Subscription) {
        if self.is_destroyed() {
            debug!("subscription released: component already destroyed");
            subscription.unsubscribe();
            return;
        }
        self.inner.subscriptions.borrow_mut().push(subscription);
    }

    /// Own every stage of a flow chain.
    pub fn own_flow<S>(&self, flow: &Flow<S>)
    where
        S: Clone + PartialEq + 'static,
    {
        for stage in flow.subscriptions() {
            self.own(stage.clone());
        }
    }

    /// Subscribe `callback` to `source` and own the subscription.
    pub fn watch<T: 'static>(
        &self,
        source: &impl Observable<T>,
        callback: impl Fn(&T) + 'static,
    ) -> Subscription {
        let subscription = watch(source, callback);
        self.own(subscription.clone());
        subscription
    }

    /// Watch `source` and write its field `source_key` into `target_key` on
    /// `target` (property if present, else attribute).
    ///
    /// The value is read through its serde representation, so `source` can
    /// hold props, a `serde_json::Value` or any `Serialize` struct. A missing
    /// field writes `Null`, which removes the attribute.
    pub fn bind<T: Serialize + 'static>(
        &self,
        source: &impl Observable<T>,
        source_key: &str,
        target: &Node,
        target_key: &str,
    ) -> Subscription {
        let source_key = source_key.to_string();
        let target_key = target_key.to_string();
        let target = target.clone();
        self.watch(source, move |value: &T| {
            let field = serde_json::to_value(value)
                .ok()
                .and_then(|value| value.get(&source_key).cloned())
                .map(DomValue::from)
                .unwrap_or_default();
            target.set_property_or_attribute(&target_key, &field);
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Materialize data and view, run `on_create`, start forwarding props to
    /// `on_props`, then append the root into `container`.
    ///
    /// No-op when already mounted; [`Error::Destroyed`] after destroy. On
    /// error the instance stays `Created`; call `destroy` to release what
    /// `on_create` registered, or mount again. `on_create` runs at most once,
    /// so a retried mount resumes with the props watcher and the attach.
    pub fn mount(&self, container: Option<&Node>) -> Result<&Self> {
        match self.lifecycle() {
            Lifecycle::Mounted => return Ok(self),
            Lifecycle::Destroyed => return Err(Error::Destroyed),
            Lifecycle::Created => {}
        }
        let inner = &self.inner;
        let def = inner.def.clone();

        // 1. DATA
        let data = inner
            .data
            .get_or_init(|| (def.data)(&inner.props.get()));

        // 2. NODE
        if inner.node.get().is_none() {
            let node = (def.node)(&inner.document, data).map_err(|e| Error::hook("node", e))?;
            // A reentrant mount from inside the builder may have won.
            let _ = inner.node.set(node);
        }

        // 3. ON CREATE (at most once per instance)
        if !inner.created.replace(true) {
            if let (Some(hook), Some(scope)) = (&def.on_create, self.scope()) {
                hook(&scope).map_err(|e| Error::hook("on_create", e))?;
            }
        }
        if self.lifecycle() != Lifecycle::Created {
            return match self.lifecycle() {
                Lifecycle::Destroyed => Err(Error::Destroyed),
                _ => Ok(self),
            };
        }

        // 4. PROPS WATCHER (replays the current props)
        let weak = Rc::downgrade(&self.inner);
        let props_watcher = inner
            .props
            .subscribe(move |props| forward_props(&weak, props));
        let props_error = inner.props_error.borrow_mut().take();
        if let Some(err) = props_error {
            props_watcher.unsubscribe();
            return Err(err);
        }

        // 5. ATTACH
        if let (Some(container), Some(root)) = (container, self.container()) {
            if let Err(err) = container.append_child(&root) {
                props_watcher.unsubscribe();
                return Err(err);
            }
        }
        self.own(props_watcher);

        inner.lifecycle.set(Lifecycle::Mounted);
        debug!(
            subscriptions = self.subscription_count(),
            attached = container.is_some(),
            "component mounted"
        );
        Ok(self)
    }

    /// Shallow-merge `partial` into the props and notify once, even when
    /// nothing changed.
    ///
    /// Returns the `on_props` error, if the hook failed.
    pub fn update_props(&self, partial: Props) -> Result<()> {
        let mut next = self.inner.props.get();
        next.extend(partial);
        self.inner.props.replace(next);
        match self.inner.props_error.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Run `on_destroy`, detach the root, release every owned subscription
    /// in registration order, and mark the instance destroyed.
    ///
    /// `on_destroy` only runs if data and view were materialized. Its error
    /// is returned after the teardown has completed.
    pub fn destroy(&self) -> Result<()> {
        if self.is_destroyed() {
            return Ok(());
        }
        let def = self.inner.def.clone();

        // 1. ON DESTROY
        let hook_result = match (&def.on_destroy, self.scope()) {
            (Some(hook), Some(scope)) => hook(&scope).map_err(|e| Error::hook("on_destroy", e)),
            _ => Ok(()),
        };

        // 2. DETACH
        if let Some(root) = self.container() {
            root.remove();
        }

        // 3. RELEASE
        let subscriptions = std::mem::take(&mut *self.inner.subscriptions.borrow_mut());
        for subscription in &subscriptions {
            subscription.unsubscribe();
        }

        self.inner.lifecycle.set(Lifecycle::Destroyed);
        debug!(released = subscriptions.len(), "component destroyed");
        hook_result
    }
}

fn forward_props<D: 'static, N: View + 'static>(weak: &Weak<Instance<D, N>>, props: &Props) {
    let Some(inner) = weak.upgrade() else { return };
    let component = Component { inner };
    let def = component.inner.def.clone();
    let (Some(hook), Some(scope)) = (&def.on_props, component.scope()) else {
        return;
    };
    if let Err(err) = hook(&scope, props) {
        *component.inner.props_error.borrow_mut() = Some(Error::hook("on_props", err));
    }
}

// =============================================================================
// Scope - What hooks see
// =============================================================================

/// Access to an instance from inside its hooks.
pub struct Scope<'a, D, N> {
    component: &'a Component<D, N>,
    data: &'a D,
    node: &'a N,
}

impl<'a, D: 'static, N: View + 'static> Scope<'a, D, N> {
    pub fn data(&self) -> &'a D {
        self.data
    }

    pub fn node(&self) -> &'a N {
        self.node
    }

    pub fn document(&self) -> &'a Document {
        self.component.document()
    }

    /// The instance itself, e.g. to clone into an event handler.
    pub fn component(&self) -> &'a Component<D, N> {
        self.component
    }

    pub fn props(&self) -> Props {
        self.component.props()
    }

    pub fn watch<T: 'static>(
        &self,
        source: &impl Observable<T>,
        callback: impl Fn(&T) + 'static,
    ) -> Subscription {
        self.component.watch(source, callback)
    }

    pub fn bind<T: Serialize + 'static>(
        &self,
        source: &impl Observable<T>,
        source_key: &str,
        target: &Node,
        target_key: &str,
    ) -> Subscription {
        self.component.bind(source, source_key, target, target_key)
    }

    pub fn own(&self, subscription: Subscription) {
        self.component.own(subscription);
    }

    pub fn own_flow<S: Clone + PartialEq + 'static>(&self, flow: &Flow<S>) {
        self.component.own_flow(flow);
    }

    /// Build a flow chain over `source` and own all of its stages.
    pub fn flow<S, R>(&self, source: &Signal<S>, build: impl FnOnce(Flow<S>) -> Flow<R>) -> Flow<R>
    where
        S: Sequence + Clone + PartialEq + 'static,
        R: Clone + PartialEq + 'static,
    {
        let chain = build(crate::signals::flow(source));
        self.own_flow(&chain);
        chain
    }

    /// [`element`](crate::primitives::element) whose bindings this instance owns.
    pub fn element(&self, tag: &str, attrs: Attrs, children: impl Into<Child>) -> Result<Node> {
        let (node, subscriptions) = element_with_bindings(self.document(), tag, attrs, children)?;
        for subscription in subscriptions {
            self.own(subscription);
        }
        Ok(node)
    }

    pub fn update_props(&self, partial: Props) -> Result<()> {
        self.component.update_props(partial)
    }
}
