//! Component definitions - Data, node and lifecycle hooks.
//!
//! A definition is inert; [`create_component`](super::create_component)
//! turns it into a factory that stamps out independent instances.
//!
//! ```ignore
//! #[derive(Clone, Default)]
//! struct Counter { count: Signal<i32> }
//!
//! let def = ComponentDef::<Counter, NodeMap>::default()
//!     .data(|props| Counter { count: signal(props["start"].as_i64().unwrap_or(0) as i32) })
//!     .node(|doc, data| {
//!         let root = element(doc, "div", Attrs::new(), Child::from(&data.count))?;
//!         Ok(NodeMap::new().with("container", root))
//!     })
//!     .on_create(|scope| {
//!         scope.watch(&scope.data().count, |n| tracing::debug!(n, "count"));
//!         Ok(())
//!     });
//! ```

use std::fmt;

use crate::engine::Document;
use crate::types::Props;

use super::instance::Scope;
use super::view::View;

pub(crate) type DataFn<D> = Box<dyn Fn(&Props) -> D>;
pub(crate) type NodeFn<D, N> = Box<dyn Fn(&Document, &D) -> anyhow::Result<N>>;
pub(crate) type HookFn<D, N> = Box<dyn Fn(&Scope<'_, D, N>) -> anyhow::Result<()>>;
pub(crate) type PropsHookFn<D, N> = Box<dyn Fn(&Scope<'_, D, N>, &Props) -> anyhow::Result<()>>;

/// Declarative description of a component.
pub struct ComponentDef<D, N> {
    pub(crate) data: DataFn<D>,
    pub(crate) node: NodeFn<D, N>,
    pub(crate) on_create: Option<HookFn<D, N>>,
    pub(crate) on_props: Option<PropsHookFn<D, N>>,
    pub(crate) on_destroy: Option<HookFn<D, N>>,
}

impl<D, N> Default for ComponentDef<D, N>
where
    D: Default + 'static,
    N: View + Default + 'static,
{
    fn default() -> Self {
        Self::new(|_| D::default(), |_, _| Ok(N::default()))
    }
}

impl<D, N> fmt::Debug for ComponentDef<D, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDef")
            .field("on_create", &self.on_create.is_some())
            .field("on_props", &self.on_props.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .finish()
    }
}

impl<D: 'static, N: View + 'static> ComponentDef<D, N> {
    /// Definition with both builders. Use `default()` when `D` and `N`
    /// have sensible defaults.
    pub fn new(
        data: impl Fn(&Props) -> D + 'static,
        node: impl Fn(&Document, &D) -> anyhow::Result<N> + 'static,
    ) -> Self {
        Self {
            data: Box::new(data),
            node: Box::new(node),
            on_create: None,
            on_props: None,
            on_destroy: None,
        }
    }

    /// Build data per instance from the initial props.
    pub fn data(mut self, data: impl Fn(&Props) -> D + 'static) -> Self {
        self.data = Box::new(data);
        self
    }

    /// Static data template, cloned into every instance.
    ///
    /// Cloning a `Signal` shares it, so signals in the template are shared by
    /// all instances. Use [`data`](Self::data) for per-instance state.
    pub fn data_value(self, data: D) -> Self
    where
        D: Clone,
    {
        self.data(move |_| data.clone())
    }

    /// Build the view from the document and the instance's data.
    pub fn node(mut self, node: impl Fn(&Document, &D) -> anyhow::Result<N> + 'static) -> Self {
        self.node = Box::new(node);
        self
    }

    /// Runs once on mount, after data and node exist. Wire listeners and
    /// watchers here.
    pub fn on_create(
        mut self,
        hook: impl Fn(&Scope<'_, D, N>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.on_create = Some(Box::new(hook));
        self
    }

    /// Runs with the current props on mount and after every change.
    pub fn on_props(
        mut self,
        hook: impl Fn(&Scope<'_, D, N>, &Props) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.on_props = Some(Box::new(hook));
        self
    }

    /// Runs first in `destroy`, before the root is detached and
    /// subscriptions are released.
    pub fn on_destroy(
        mut self,
        hook: impl Fn(&Scope<'_, D, N>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.on_destroy = Some(Box::new(hook));
        self
    }
}
