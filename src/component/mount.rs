//! Factories and the `mount` convenience.

use std::fmt;
use std::rc::Rc;

use crate::engine::{Document, Node};
use crate::error::Result;
use crate::types::Props;

use super::definition::ComponentDef;
use super::instance::Component;
use super::view::View;

/// Stamps out independent instances of one definition.
pub struct ComponentFactory<D, N> {
    def: Rc<ComponentDef<D, N>>,
}

impl<D, N> Clone for ComponentFactory<D, N> {
    fn clone(&self) -> Self {
        Self {
            def: self.def.clone(),
        }
    }
}

impl<D, N> fmt::Debug for ComponentFactory<D, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentFactory").field(&self.def).finish()
    }
}

impl<D: 'static, N: View + 'static> ComponentFactory<D, N> {
    /// A fresh instance in `Created`. Nothing is materialized until `mount`.
    pub fn create(&self, doc: &Document, props: Props) -> Component<D, N> {
        Component::new(self.def.clone(), doc, props)
    }
}

/// Turn a definition into a factory.
pub fn create_component<D: 'static, N: View + 'static>(
    def: ComponentDef<D, N>,
) -> ComponentFactory<D, N> {
    ComponentFactory { def: Rc::new(def) }
}

/// Create an instance and mount it into `container`.
pub fn mount<D: 'static, N: View + 'static>(
    factory: &ComponentFactory<D, N>,
    doc: &Document,
    container: Option<&Node>,
    props: Props,
) -> Result<Component<D, N>> {
    let component = factory.create(doc, props);
    component.mount(container)?;
    Ok(component)
}
