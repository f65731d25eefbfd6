//! Error types for the runtime.
//!
//! The runtime's own failure surface is narrow. Signals never fail, the
//! element builder only rejects invalid tag names, and lifecycle hooks hand
//! their errors back through [`Error::Hook`].

use thiserror::Error;

/// Errors raised by the DOM engine and the component runtime.
#[derive(Error, Debug)]
pub enum Error {
    /// Tag name is empty or contains characters outside `[A-Za-z0-9-]`.
    #[error("invalid tag name: {0:?}")]
    InvalidTag(String),

    /// The node was collected from its document.
    #[error("node no longer exists in its document")]
    StaleNode,

    /// Appending a node into itself, its own subtree, or a text node.
    #[error("node cannot be inserted at this position")]
    HierarchyRequest,

    /// Mounting a component that has already been destroyed.
    #[error("component has been destroyed and cannot be mounted again")]
    Destroyed,

    /// A lifecycle hook returned an error.
    #[error("{hook} hook failed: {source}")]
    Hook {
        hook: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration JSON could not be decoded.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Configured origin is not an absolute URL.
    #[error("invalid origin: {0}")]
    InvalidOrigin(#[from] url::ParseError),
}

impl Error {
    pub(crate) fn hook(hook: &'static str, source: anyhow::Error) -> Self {
        Error::Hook { hook, source }
    }
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;
