//! Runtime configuration.
//!
//! A [`Document`](crate::engine::Document) carries one [`DomConfig`]: the
//! origin relative URLs resolve against, and the default sanitize policy.
//! Both can be loaded from JSON:
//!
//! ```
//! use spark_dom::config::DomConfig;
//!
//! let config = DomConfig::from_json(r#"{
//!     "origin": "https://app.example",
//!     "sanitize": { "allowed_tags": ["b", "a"], "allowed_attributes": { "a": ["href"] } }
//! }"#).unwrap();
//!
//! assert_eq!(config.origin.as_str(), "https://app.example/");
//! assert!(config.sanitize.check_urls);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Origin used when none is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost/";

// =============================================================================
// SanitizeOptions
// =============================================================================

/// Allowlists used by [`sanitize`](crate::primitives::sanitize).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeOptions {
    /// Tags kept as elements. Everything else collapses to its text.
    pub allowed_tags: Vec<String>,
    /// Attributes kept, per tag. Attributes of other tags are all stripped.
    pub allowed_attributes: HashMap<String, Vec<String>>,
    /// Pass kept `href` / `src` values through `safe_url`.
    pub check_urls: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            allowed_tags: ["b", "i", "em", "strong", "span", "a"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowed_attributes: HashMap::from([(
                "a".to_string(),
                vec!["href".to_string(), "target".to_string()],
            )]),
            check_urls: true,
        }
    }
}

impl SanitizeOptions {
    /// Options allowing exactly `tags`, with no attributes.
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_tags: tags.into_iter().map(Into::into).collect(),
            allowed_attributes: HashMap::new(),
            check_urls: true,
        }
    }

    /// Allow `attributes` on `tag`.
    pub fn allow_attributes<I, S>(mut self, tag: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_attributes
            .entry(tag.to_ascii_lowercase())
            .or_default()
            .extend(attributes.into_iter().map(Into::into));
        self
    }

    pub fn is_tag_allowed(&self, tag: &str) -> bool {
        self.allowed_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_attribute_allowed(&self, tag: &str, attribute: &str) -> bool {
        self.allowed_attributes
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(tag))
            .is_some_and(|(_, attrs)| attrs.iter().any(|a| a.eq_ignore_ascii_case(attribute)))
    }
}

// =============================================================================
// DomConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomConfig {
    /// Origin that relative URLs are resolved against.
    pub origin: Url,
    /// Default policy for `sanitize`.
    pub sanitize: SanitizeOptions,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            sanitize: SanitizeOptions::default(),
        }
    }
}

impl DomConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Default configuration with a different origin.
    pub fn with_origin(origin: &str) -> Result<Self> {
        Ok(Self {
            origin: Url::parse(origin)?,
            ..Self::default()
        })
    }
}

fn default_origin() -> Url {
    Url::parse(DEFAULT_ORIGIN).expect("DEFAULT_ORIGIN is an absolute URL")
}
