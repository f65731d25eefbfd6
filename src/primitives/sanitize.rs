//! Sanitize - Allowlist HTML cleaning and URL checking.
//!
//! [`sanitize`] parses markup into a detached subtree, collapses every
//! element whose tag is not allowed into a text node holding its text, and
//! strips attributes that are not allowed for their tag. [`safe_url`] only
//! lets `http` and `https` through.

use tracing::debug;
use url::Url;

use crate::config::{SanitizeOptions, DEFAULT_ORIGIN};
use crate::engine::{Document, Node};

/// Returned by [`safe_url`] for anything it rejects.
pub const URL_PLACEHOLDER: &str = "#";

/// Sanitize `html` with `options`, resolving URLs against `doc`'s origin.
pub fn sanitize(doc: &Document, html: &str, options: &SanitizeOptions) -> String {
    let Ok(root) = doc.create_element("template") else {
        return String::new();
    };
    root.set_inner_html(html);

    let mut removed = 0;
    clean(&root, options, &doc.config().origin, &mut removed);
    let markup = root.inner_html();

    if let Err(err) = doc.collect(&root) {
        debug!(%err, "sanitize scratch tree not collected");
    }
    if removed > 0 {
        debug!(removed, "sanitize collapsed disallowed elements");
    }
    markup
}

/// [`sanitize`] on a scratch document with default configuration.
pub fn sanitize_with(html: &str, options: &SanitizeOptions) -> String {
    sanitize(&Document::new(), html, options)
}

fn clean(node: &Node, options: &SanitizeOptions, origin: &Url, removed: &mut usize) {
    for child in node.children() {
        let Some(tag) = child.tag() else { continue };

        if !options.is_tag_allowed(&tag) {
            let doc = child.document();
            let text = doc.create_text(&child.text_content());
            match child.replace_with(&text) {
                Ok(()) => {
                    if let Err(err) = doc.collect(&child) {
                        debug!(%err, tag, "collapsed element not collected");
                    }
                }
                Err(err) => {
                    debug!(%err, tag, "collapse failed, dropping element");
                    child.remove();
                }
            }
            *removed += 1;
            continue;
        }

        for name in child.attribute_names() {
            if !options.is_attribute_allowed(&tag, &name) {
                child.remove_attribute(&name);
            } else if options.check_urls && matches!(name.as_str(), "href" | "src") {
                let value = child.attribute(&name).unwrap_or_default();
                child.set_attribute(&name, &safe_url_in(&value, origin));
            }
        }

        clean(&child, options, origin, removed);
    }
}

// =============================================================================
// URLs
// =============================================================================

/// `url` unchanged if it resolves (against the default origin) to `http` or
/// `https`, [`URL_PLACEHOLDER`] otherwise. Never fails.
pub fn safe_url(url: &str) -> String {
    match Url::parse(DEFAULT_ORIGIN) {
        Ok(origin) => safe_url_in(url, &origin),
        Err(_) => URL_PLACEHOLDER.to_string(),
    }
}

/// [`safe_url`] against an explicit origin.
pub fn safe_url_in(url: &str, origin: &Url) -> String {
    if url.trim().is_empty() {
        return URL_PLACEHOLDER.to_string();
    }
    match origin.join(url) {
        Ok(resolved) if matches!(resolved.scheme(), "http" | "https") => url.to_string(),
        _ => URL_PLACEHOLDER.to_string(),
    }
}

impl Document {
    /// Sanitize with this document's configured policy.
    pub fn sanitize(&self, html: &str) -> String {
        sanitize(self, html, &self.config().sanitize)
    }

    /// [`safe_url`] against this document's origin.
    pub fn safe_url(&self, url: &str) -> String {
        safe_url_in(url, &self.config().origin)
    }
}
