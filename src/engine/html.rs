//! HTML - Fragment parser and serializer for the document arena.
//!
//! The parser is forgiving the way `innerHTML` is: it never fails. Comments
//! and doctypes are dropped, stray end tags ignored, unclosed elements closed
//! at the end of input. It does not implement the full HTML5 tree builder;
//! the only implied end tags are `p`, `li` and `option` closing a sibling of
//! the same name.

use super::document::{NodeId, NodeKind, Tree};

/// Elements with no content and no end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr",
];

/// Elements whose content is kept verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

// =============================================================================
// Serializer
// =============================================================================

pub(crate) fn serialize_node(tree: &Tree, id: NodeId, out: &mut String) {
    let Some(node) = tree.nodes.get(id) else { return };
    match &node.kind {
        NodeKind::Text(text) => {
            let raw = node
                .parent
                .and_then(|p| tree.nodes.get(p))
                .and_then(|p| p.tag())
                .is_some_and(is_raw_text);
            if raw {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeKind::Element(tag) => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in &node.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attribute(value, out);
                out.push('"');
            }
            out.push('>');
            if is_void(tag) {
                return;
            }
            serialize_children(tree, id, out);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

pub(crate) fn serialize_children(tree: &Tree, id: NodeId, out: &mut String) {
    let Some(node) = tree.nodes.get(id) else { return };
    for child in &node.children {
        serialize_node(tree, *child, out);
    }
}

pub fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

pub fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

// =============================================================================
// Entities
// =============================================================================

/// Decode character references. Unknown references are kept as written.
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        match decode_reference(rest) {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode one reference at the start of `input` (which begins with `&`).
/// Returns the character and the number of bytes consumed.
fn decode_reference(input: &str) -> Option<(char, usize)> {
    let end = input.find(';')?;
    let body = &input[1..end];
    let c = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let number = body.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code).unwrap_or('\u{fffd}')
        }
    };
    Some((c, end + 1))
}

// =============================================================================
// Parser
// =============================================================================

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    /// Consume through `marker`, returning what came before it. Without a
    /// match, consumes everything.
    fn take_until(&mut self, marker: &str) -> &'a str {
        let rest = self.rest();
        match rest.find(marker) {
            Some(end) => {
                self.pos += end + marker.len();
                &rest[..end]
            }
            None => {
                self.pos = self.src.len();
                rest
            }
        }
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }
}

struct StartTag {
    name: String,
    attributes: Vec<(String, String)>,
    self_closing: bool,
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '/' | '>' | '=' | '"' | '\'' | '<')
}

/// Parse a start tag; the cursor sits just past `<`.
fn parse_start_tag(cursor: &mut Cursor<'_>) -> StartTag {
    let name = cursor.take_while(is_name_char).to_ascii_lowercase();
    let mut attributes: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        cursor.skip_whitespace();
        if cursor.eat("/>") {
            self_closing = true;
            break;
        }
        if cursor.eat(">") || cursor.peek().is_none() {
            break;
        }

        let attr = cursor.take_while(is_name_char).to_ascii_lowercase();
        if attr.is_empty() {
            // Stray '/', quote or '='.
            cursor.pos += cursor.peek().map_or(0, char::len_utf8);
            continue;
        }

        cursor.skip_whitespace();
        let value = if cursor.eat("=") {
            cursor.skip_whitespace();
            if cursor.eat("\"") {
                decode_entities(cursor.take_until("\""))
            } else if cursor.eat("'") {
                decode_entities(cursor.take_until("'"))
            } else {
                decode_entities(cursor.take_while(|c| !c.is_whitespace() && c != '>'))
            }
        } else {
            String::new()
        };

        // First occurrence wins.
        if !attributes.iter().any(|(key, _)| *key == attr) {
            attributes.push((attr, value));
        }
    }

    StartTag {
        name,
        attributes,
        self_closing,
    }
}

fn append(tree: &mut Tree, parent: NodeId, kind: NodeKind) -> NodeId {
    let id = tree.insert(kind);
    if let Some(data) = tree.nodes.get_mut(id) {
        data.parent = Some(parent);
    }
    if let Some(data) = tree.nodes.get_mut(parent) {
        data.children.push(id);
    }
    id
}

fn append_text(tree: &mut Tree, parent: NodeId, text: &str) {
    if text.is_empty() {
        return;
    }
    let last = tree
        .nodes
        .get(parent)
        .and_then(|p| p.children.last().copied());
    if let Some(NodeKind::Text(existing)) = last
        .and_then(|id| tree.nodes.get_mut(id))
        .map(|n| &mut n.kind)
    {
        existing.push_str(text);
        return;
    }
    append(tree, parent, NodeKind::Text(text.to_string()));
}

fn tag_of(tree: &Tree, id: NodeId) -> Option<&str> {
    tree.nodes.get(id).and_then(|n| n.tag())
}

/// Parse `html` and append the resulting nodes to `parent`.
pub(crate) fn parse_into(tree: &mut Tree, parent: NodeId, html: &str) {
    let mut cursor = Cursor { src: html, pos: 0 };
    // Open elements; the fragment parent is never popped.
    let mut open = vec![parent];

    while cursor.peek().is_some() {
        let current = open[open.len() - 1];
        let rest = cursor.rest();

        if cursor.eat("<!--") {
            cursor.take_until("-->");
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            cursor.take_until(">");
        } else if rest.starts_with("</") {
            cursor.pos += 2;
            let name = cursor.take_until(">").trim().to_ascii_lowercase();
            if let Some(depth) = (1..open.len())
                .rev()
                .find(|&i| tag_of(tree, open[i]) == Some(name.as_str()))
            {
                open.truncate(depth);
            }
        } else if rest.starts_with('<')
            && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
        {
            cursor.pos += 1;
            let tag = parse_start_tag(&mut cursor);

            if matches!(tag.name.as_str(), "p" | "li" | "option")
                && tag_of(tree, current) == Some(tag.name.as_str())
            {
                open.pop();
            }
            let current = open[open.len() - 1];

            let id = append(tree, current, NodeKind::Element(tag.name.clone()));
            if let Some(data) = tree.nodes.get_mut(id) {
                data.attributes = tag.attributes;
            }

            if is_raw_text(&tag.name) {
                if !tag.self_closing {
                    let lower = cursor.rest().to_ascii_lowercase();
                    let end = lower
                        .find(&format!("</{}", tag.name))
                        .unwrap_or(lower.len());
                    let content = &cursor.rest()[..end];
                    cursor.pos += end;
                    append_text(tree, id, content);
                    if cursor.peek().is_some() {
                        cursor.take_until(">");
                    }
                }
            } else if !tag.self_closing && !is_void(&tag.name) {
                open.push(id);
            }
        } else {
            // Text runs to the next '<' that could start markup.
            let end = match rest.find('<') {
                Some(0) => rest[1..].find('<').map_or(rest.len(), |i| i + 1),
                Some(i) => i,
                None => rest.len(),
            };
            cursor.pos += end;
            append_text(tree, current, &decode_entities(&rest[..end]));
        }
    }
}
