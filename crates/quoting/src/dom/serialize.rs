// ABOUTME: Deterministic HTML serializer for rewritten message bodies.
// ABOUTME: Sorted attributes and fixed void-element form make output comparable across runs.

use scraper::{Html, Node};

use super::{body_id, NodeRef};

/// Serializes the children of the message body.
pub fn body_html(doc: &Html) -> String {
    match doc.tree.get(body_id(doc)) {
        Some(body) => inner_html(body),
        None => String::new(),
    }
}

/// Serializes the children of `node` (the node's own tag is not emitted).
pub fn inner_html(node: NodeRef<'_>) -> String {
    let mut out = String::new();
    for child in node.children() {
        serialize_node(child, &mut out);
    }
    out
}

fn serialize_node(node: NodeRef<'_>, out: &mut String) {
    match node.value() {
        Node::Text(text) => {
            if node.parent().map_or(false, is_raw_text_parent) {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Element(el) => {
            let name = el.name();
            out.push('<');
            out.push_str(name);

            let mut attrs: Vec<(&str, &str)> = el.attrs().collect();
            attrs.sort_unstable();
            for (k, v) in attrs {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                out.push_str(&escape_attr(v));
                out.push('"');
            }

            if is_void_element(name) {
                out.push_str(" />");
                return;
            }

            out.push('>');
            for child in node.children() {
                serialize_node(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        _ => {}
    }
}

/// Escape attribute value
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Elements whose text children are written without escaping.
fn is_raw_text_parent(node: NodeRef<'_>) -> bool {
    node.value().as_element().map_or(false, |el| {
        matches!(
            el.name().to_lowercase().as_str(),
            "style"
                | "script"
                | "xmp"
                | "iframe"
                | "noembed"
                | "noframes"
                | "noscript"
                | "plaintext"
        )
    })
}

/// Check if tag is void element
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}
