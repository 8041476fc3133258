// ABOUTME: DOM predicates and node surgery over scraper's ego-tree arena.
// ABOUTME: Provides body detection, includable-node tests, element construction and node moves.

//! DOM utilities for rewriting message bodies in place.
//!
//! Every helper addresses nodes by [`NodeId`] so callers can snapshot ids
//! from a read-only walk and mutate the tree afterwards without holding a
//! borrow across the mutation.

pub mod serialize;
pub mod style;

use ego_tree::NodeId;
use scraper::node::{Element, Text};
use scraper::{Html, Node};

use crate::selector::get_or_compile;

/// Borrowed view of a node in a parsed document.
pub type NodeRef<'a> = ego_tree::NodeRef<'a, Node>;

/// Case-insensitive tag name check; false for non-element nodes.
pub fn is_tag(node: NodeRef<'_>, tag: &str) -> bool {
    node.value()
        .as_element()
        .map_or(false, |el| el.name().eq_ignore_ascii_case(tag))
}

pub fn is_blockquote(node: NodeRef<'_>) -> bool {
    is_tag(node, "blockquote")
}

/// True for text nodes holding nothing but whitespace (including nbsp).
pub fn is_whitespace_text(node: NodeRef<'_>) -> bool {
    node.value()
        .as_text()
        .map_or(false, |text| text.trim().is_empty())
}

/// Nodes that may be pulled into a quote without changing what it says:
/// `<br>` and whitespace-only text.
pub fn can_include(node: NodeRef<'_>) -> bool {
    is_tag(node, "br") || is_whitespace_text(node)
}

/// Whether `node` is the effective body of the message.
///
/// A node is the body when it is `<body>`, or when it is the only
/// meaningful child of the effective body. Tree roots and the root element
/// of a fragment count as the body so upward walks always stop.
pub fn is_body(node: NodeRef<'_>) -> bool {
    if is_tag(node, "body") {
        return true;
    }
    let parent = match node.parent() {
        Some(parent) => parent,
        None => return true,
    };
    if parent.value().is_fragment() {
        return true;
    }
    let meaningful = parent
        .children()
        .filter(|child| !is_whitespace_text(*child))
        .count();
    meaningful == 1 && is_body(parent)
}

/// True when the node or one of its ancestors is a blockquote.
pub fn in_blockquote(node: NodeRef<'_>) -> bool {
    is_blockquote(node) || node.ancestors().any(is_blockquote)
}

/// The `<body>` element, or the root element when the document has none.
pub fn body_id(doc: &Html) -> NodeId {
    get_or_compile("body")
        .and_then(|sel| doc.select(&sel).next().map(|body| body.id()))
        .unwrap_or_else(|| doc.root_element().id())
}

/// Parses `markup` as a fragment and returns a copy of the first `tag` element.
fn parse_element(markup: &str, tag: &str) -> Option<Element> {
    let fragment = Html::parse_fragment(markup);
    let selector = get_or_compile(tag)?;
    let element = fragment.select(&selector).next()?;
    Some(element.value().clone())
}

/// Creates a detached `<blockquote type="cite">` and returns its id.
pub fn new_blockquote(doc: &mut Html) -> Option<NodeId> {
    let element = parse_element(r#"<blockquote type="cite"></blockquote>"#, "blockquote")?;
    Some(doc.tree.orphan(Node::Element(element)).id())
}

/// Creates a detached text node and returns its id.
pub fn new_text(doc: &mut Html, text: &str) -> NodeId {
    doc.tree.orphan(Node::Text(Text { text: text.into() })).id()
}

/// Moves `node` so it becomes the previous sibling of `target`.
///
/// Returns false when `target` is unknown or has no parent.
pub fn insert_before(doc: &mut Html, target: NodeId, node: NodeId) -> bool {
    let attached = doc
        .tree
        .get(target)
        .map_or(false, |t| t.parent().is_some());
    if !attached || target == node {
        return false;
    }
    match doc.tree.get_mut(target) {
        Some(mut target) => {
            target.insert_id_before(node);
            true
        }
        None => false,
    }
}

/// Moves every node in `nodes`, in order, to the end of `parent`'s children.
pub fn append_all(doc: &mut Html, parent: NodeId, nodes: &[NodeId]) {
    if let Some(mut parent_mut) = doc.tree.get_mut(parent) {
        for &id in nodes {
            if id != parent {
                parent_mut.append_id(id);
            }
        }
    }
}

/// Detaches a node (and its subtree) from the document.
pub fn detach(doc: &mut Html, id: NodeId) {
    if let Some(mut node) = doc.tree.get_mut(id) {
        node.detach();
    }
}

/// Ids of the direct children of `id`, in order.
pub fn child_ids(doc: &Html, id: NodeId) -> Vec<NodeId> {
    doc.tree
        .get(id)
        .map(|node| node.children().map(|child| child.id()).collect())
        .unwrap_or_default()
}

/// Replaces the attributes of an element, keeping its tag and children.
///
/// The replacement element is produced by the HTML parser, so this is only
/// suitable for tags that may appear directly inside `<body>` (div, span, p...).
pub fn replace_attributes(doc: &mut Html, id: NodeId, attrs: &[(String, String)]) -> bool {
    let tag = match doc.tree.get(id).and_then(|n| n.value().as_element()) {
        Some(el) => el.name().to_string(),
        None => return false,
    };

    let mut markup = format!("<{}", tag);
    for (name, value) in attrs {
        markup.push(' ');
        markup.push_str(name);
        markup.push_str("=\"");
        markup.push_str(&serialize::escape_attr(value));
        markup.push('"');
    }
    markup.push_str("></");
    markup.push_str(&tag);
    markup.push('>');

    let element = match parse_element(&markup, &tag) {
        Some(element) => element,
        None => {
            log::warn!("could not rebuild <{}> with new attributes", tag);
            return false;
        }
    };
    match doc.tree.get_mut(id) {
        Some(mut node) => {
            *node.value() = Node::Element(element);
            true
        }
        None => false,
    }
}
