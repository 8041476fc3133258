// ABOUTME: Quote region wrapping and marker-based detection shared by every heuristic.
// ABOUTME: Wraps a marker and its following siblings in <blockquote type="cite"> after walking back over includable nodes.

//! Quoted-region detection.
//!
//! A heuristic finds a *marker*, the first node of a quoted region, and
//! hands it to [`wrap_region_starting_at`]. The client-specific heuristics
//! live in [`clients`]; the dash-delimited forward marker lives in
//! [`forwarded`].

pub mod clients;
pub mod forwarded;

use ego_tree::NodeId;
use scraper::Html;

use crate::dom::{self, NodeRef};
use crate::selector::get_or_compile;

pub use clients::{convert_hotmail_quoting, convert_misc_quoting, convert_outlook_quoting};
pub use forwarded::convert_forwarded_marker;

fn implies(a: bool, b: bool) -> bool {
    !a || b
}

/// Finds where the region that starts at `marker` really begins.
///
/// Walks back over includable previous siblings, climbing to the parent
/// whenever the current node opens a non-body container. Returns `None` when
/// wrapping would swallow the whole message, or when the region already
/// opens a blockquote.
pub(crate) fn region_start(marker: NodeRef<'_>) -> Option<NodeId> {
    let mut node = marker;
    loop {
        match node.prev_sibling() {
            Some(prev) if dom::can_include(prev) => node = prev,
            Some(_) => break,
            None => match node.parent() {
                Some(parent) if dom::is_blockquote(parent) => return None,
                Some(parent) if !dom::is_body(parent) => node = parent,
                _ => break,
            },
        }
    }

    let parent = node.parent()?;
    let first_child = node.prev_sibling().is_none();
    if implies(first_child, !dom::is_body(parent)) {
        Some(node.id())
    } else {
        None
    }
}

/// Wraps the region starting at `marker` in a new `<blockquote type="cite">`.
///
/// The blockquote is inserted before the region start and the start plus
/// all its following siblings are moved into it. A region that already
/// opens a blockquote is left alone; markers deeper inside a quote are
/// wrapped as nested quotes. Returns whether a blockquote was created.
pub fn wrap_region_starting_at(doc: &mut Html, marker: NodeId) -> bool {
    let start = match doc.tree.get(marker).and_then(region_start) {
        Some(start) => start,
        None => {
            log::debug!("marker opens the body or an existing quote, not wrapping");
            return false;
        }
    };

    let region: Vec<NodeId> = match doc.tree.get(start) {
        Some(node) => std::iter::once(node)
            .chain(node.next_siblings())
            .map(|n| n.id())
            .collect(),
        None => return false,
    };

    let blockquote = match dom::new_blockquote(doc) {
        Some(id) => id,
        None => return false,
    };
    if !dom::insert_before(doc, start, blockquote) {
        return false;
    }
    dom::append_all(doc, blockquote, &region);
    log::debug!("wrapped {} node(s) in a blockquote", region.len());
    true
}

/// Returns the first node matching `css`, if any.
pub(crate) fn find_marker(doc: &Html, css: &str) -> Option<NodeId> {
    let selector = get_or_compile(css)?;
    let found = doc.select(&selector).next().map(|el| el.id());
    found
}

/// Looks up `css`; when it matches, wraps the region starting at the match
/// and, if that wrapped anything, optionally detaches the marker. Returns
/// whether a marker was found.
pub fn detect_by_marker_selector(doc: &mut Html, css: &str, remove_marker_after: bool) -> bool {
    let marker = match find_marker(doc, css) {
        Some(marker) => marker,
        None => return false,
    };
    log::debug!("marker found for {:?}", css);
    if wrap_region_starting_at(doc, marker) && remove_marker_after {
        dom::detach(doc, marker);
    }
    true
}
