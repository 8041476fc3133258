// ABOUTME: Detection of dash-delimited forward/reply markers such as "-----Original Message-----".
// ABOUTME: Splits the owning text node at the marker and wraps everything from the marker on.

use aho_corasick::AhoCorasick;
use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use super::wrap_region_starting_at;
use crate::dom;

// Leading and trailing dash runs are compared in code: the trailing run
// must repeat the leading one, extra dashes after it are tolerated.
static FORWARD_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(-{5,15})\s*(?:[^\s-]+\s+)*[^\s-]+\s*(-+)").unwrap()
});

static PGP_ARMOR: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(["-----BEGIN PGP", "----END PGP"]).unwrap());

/// Byte offset of the first forward marker in `text`, if any.
///
/// Text that carries PGP armor never yields a marker.
pub fn forward_marker_offset(text: &str) -> Option<usize> {
    if PGP_ARMOR.is_match(text) {
        return None;
    }
    FORWARD_MARKER_RE.captures_iter(text).find_map(|caps| {
        let lead = caps.get(1)?;
        let trail = caps.get(2)?;
        if trail.len() >= lead.len() {
            caps.get(0).map(|m| m.start())
        } else {
            None
        }
    })
}

/// First text node under `root`, in document order, holding a marker.
fn find_marker_text(doc: &Html, root: NodeId) -> Option<(NodeId, usize)> {
    let root = doc.tree.get(root)?;
    root.descendants().find_map(|node| {
        let text = node.value().as_text()?;
        forward_marker_offset(text).map(|offset| (node.id(), offset))
    })
}

/// Finds the first forward marker in the body, splits its text node and
/// wraps the region that starts at the marker. Returns whether a marker
/// was found.
pub fn convert_forwarded_marker(doc: &mut Html) -> bool {
    let body = dom::body_id(doc);
    let (text_id, offset) = match find_marker_text(doc, body) {
        Some(found) => found,
        None => return false,
    };
    let text = match doc.tree.get(text_id).and_then(|n| n.value().as_text()) {
        Some(text) => text.to_string(),
        None => return false,
    };
    let (before, after) = text.split_at(offset);
    log::debug!("forward marker found: {:?}", after.lines().next().unwrap_or(""));

    // blank lead-in is includable, so the node itself starts the region
    if before.trim().is_empty() {
        wrap_region_starting_at(doc, text_id);
        return true;
    }

    // non-blank text before the marker always leaves a region to wrap
    let before_id = dom::new_text(doc, before);
    let after_id = dom::new_text(doc, after);
    if !dom::insert_before(doc, text_id, before_id) || !dom::insert_before(doc, text_id, after_id)
    {
        return false;
    }
    dom::detach(doc, text_id);

    wrap_region_starting_at(doc, after_id);
    true
}
