// ABOUTME: Client-specific quote markers for Hotmail, Yahoo and Outlook message bodies.
// ABOUTME: Selector-driven detection plus Outlook's top-border separator div.

use ego_tree::NodeId;
use scraper::Html;

use super::{detect_by_marker_selector, wrap_region_starting_at};
use crate::dom;
use crate::dom::style::{set_style_property, Borders, LineStyle, Rgb};
use crate::selector::get_or_compile;

/// Horizontal rules Hotmail and friends put above the quoted message,
/// tried in order until one matches.
pub const HOTMAIL_SELECTORS: &[&str] = &[
    "body > hr",
    "body > div > hr",
    "body > pre > hr",
    "#stopSpelling",
];

pub const MISC_SELECTOR: &str = ".yahoo_quoted";

pub const OUTLOOK_HEADER_SELECTOR: &str = ".OutlookMessageHeader";

/// Top border colors Outlook uses for its reply separator. Observed in the
/// wild, not documented anywhere.
pub const OUTLOOK_RULE_COLORS: &[Rgb] = &[Rgb(181, 196, 223), Rgb(225, 225, 225)];

/// First match of `css` that is not part of quoted text.
fn find_unquoted_marker(doc: &Html, css: &str) -> Option<NodeId> {
    let selector = get_or_compile(css)?;
    let found = doc
        .select(&selector)
        .find(|el| !el.ancestors().any(dom::is_blockquote))
        .map(|el| el.id());
    found
}

/// Wraps the region after the first Hotmail-style rule and removes the rule.
///
/// Rules inside quoted text belong to the quoted message and are skipped.
/// A rule whose region cannot be wrapped stays in place.
pub fn convert_hotmail_quoting(doc: &mut Html) -> bool {
    HOTMAIL_SELECTORS.iter().any(|css| {
        let marker = match find_unquoted_marker(doc, css) {
            Some(marker) => marker,
            None => return false,
        };
        log::debug!("hotmail rule found for {:?}", css);
        if wrap_region_starting_at(doc, marker) {
            dom::detach(doc, marker);
        }
        true
    })
}

/// Yahoo marks the quoted part with a class; the marker stays in place.
pub fn convert_misc_quoting(doc: &mut Html) -> bool {
    detect_by_marker_selector(doc, MISC_SELECTOR, false)
}

/// Outlook: the message header block, then the first separator div.
pub fn convert_outlook_quoting(doc: &mut Html) -> bool {
    let header = detect_by_marker_selector(doc, OUTLOOK_HEADER_SELECTOR, false);
    let separator = convert_outlook_separator(doc);
    header || separator
}

/// Whether resolved borders look like Outlook's reply separator.
pub fn is_outlook_separator(borders: &Borders) -> bool {
    let top = &borders.top;
    top.color.map_or(false, |c| OUTLOOK_RULE_COLORS.contains(&c))
        && top.style == LineStyle::Solid
        && borders.left.is_zero_width()
        && borders.right.is_zero_width()
        && borders.bottom.is_zero_width()
}

fn find_outlook_separator(doc: &Html) -> Option<NodeId> {
    let selector = get_or_compile("div")?;
    let found = doc
        .select(&selector)
        .find(|div| {
            div.value()
                .attr("style")
                .map_or(false, |style| is_outlook_separator(&Borders::from_style(style)))
        })
        .map(|div| div.id());
    found
}

fn convert_outlook_separator(doc: &mut Html) -> bool {
    let marker = match find_outlook_separator(doc) {
        Some(marker) => marker,
        None => return false,
    };
    log::debug!("outlook separator div found");
    wrap_region_starting_at(doc, marker);
    set_style_property(doc, marker, "border-top-width", "0");
    true
}
