// ABOUTME: Fusion of sibling blockquotes separated only by whitespace or <br> nodes.
// ABOUTME: Works from a snapshot of blockquote ids so absorbed nodes never invalidate the walk.

use std::collections::HashSet;

use ego_tree::NodeId;
use scraper::Html;

use crate::dom::{self, NodeRef};
use crate::error::QuotingError;
use crate::selector::get_or_compile;

/// Result of one fusion pass.
#[derive(Debug, Default)]
pub struct FusionOutcome {
    /// Number of blockquotes absorbed into a preceding sibling.
    pub fused: usize,
    /// Blockquotes left un-fused because the sibling chain contradicted the lookahead.
    pub inconsistencies: Vec<QuotingError>,
}

/// True when `node` starts a chain of zero or more whitespace nodes ending
/// in a blockquote.
fn blockquote_follows(node: Option<NodeRef<'_>>) -> bool {
    match node {
        Some(n) if dom::is_blockquote(n) => true,
        Some(n) if dom::can_include(n) => blockquote_follows(n.next_sibling()),
        _ => false,
    }
}

enum Step {
    Done,
    Absorb {
        whitespace: Vec<NodeId>,
        next: NodeId,
    },
    Inconsistent,
}

fn next_step(doc: &Html, id: NodeId) -> Step {
    match doc.tree.get(id) {
        Some(node) if blockquote_follows(node.next_sibling()) => absorb_step(node),
        _ => Step::Done,
    }
}

/// Collects the separators after `node` and the blockquote they lead to,
/// once the lookahead has promised one.
fn absorb_step(node: NodeRef<'_>) -> Step {
    let whitespace: Vec<NodeId> = node
        .next_siblings()
        .take_while(|n| dom::can_include(*n))
        .map(|n| n.id())
        .collect();
    match node.next_siblings().nth(whitespace.len()) {
        Some(next) if dom::is_blockquote(next) => Step::Absorb {
            whitespace,
            next: next.id(),
        },
        _ => Step::Inconsistent,
    }
}

/// Merges every blockquote with the blockquotes that follow it, separated
/// only by whitespace or `<br>`. The separators move into the merged quote.
///
/// Only siblings are merged; nested blockquotes keep their nesting.
pub fn fuse_blockquotes(doc: &mut Html) -> FusionOutcome {
    let mut outcome = FusionOutcome::default();
    let selector = match get_or_compile("blockquote") {
        Some(selector) => selector,
        None => return outcome,
    };
    let snapshot: Vec<NodeId> = doc.select(&selector).map(|el| el.id()).collect();
    let mut absorbed: HashSet<NodeId> = HashSet::new();

    for id in snapshot {
        if absorbed.contains(&id) {
            continue;
        }
        loop {
            match next_step(doc, id) {
                Step::Done => break,
                Step::Absorb { whitespace, next } => {
                    dom::append_all(doc, id, &whitespace);
                    let children = dom::child_ids(doc, next);
                    dom::append_all(doc, id, &children);
                    dom::detach(doc, next);
                    absorbed.insert(next);
                    outcome.fused += 1;
                }
                Step::Inconsistent => {
                    let err = QuotingError::inconsistency(
                        "fuse_blockquotes",
                        Some(anyhow::anyhow!(
                            "sibling after whitespace run is not a blockquote"
                        )),
                    );
                    log::error!("{}", err);
                    outcome.inconsistencies.push(err);
                    break;
                }
            }
        }
    }

    if outcome.fused > 0 {
        log::debug!("fused {} blockquote(s)", outcome.fused);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::serialize::body_html;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fuses_across_brs_and_keeps_nesting() {
        let mut doc = Html::parse_document(concat!(
            "<body><blockquote>A</blockquote><br/><br/><blockquote>B</blockquote>",
            "<blockquote>C<blockquote>nested</blockquote></blockquote></body>"
        ));
        let outcome = fuse_blockquotes(&mut doc);
        assert_eq!(outcome.fused, 2);
        assert!(outcome.inconsistencies.is_empty());
        assert_eq!(
            body_html(&doc),
            "<blockquote>A<br /><br />BC<blockquote>nested</blockquote></blockquote>"
        );
    }

    #[test]
    fn test_absorb_step_reports_broken_chain() {
        let doc = Html::parse_document("<body><blockquote>A</blockquote><br><p>not a quote</p></body>");
        let selector = get_or_compile("blockquote").unwrap();
        let id = doc.select(&selector).next().unwrap().id();
        let node = doc.tree.get(id).unwrap();
        assert!(matches!(absorb_step(node), Step::Inconsistent));
        assert!(matches!(next_step(&doc, id), Step::Done));
    }

    #[test]
    fn test_whitespace_text_between_quotes_moves_in() {
        let mut doc = Html::parse_document(
            "<body><blockquote>A</blockquote>\n  <blockquote>B</blockquote></body>",
        );
        assert_eq!(fuse_blockquotes(&mut doc).fused, 1);
        assert_eq!(body_html(&doc), "<blockquote>A\n  B</blockquote>");
    }

    #[test]
    fn test_text_between_quotes_blocks_fusion() {
        let input = "<blockquote>A</blockquote>reply<blockquote>B</blockquote>";
        let mut doc = Html::parse_document(&format!("<body>{}</body>", input));
        assert_eq!(fuse_blockquotes(&mut doc).fused, 0);
        assert_eq!(body_html(&doc), input);
    }

    #[test]
    fn test_trailing_brs_without_quote_stay_outside() {
        let input = "<blockquote>A</blockquote><br /><br />";
        let mut doc = Html::parse_document(&format!("<body>{}</body>", input));
        assert_eq!(fuse_blockquotes(&mut doc).fused, 0);
        assert_eq!(body_html(&doc), input);
    }

    #[test]
    fn test_nested_siblings_fuse_inside_parent() {
        let mut doc = Html::parse_document(
            "<body><blockquote><blockquote>x</blockquote><blockquote>y</blockquote></blockquote></body>",
        );
        assert_eq!(fuse_blockquotes(&mut doc).fused, 1);
        assert_eq!(
            body_html(&doc),
            "<blockquote><blockquote>xy</blockquote></blockquote>"
        );
    }
}
