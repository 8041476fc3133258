// ABOUTME: Report of the top-level quotes and signature in a normalized message body.
// ABOUTME: Decides which quotes are long enough to be shown collapsed.

use ego_tree::NodeId;
use scraper::Html;
use serde::Serialize;

use crate::dom::{self, NodeRef};
use crate::plaintext::{count_lines, render_nodes, render_subtree};
use crate::selector::get_or_compile;

const SIGNATURE_SELECTOR: &str = ".moz-signature";

/// One blockquote with no blockquote ancestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteInfo {
    #[serde(skip)]
    pub node: NodeId,
    /// Non-blank rendered lines, nested quotes included.
    pub lines: usize,
    /// First non-blank rendered line.
    pub preview: String,
    pub collapsed: bool,
}

/// The signature block of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureInfo {
    #[serde(skip)]
    pub node: NodeId,
    /// Non-blank rendered lines after the delimiter.
    pub lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteReport {
    pub quotes: Vec<QuoteInfo>,
    pub signature: Option<SignatureInfo>,
}

/// Blockquotes that are not nested in another blockquote, in document order.
///
/// A quote is collapsed when it renders to more than `hide_quote_length`
/// non-blank lines.
pub fn topmost_quotes(doc: &Html, hide_quote_length: usize) -> Vec<QuoteInfo> {
    let selector = match get_or_compile("blockquote") {
        Some(selector) => selector,
        None => return Vec::new(),
    };
    doc.select(&selector)
        .filter(|bq| !bq.ancestors().any(dom::is_blockquote))
        .filter_map(|bq| {
            let node = doc.tree.get(bq.id())?;
            let text = render_subtree(node);
            let lines = count_lines(&text);
            let preview = text
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("")
                .to_string();
            Some(QuoteInfo {
                node: bq.id(),
                lines,
                preview,
                collapsed: lines > hide_quote_length,
            })
        })
        .collect()
}

fn is_delimiter_line(line: &str) -> bool {
    line.trim_end() == "--"
}

/// Finds the signature: a `.moz-signature` element, else the first text
/// node outside any quote with a line reading exactly `-- `.
pub fn find_signature(doc: &Html) -> Option<NodeId> {
    if let Some(selector) = get_or_compile(SIGNATURE_SELECTOR) {
        if let Some(sig) = doc.select(&selector).next() {
            return Some(sig.id());
        }
    }
    let body = doc.tree.get(dom::body_id(doc))?;
    let found = body
        .descendants()
        .filter(|node| !dom::in_blockquote(*node))
        .find(|node| {
            node.value()
                .as_text()
                .map_or(false, |text| text.lines().any(is_delimiter_line))
        })
        .map(|node| node.id());
    found
}

fn signature_lines(node: NodeRef<'_>) -> usize {
    if node.value().is_element() {
        let text = render_subtree(node);
        let lines: Vec<&str> = text.lines().collect();
        let start = match lines.first() {
            Some(first) if is_delimiter_line(first) => 1,
            _ => 0,
        };
        return count_lines(&lines[start..].join("\n"));
    }
    let text = render_nodes(std::iter::once(node).chain(node.next_siblings()));
    let after: Vec<&str> = text
        .lines()
        .skip_while(|line| !is_delimiter_line(line))
        .skip(1)
        .collect();
    count_lines(&after.join("\n"))
}

/// Builds the quote report for a normalized document.
pub fn quote_report(doc: &Html, hide_quote_length: usize) -> QuoteReport {
    let signature = find_signature(doc).and_then(|id| {
        let node = doc.tree.get(id)?;
        Some(SignatureInfo {
            node: id,
            lines: signature_lines(node),
        })
    });
    QuoteReport {
        quotes: topmost_quotes(doc, hide_quote_length),
        signature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topmost_quotes_skip_nested() {
        let doc = Html::parse_document(concat!(
            "<body>reply",
            "<blockquote>one<br>two<blockquote>three</blockquote></blockquote>",
            "<p>mid</p><blockquote>four</blockquote></body>"
        ));
        let quotes = topmost_quotes(&doc, 2);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].lines, 3);
        assert_eq!(quotes[0].preview, "one");
        assert!(quotes[0].collapsed);
        assert_eq!(quotes[1].lines, 1);
        assert!(!quotes[1].collapsed);
    }

    #[test]
    fn test_moz_signature() {
        let doc = Html::parse_document(
            r#"<body>hi<div class="moz-signature">-- <br>Jane<br>Example Corp</div></body>"#,
        );
        let report = quote_report(&doc, 5);
        assert!(report.quotes.is_empty());
        assert_eq!(report.signature.map(|s| s.lines), Some(2));
    }

    #[test]
    fn test_text_delimiter_signature() {
        let doc = Html::parse_document("<body>hi<br>-- <br>Jane<br>Example Corp</body>");
        let report = quote_report(&doc, 5);
        assert_eq!(report.signature.map(|s| s.lines), Some(2));
    }

    #[test]
    fn test_delimiter_inside_quote_is_not_a_signature() {
        let doc = Html::parse_document("<body>hi<blockquote>-- <br>old sig</blockquote></body>");
        assert!(find_signature(&doc).is_none());
    }

    #[test]
    fn test_report_serializes_without_node_ids() {
        let doc = Html::parse_document("<body>hi<blockquote>old</blockquote></body>");
        let json = serde_json::to_value(quote_report(&doc, 5)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "quotes": [{"lines": 1, "preview": "old", "collapsed": false}],
                "signature": null
            })
        );
    }
}
