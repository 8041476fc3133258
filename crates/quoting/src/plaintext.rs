// ABOUTME: Plain-text rendering of normalized message bodies and reply citation helpers.
// ABOUTME: Blockquotes become "> " prefixed lines; <br> and block boundaries become newlines.

//! Plain text output.
//!
//! [`html_to_text`] renders the body the way a text-only reader would see
//! it, with one `>` level per nested blockquote. [`cite_string`] quotes an
//! already plain text for a reply.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node};

use crate::dom::{body_id, NodeRef};

static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BLANK_RUNS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "dd", "div", "dl", "dt", "footer", "h1", "h2", "h3", "h4",
    "h5", "h6", "header", "hr", "li", "ol", "p", "pre", "section", "table", "tr", "ul",
];

const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "title", "noscript"];

/// Quotes one line for a reply: `> ` before plain lines, `>` before lines
/// that are already quoted.
fn cite_line(line: &str) -> String {
    if line.starts_with('>') {
        format!(">{}", line)
    } else {
        format!("> {}", line)
    }
}

/// Prefixes every line of `text` for inclusion in a reply.
///
/// A trailing newline does not produce an extra quoted empty line.
pub fn cite_string(text: &str) -> String {
    let body = text.strip_suffix('\n').unwrap_or(text);
    let mut cited = body.split('\n').map(cite_line).collect::<Vec<_>>().join("\n");
    if body.len() != text.len() {
        cited.push('\n');
    }
    cited
}

fn ensure_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn push_text(out: &mut String, text: &str, in_pre: bool) {
    if in_pre {
        out.push_str(text);
        return;
    }
    let collapsed = WHITESPACE_RUN_RE.replace_all(text, " ");
    let at_line_start = out.is_empty() || out.ends_with('\n') || out.ends_with(' ');
    if at_line_start {
        out.push_str(collapsed.trim_start());
    } else {
        out.push_str(&collapsed);
    }
}

fn render_children(node: NodeRef<'_>, out: &mut String, in_pre: bool) {
    for child in node.children() {
        render_node(child, out, in_pre);
    }
}

fn render_node(node: NodeRef<'_>, out: &mut String, in_pre: bool) {
    match node.value() {
        Node::Text(text) => push_text(out, text, in_pre),
        Node::Element(el) => {
            let name = el.name().to_ascii_lowercase();
            if SKIPPED_TAGS.contains(&name.as_str()) {
                return;
            }
            match name.as_str() {
                "br" => out.push('\n'),
                "blockquote" => {
                    let inner = render_subtree(node);
                    ensure_newline(out);
                    for line in inner.lines() {
                        out.push_str(cite_line(line).trim_end());
                        out.push('\n');
                    }
                }
                tag if BLOCK_TAGS.contains(&tag) => {
                    ensure_newline(out);
                    render_children(node, out, in_pre || tag == "pre");
                    ensure_newline(out);
                }
                _ => render_children(node, out, in_pre),
            }
        }
        _ => {}
    }
}

/// Trims line ends and collapses runs of blank lines to one.
fn finish(raw: &str) -> String {
    let trimmed: String = raw
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_RUNS_RE
        .replace_all(&trimmed, "\n\n")
        .trim_matches('\n')
        .to_string()
}

/// Renders the children of `node` as plain text.
pub fn render_subtree(node: NodeRef<'_>) -> String {
    let mut out = String::new();
    render_children(node, &mut out, false);
    finish(&out)
}

/// Renders a run of sibling nodes (and their subtrees) as plain text.
pub fn render_nodes<'a>(nodes: impl IntoIterator<Item = NodeRef<'a>>) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, &mut out, false);
    }
    finish(&out)
}

/// Number of non-blank lines in rendered text.
pub fn count_lines(text: &str) -> usize {
    text.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Renders the body of a normalized document as plain text.
pub fn html_to_text(doc: &Html) -> String {
    match doc.tree.get(body_id(doc)) {
        Some(body) => render_subtree(body),
        None => String::new(),
    }
}
