//! Content Normalizer — turns the editor's letter HTML into atomic, page-placeable blocks.
//!
//! # Block rules
//! - Every top-level node becomes exactly one block, in document order. Head-only elements
//!   that carry text (a pasted `<title>`, say) are kept as text runs, never dropped.
//! - `ul` / `ol` stay a single block; their cost is counted per item.
//! - Other block elements are paragraph-like. Inline elements, bare text and anything
//!   unrecognised are text runs, wrapped in `<p>` so the renderer gets block markup.
//! - Page-break markers become zero-cost `PageBreak` blocks with no markup.
//! - Comments and whitespace-only text between tags are dropped.
//!
//! Line costs are estimates from a characters-per-line constant. True wrapping depends
//! on font metrics this layer does not have, so a long list item slightly undercounts:
//! it adds `ceil(len / C) - 1` lines, not a word-wrapped count.

use kuchiki::traits::TendrilSink;
use kuchiki::{NodeData, NodeRef};

/// Elements laid out as their own paragraph-like block.
const BLOCK_TAGS: &[&str] = &[
    "p",
    "div",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
    "table",
    "section",
    "article",
    "header",
    "footer",
    "figure",
    "hr",
];

const LIST_TAGS: &[&str] = &["ul", "ol"];

/// Inline style declarations (whitespace removed) that force a page break.
const BREAK_DECLARATIONS: &[&str] = &[
    "page-break-before:always",
    "page-break-after:always",
    "break-before:page",
    "break-after:page",
];

// ────────────────────────────────────────────────────────────────────────────
// Block type
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    List,
    /// Bare text or inline markup, wrapped in a paragraph.
    Text,
    /// Forced page break. Carries no markup and costs nothing.
    PageBreak,
}

/// An atomic unit of letter content. Never split across pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Serialized HTML placed on the page as-is.
    pub markup: String,
    /// Estimated rendered lines, including one line of block spacing.
    pub line_cost: u32,
}

impl Block {
    pub fn is_page_break(&self) -> bool {
        self.kind == BlockKind::PageBreak
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes a rich-text letter body into ordered blocks.
///
/// Blank input, or input that is nothing but one empty paragraph, yields no blocks.
/// Never fails: unclassifiable nodes degrade to text runs.
pub fn normalize(markup: &str, chars_per_line: u32) -> Vec<Block> {
    if markup.trim().is_empty() {
        return Vec::new();
    }

    let chars_per_line = chars_per_line.max(1);
    let nodes = top_level_nodes(markup);

    if nodes.len() == 1 && is_empty_paragraph(&nodes[0]) {
        return Vec::new();
    }

    nodes
        .iter()
        .map(|node| to_block(node, chars_per_line))
        .collect()
}

/// Normalizes the closing text into one combined block, or `None` if it is blank.
///
/// The closing always renders as a unit on the last page, so its parts are merged.
pub fn normalize_closing(markup: &str, chars_per_line: u32) -> Option<Block> {
    let blocks: Vec<Block> = normalize(markup, chars_per_line)
        .into_iter()
        .filter(|b| !b.is_page_break())
        .collect();
    if blocks.is_empty() {
        return None;
    }

    Some(Block {
        kind: BlockKind::Paragraph,
        markup: blocks.iter().map(|b| b.markup.as_str()).collect(),
        line_cost: blocks.iter().map(|b| b.line_cost).sum(),
    })
}

/// Estimated lines for paragraph-like text: each newline-separated fragment costs
/// `ceil(len / C)` (at least 1), plus one spacing line.
pub fn paragraph_line_cost(text: &str, chars_per_line: u32) -> u32 {
    let content: u32 = text
        .split('\n')
        .map(|fragment| wrapped_lines(fragment, chars_per_line).max(1))
        .sum();
    content + 1
}

/// Estimated lines for a list: one per item, plus one spacing line, plus
/// `ceil(len / C) - 1` for every item longer than a line.
pub fn list_line_cost<S: AsRef<str>>(items: &[S], chars_per_line: u32) -> u32 {
    let extra: u32 = items
        .iter()
        .map(|item| wrapped_lines(item.as_ref(), chars_per_line).saturating_sub(1))
        .sum();
    items.len() as u32 + 1 + extra
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn wrapped_lines(text: &str, chars_per_line: u32) -> u32 {
    let len = text.chars().count() as u32;
    len.div_ceil(chars_per_line.max(1))
}

/// Top-level nodes that carry content, in document order.
///
/// The parser moves leading metadata elements into `<head>`; those with text come first,
/// followed by the children of `<body>`.
fn top_level_nodes(markup: &str) -> Vec<NodeRef> {
    let document = kuchiki::parse_html().one(markup);

    let head_nodes: Vec<NodeRef> = match document.select_first("head") {
        Ok(head) => head
            .as_node()
            .children()
            .filter(|node| !plain_text(node).trim().is_empty())
            .collect(),
        Err(()) => Vec::new(),
    };
    let body_nodes: Vec<NodeRef> = match document.select_first("body") {
        Ok(body) => body
            .as_node()
            .children()
            .filter(|node| match node.data() {
                NodeData::Element(_) => true,
                NodeData::Text(text) => !text.borrow().trim().is_empty(),
                _ => false,
            })
            .collect(),
        Err(()) => Vec::new(),
    };

    head_nodes.into_iter().chain(body_nodes).collect()
}

fn to_block(node: &NodeRef, chars_per_line: u32) -> Block {
    let Some(element) = node.as_element() else {
        let text = plain_text(node);
        return text_run(node, text.trim(), chars_per_line);
    };

    if is_page_break_marker(node) {
        return Block {
            kind: BlockKind::PageBreak,
            markup: String::new(),
            line_cost: 0,
        };
    }

    let tag: &str = &element.name.local;

    if LIST_TAGS.contains(&tag) {
        let items: Vec<String> = node
            .children()
            .filter(|child| tag_name(child).as_deref() == Some("li"))
            .map(|item| plain_text(&item))
            .collect();
        return Block {
            kind: BlockKind::List,
            markup: node.to_string(),
            line_cost: list_line_cost(&items, chars_per_line),
        };
    }

    if BLOCK_TAGS.contains(&tag) {
        return Block {
            kind: BlockKind::Paragraph,
            markup: node.to_string(),
            line_cost: paragraph_line_cost(&plain_text(node), chars_per_line),
        };
    }

    text_run(node, &plain_text(node), chars_per_line)
}

fn text_run(node: &NodeRef, text: &str, chars_per_line: u32) -> Block {
    Block {
        kind: BlockKind::Text,
        markup: format!("<p>{node}</p>", node = node.to_string()),
        line_cost: paragraph_line_cost(text, chars_per_line),
    }
}

fn tag_name(node: &NodeRef) -> Option<String> {
    node.as_element()
        .map(|element| element.name.local.to_string().to_ascii_lowercase())
}

/// Text content with `<br>` turned into `\n`.
fn plain_text(node: &NodeRef) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &NodeRef, out: &mut String) {
    match node.data() {
        NodeData::Text(text) => out.push_str(&text.borrow()),
        NodeData::Element(element) if &*element.name.local == "br" => out.push('\n'),
        NodeData::Element(_) => {
            for child in node.children() {
                collect_text(&child, out);
            }
        }
        _ => {}
    }
}

/// `<p></p>` or `<p><br></p>`: what editors emit for an untouched document.
fn is_empty_paragraph(node: &NodeRef) -> bool {
    if tag_name(node).as_deref() != Some("p") {
        return false;
    }
    let only_breaks = node
        .descendants()
        .filter_map(|d| tag_name(&d))
        .all(|name| name == "br");
    only_breaks && plain_text(node).trim().is_empty()
}

fn is_page_break_marker(node: &NodeRef) -> bool {
    let Some(element) = node.as_element() else {
        return false;
    };
    let attrs = element.attributes.borrow();

    if attrs.get("data-page-break").is_some() {
        return true;
    }
    if attrs
        .get("class")
        .is_some_and(|class| class.split_whitespace().any(|c| c.contains("page-break")))
    {
        return true;
    }

    let style: String = attrs
        .get("style")
        .unwrap_or("")
        .to_ascii_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    BREAK_DECLARATIONS.iter().any(|decl| style.contains(decl))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const C: u32 = 90;

    // ── empty input ─────────────────────────────────────────────────────────

    #[test]
    fn test_blank_input_yields_no_blocks() {
        assert!(normalize("", C).is_empty());
        assert!(normalize("   \n\t", C).is_empty());
    }

    #[test]
    fn test_single_empty_paragraph_yields_no_blocks() {
        assert!(normalize("<p></p>", C).is_empty());
        assert!(normalize("<p><br></p>", C).is_empty());
        assert!(normalize("<p>   </p>", C).is_empty());
    }

    #[test]
    fn test_empty_paragraph_between_content_is_kept() {
        let blocks = normalize("<p>Dear all</p><p></p><p>Regards</p>", C);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].line_cost, 2);
    }

    // ── paragraph costs ─────────────────────────────────────────────────────

    #[test]
    fn test_short_paragraph_costs_two_lines() {
        let blocks = normalize("<p>Thank you for your order.</p>", C);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(blocks[0].line_cost, 2);
        assert_eq!(blocks[0].markup, "<p>Thank you for your order.</p>");
    }

    #[test]
    fn test_long_paragraph_wraps_by_chars_per_line() {
        let text = "a".repeat(181);
        let blocks = normalize(&format!("<p>{text}</p>"), C);
        // ceil(181 / 90) = 3 content lines + 1 spacing
        assert_eq!(blocks[0].line_cost, 4);
    }

    #[test]
    fn test_br_splits_fragments() {
        let blocks = normalize("<p>Line one<br>Line two<br><br>Line four</p>", C);
        // four fragments (one empty), each at least one line, plus spacing
        assert_eq!(blocks[0].line_cost, 5);
    }

    #[test]
    fn test_inline_styling_does_not_split_block() {
        let blocks = normalize("<p>Total <strong>due</strong> in <em>30</em> days</p>", C);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].line_cost, 2);
        assert!(blocks[0].markup.contains("<strong>due</strong>"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let text = "é".repeat(90);
        assert_eq!(paragraph_line_cost(&text, C), 2);
    }

    // ── list costs ──────────────────────────────────────────────────────────

    #[test]
    fn test_list_is_one_block_costing_items_plus_one() {
        let html = "<ul><li>a</li><li>b</li><li>c</li><li>d</li><li>e</li></ul>";
        let blocks = normalize(html, C);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::List);
        assert_eq!(blocks[0].line_cost, 6);
    }

    #[test]
    fn test_list_items_found_regardless_of_source_case() {
        let blocks = normalize("<OL><LI>first</LI><Li>second</Li></OL>", C);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::List);
        assert_eq!(blocks[0].line_cost, 3);
    }

    #[test]
    fn test_long_list_item_adds_extra_lines() {
        let long = "x".repeat(200);
        let html = format!("<ol><li>{long}</li><li>short</li></ol>");
        let blocks = normalize(&html, C);
        // 2 items + 1 spacing + (ceil(200/90) - 1) = 3 + 2
        assert_eq!(blocks[0].line_cost, 5);
    }

    #[test]
    fn test_empty_list_costs_spacing_only() {
        assert_eq!(list_line_cost::<&str>(&[], C), 1);
    }

    // ── text runs and unusual input ─────────────────────────────────────────

    #[test]
    fn test_bare_text_is_wrapped_as_paragraph() {
        let blocks = normalize("Just a plain note", C);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Text);
        assert_eq!(blocks[0].markup, "<p>Just a plain note</p>");
        assert_eq!(blocks[0].line_cost, 2);
    }

    #[test]
    fn test_bare_text_markup_is_escaped() {
        let blocks = normalize("<p>a</p>5 &lt; 6", C);
        assert_eq!(blocks[1].markup, "<p>5 &lt; 6</p>");
    }

    #[test]
    fn test_unknown_elements_degrade_to_text_runs() {
        let blocks = normalize("<custom-widget>hello</custom-widget><span>x</span>", C);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.kind == BlockKind::Text));
        assert_eq!(blocks[0].markup, "<p><custom-widget>hello</custom-widget></p>");
    }

    #[test]
    fn test_head_only_elements_with_text_are_kept() {
        let blocks = normalize("<title>Quotation 118</title><p>Body</p>", C);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Text);
        assert!(blocks[0].markup.contains("Quotation 118"));
        assert_eq!(blocks[0].line_cost, 2);
        assert_eq!(blocks[1].markup, "<p>Body</p>");
    }

    #[test]
    fn test_textless_metadata_elements_add_no_blocks() {
        let blocks = normalize("<meta charset=\"utf-8\"><p>Body</p>", C);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].markup, "<p>Body</p>");
        assert!(normalize("<meta charset=\"utf-8\"><p></p>", C).is_empty());
    }

    #[test]
    fn test_comments_and_formatting_whitespace_dropped() {
        let blocks = normalize("<p>one</p>\n  <!-- note -->\n<p>two</p>", C);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].markup, "<p>one</p>");
        assert_eq!(blocks[1].markup, "<p>two</p>");
    }

    #[test]
    fn test_unclosed_tags_do_not_fail() {
        let blocks = normalize("<p>open paragraph<ul><li>item", C);
        assert!(!blocks.is_empty());
    }

    #[test]
    fn test_document_order_preserved() {
        let blocks = normalize("<h2>Re</h2><p>body</p><ul><li>x</li></ul>tail", C);
        let kinds: Vec<BlockKind> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Paragraph,
                BlockKind::Paragraph,
                BlockKind::List,
                BlockKind::Text
            ]
        );
    }

    // ── page-break markers ──────────────────────────────────────────────────

    #[test]
    fn test_page_break_markers_recognised() {
        let html = concat!(
            "<p>a</p>",
            "<div class=\"page-break\"></div>",
            "<hr data-page-break>",
            "<div style=\"page-break-before: always\"></div>",
            "<div style=\"break-after: page\"></div>",
        );
        let blocks = normalize(html, C);
        assert_eq!(blocks.len(), 5);
        assert!(blocks[1..].iter().all(|b| b.is_page_break()));
        assert!(blocks[1..]
            .iter()
            .all(|b| b.line_cost == 0 && b.markup.is_empty()));
    }

    // ── closing ─────────────────────────────────────────────────────────────

    #[test]
    fn test_closing_blank_is_none() {
        assert!(normalize_closing("", C).is_none());
        assert!(normalize_closing("<p><br></p>", C).is_none());
    }

    #[test]
    fn test_closing_parts_merged() {
        let closing = normalize_closing("<p>Yours faithfully,</p><p>Operations Team</p>", C)
            .expect("closing block");
        assert_eq!(closing.line_cost, 4);
        assert_eq!(
            closing.markup,
            "<p>Yours faithfully,</p><p>Operations Team</p>"
        );
    }
}
