//! Markdown → HTML body via `comrak`.
//!
//! Extensions enabled: GFM tables, strikethrough, autolinks and task lists;
//! fenced code is CommonMark. Lists follow CommonMark rules, so ordered and
//! unordered lists never merge and an ordered list keeps its start number.
//!
//! Table of contents: every heading gets an anchor id, and a paragraph
//! holding only `[TOC]` is replaced by a nested list linking to all headings.
//!
//! Raw HTML in the source is passed through, as the Markdown is the author's
//! own document.

use super::document::escape_html;
use crate::error::Md2PdfError;
use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use comrak::{format_html, parse_document, Anchorizer, Arena, Options};
use tracing::debug;

/// Paragraph text replaced by the generated table of contents.
pub const TOC_MARKER: &str = "[TOC]";

/// Convert Markdown to body-level HTML (no `<html>`, `<head>` or `<body>`).
pub fn markdown_to_html(markdown: &str) -> Result<String, Md2PdfError> {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());
    options.render.unsafe_ = true;

    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &options);

    insert_table_of_contents(root);

    let mut html = Vec::with_capacity(markdown.len() * 2);
    format_html(root, &options, &mut html)
        .map_err(|e| Md2PdfError::Internal(format!("HTML formatting failed: {e}")))?;
    let html = String::from_utf8(html)
        .map_err(|e| Md2PdfError::Internal(format!("HTML output is not UTF-8: {e}")))?;

    debug!("Markdown {} bytes → HTML {} bytes", markdown.len(), html.len());
    Ok(html)
}

/// A heading as it appears in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TocEntry {
    level: u8,
    id: String,
    text: String,
}

fn insert_table_of_contents<'a>(root: &'a AstNode<'a>) {
    let markers: Vec<&'a AstNode<'a>> = root
        .descendants()
        .filter(|node| is_toc_marker(node))
        .collect();
    if markers.is_empty() {
        return;
    }

    let toc = render_toc(&collect_headings(root));
    for marker in markers {
        let children: Vec<_> = marker.children().collect();
        for child in children {
            child.detach();
        }
        marker.data.borrow_mut().value = NodeValue::HtmlBlock(NodeHtmlBlock {
            block_type: 6,
            literal: toc.clone(),
        });
    }
}

fn is_toc_marker<'a>(node: &'a AstNode<'a>) -> bool {
    if !matches!(node.data.borrow().value, NodeValue::Paragraph) {
        return false;
    }
    let all_text = node
        .children()
        .all(|child| matches!(child.data.borrow().value, NodeValue::Text(_)));
    all_text && collect_text(node).trim() == TOC_MARKER
}

/// Headings in document order, with the same anchor ids comrak renders.
fn collect_headings<'a>(root: &'a AstNode<'a>) -> Vec<TocEntry> {
    let mut anchorizer = Anchorizer::new();
    root.descendants()
        .filter_map(|node| {
            let level = match node.data.borrow().value {
                NodeValue::Heading(ref heading) => heading.level,
                _ => return None,
            };
            let text = collect_text(node);
            let id = anchorizer.anchorize(text.clone());
            Some(TocEntry { level, id, text })
        })
        .collect()
}

fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    push_text(node, &mut out);
    out
}

fn push_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match node.data.borrow().value {
        NodeValue::Text(ref text) => out.push_str(text),
        NodeValue::Code(ref code) => out.push_str(&code.literal),
        NodeValue::LineBreak | NodeValue::SoftBreak => out.push(' '),
        _ => {
            for child in node.children() {
                push_text(child, out);
            }
        }
    }
}

fn render_toc(entries: &[TocEntry]) -> String {
    let mut out = String::from("<div class=\"toc\">\n");
    let mut open_levels: Vec<u8> = Vec::new();

    for entry in entries {
        match open_levels.last().copied() {
            None => {
                out.push_str("<ul>\n");
                open_levels.push(entry.level);
            }
            Some(top) if entry.level > top => {
                out.push_str("\n<ul>\n");
                open_levels.push(entry.level);
            }
            Some(_) => {
                out.push_str("</li>\n");
                while open_levels.len() > 1
                    && open_levels.last().is_some_and(|&top| entry.level < top)
                {
                    open_levels.pop();
                    out.push_str("</ul>\n</li>\n");
                }
            }
        }
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            escape_html(&entry.id),
            escape_html(&entry.text)
        ));
    }

    if !open_levels.is_empty() {
        out.push_str("</li>\n");
        while open_levels.pop().is_some() {
            out.push_str("</ul>\n");
            if !open_levels.is_empty() {
                out.push_str("</li>\n");
            }
        }
    }

    out.push_str("</div>\n");
    out
}
