//! HTML extraction into the renderer node sequence.
//!
//! Renderers never look at raw HTML. A chapter body is sanitized, parsed,
//! and flattened into an ordered [`Node`] sequence; the PDF, DOCX, and
//! shared-view paths all consume the same sequence so the three artifacts
//! agree on what the content is.
//!
//! The walk covers all elements in document order (editors love to nest
//! real content inside wrapper `<div>`s), dedupes images by `src` within a
//! chapter, and normalizes heading-numbering artifacts the generation
//! service leaves behind (`"2.2 Something"` inside chapter 2 becomes
//! `"2 Something"`).

pub mod sanitize;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use crate::model::quiz;

pub use sanitize::sanitize;

/// An intermediate, typed piece of chapter content. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
        bold: bool,
        italic: bool,
    },
    ListBlock {
        ordered: bool,
        items: Vec<String>,
    },
    Image {
        src: String,
    },
}

static HEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\s+(.*)$").expect("valid regex"));

/// Extract the node sequence for one chapter.
///
/// `chapter_ordinal` is the chapter's 1-based position among content
/// chapters; it parameterizes the heading renumbering.
pub fn extract_nodes(body: &str, chapter_ordinal: usize) -> Vec<Node> {
    // Interactive quiz markup is share-page-only; the editor-facing
    // exercises block stays and renders as ordinary content.
    let body = quiz::strip_shared_block(body);
    let clean = sanitize(&body);
    let fragment = Html::parse_fragment(&clean);

    let mut ctx = ExtractContext {
        nodes: Vec::new(),
        seen_images: HashSet::new(),
        chapter_ordinal,
    };

    for child in fragment.root_element().child_elements() {
        walk(child, &mut ctx);
    }

    ctx.nodes
}

struct ExtractContext {
    nodes: Vec<Node>,
    seen_images: HashSet<String>,
    chapter_ordinal: usize,
}

fn walk(el: ElementRef, ctx: &mut ExtractContext) {
    match el.value().name() {
        "script" | "style" | "head" => {}
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = el.value().name().as_bytes()[1] - b'0';
            let text = normalize_heading(&collect_text(el), ctx.chapter_ordinal);
            if !text.is_empty() {
                ctx.nodes.push(Node::Heading { level, text });
            }
            push_images(el, ctx);
        }
        "p" | "blockquote" | "pre" => {
            let text = collect_text(el);
            if !text.is_empty() {
                ctx.nodes.push(Node::Paragraph {
                    bold: fully_wrapped(el, &["b", "strong"]),
                    italic: fully_wrapped(el, &["i", "em"]),
                    text,
                });
            }
            push_images(el, ctx);
        }
        "ul" | "ol" => {
            let ordered = el.value().name() == "ol";
            let items: Vec<String> = el
                .child_elements()
                .filter(|c| c.value().name() == "li")
                .map(collect_text)
                .filter(|t| !t.is_empty())
                .collect();
            if !items.is_empty() {
                ctx.nodes.push(Node::ListBlock { ordered, items });
            }
            push_images(el, ctx);
        }
        "img" => push_image(el, ctx),
        _ => {
            for child in el.child_elements() {
                walk(child, ctx);
            }
        }
    }
}

fn push_images(el: ElementRef, ctx: &mut ExtractContext) {
    for desc in el.descendants().filter_map(ElementRef::wrap) {
        if desc.value().name() == "img" {
            push_image(desc, ctx);
        }
    }
}

fn push_image(el: ElementRef, ctx: &mut ExtractContext) {
    let Some(src) = el.value().attr("src") else {
        return;
    };
    let src = src.trim();
    if src.is_empty() || src.to_ascii_lowercase().starts_with("javascript:") {
        return;
    }
    // One fetch/embed per distinct src per chapter.
    if ctx.seen_images.insert(src.to_string()) {
        ctx.nodes.push(Node::Image {
            src: src.to_string(),
        });
    }
}

/// Collapse whitespace runs and trim, matching how browsers display the text.
fn collect_text(el: ElementRef) -> String {
    let raw: String = el.text().collect();
    let mut out = String::with_capacity(raw.len());
    let mut last_was_space = true;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Whole-paragraph emphasis: true when a single direct child with one of
/// the given names wraps the paragraph's entire text.
fn fully_wrapped(el: ElementRef, names: &[&str]) -> bool {
    let text = collect_text(el);
    if text.is_empty() {
        return false;
    }
    el.child_elements()
        .filter(|c| names.contains(&c.value().name()))
        .any(|c| collect_text(c) == text)
}

/// Drop a duplicated leading chapter number: `"2.2 Something"` in chapter 2
/// becomes `"2 Something"`. Headings in other chapters are untouched.
fn normalize_heading(text: &str, chapter_ordinal: usize) -> String {
    if let Some(caps) = HEADING_NUMBER_RE.captures(text) {
        if caps[1].parse::<usize>().ok() == Some(chapter_ordinal) {
            return format!("{} {}", &caps[2], &caps[3]);
        }
    }
    text.to_string()
}
