//! PDF exporter.
//!
//! Paginates the node sequence onto fixed A4 pages with manual word
//! wrapping. The page is a top-down cursor over a fixed content box; a node
//! that does not fit allocates a new page, and a paragraph whose line flush
//! lands on the bottom margin continues on the next page with its wrap
//! accumulator intact.
//!
//! Front matter is a title page and, when the document has a usable cover
//! image, a dedicated cover page. Visible page numbers are stamped in a
//! final pass over the generated pages, skipping front matter and
//! restarting at 1.

use std::io::{Seek, Write};

use chrono::Local;
use printpdf::image::RawImage;
use printpdf::xobject::{XObject, XObjectTransform};
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Pt, TextItem, TextMatrix, XObjectId,
};

use super::{Exporter, IMAGE_PLACEHOLDER, prepare};
use crate::error::{Error, Result};
use crate::extract::Node;
use crate::fetch::ImageFetcher;
use crate::model::ContentDocument;

// A4 geometry in points.
const PAGE_W: f32 = 595.28;
const PAGE_H: f32 = 841.89;
const PAGE_W_MM: f32 = 210.0;
const PAGE_H_MM: f32 = 297.0;
const MARGIN: f32 = 50.0;
const CONTENT_W: f32 = PAGE_W - 2.0 * MARGIN;

const BODY_SIZE: f32 = 12.0;
const BODY_LINE_H: f32 = 18.0;
const PARAGRAPH_GAP: f32 = 6.0;
const FOOTER_SIZE: f32 = 10.0;

/// Configuration for PDF export.
#[derive(Debug, Clone)]
pub struct PdfConfig {
    /// Document title, drawn on the title page and the cover page.
    pub title: String,
    /// Product name drawn at the top of the title page.
    pub product_name: String,
}

impl PdfConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            product_name: "Folio".to_string(),
        }
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// PDF format exporter.
pub struct PdfExporter {
    config: PdfConfig,
}

impl PdfExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self {
            config: PdfConfig::default(),
        }
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: PdfConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for PdfExporter {
    fn export<W: Write + Seek>(&self, doc: &ContentDocument, writer: &mut W) -> Result<()> {
        let (cover_src, chapters) = prepare(doc);
        let mut fetcher = ImageFetcher::new();

        let mut pdf = PdfDocument::new(&self.config.title);
        let mut renderer = PageRenderer::new(&mut pdf, &mut fetcher);

        renderer.push_front_page(title_page_ops(&self.config));
        if let Some(src) = cover_src {
            match renderer.cover_page_ops(&src, &self.config.title) {
                Ok(ops) => renderer.push_front_page(ops),
                // No usable cover image: the page is discarded, not left blank.
                Err(e) => log::warn!("skipping cover page: {e}"),
            }
        }

        for chapter in &chapters {
            renderer.render_chapter_title(&chapter.title);
            for node in &chapter.nodes {
                renderer.render_node(node);
            }
        }
        renderer.finish_current_page();

        let front_matter = renderer.front_matter_pages;
        let mut pages = renderer.pages;
        stamp_page_numbers(&mut pages, front_matter);

        pdf.pages = pages
            .into_iter()
            .map(|ops| PdfPage::new(Mm(PAGE_W_MM), Mm(PAGE_H_MM), ops))
            .collect();

        let mut warnings = Vec::new();
        pdf.save_writer(writer, &PdfSaveOptions::default(), &mut warnings);
        Ok(())
    }
}

/// Approximate Helvetica line width.
fn measure(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.6
}

/// Ops for one line of text, `y_top` being the baseline from the page top.
fn line_ops(ops: &mut Vec<Op>, text: &str, font: BuiltinFont, size: f32, x: f32, y_top: f32) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size),
        font,
    });
    ops.push(Op::SetTextMatrix {
        matrix: TextMatrix::Translate(Pt(x), Pt(PAGE_H - y_top)),
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_string())],
        font,
    });
    ops.push(Op::EndTextSection);
}

fn centered_line_ops(ops: &mut Vec<Op>, text: &str, font: BuiltinFont, size: f32, y_top: f32) {
    let x = MARGIN + (CONTENT_W - measure(text, size)).max(0.0) / 2.0;
    line_ops(ops, text, font, size, x, y_top);
}

/// The always-first title page: product name, document title, date.
fn title_page_ops(config: &PdfConfig) -> Vec<Op> {
    let mut ops = Vec::new();
    centered_line_ops(&mut ops, &config.product_name, BuiltinFont::Helvetica, 14.0, 180.0);
    for (i, line) in wrap_lines(&config.title, 28.0, CONTENT_W).iter().enumerate() {
        centered_line_ops(&mut ops, line, BuiltinFont::HelveticaBold, 28.0, 320.0 + i as f32 * 40.0);
    }
    let date = Local::now().format("%B %e, %Y").to_string();
    centered_line_ops(&mut ops, &date, BuiltinFont::Helvetica, 12.0, PAGE_H - 100.0);
    ops
}

/// Break a text into lines no wider than `max_width`, accumulating words and
/// flushing when the next word would overflow. A single word wider than the
/// line is hard-broken by characters so it can never wedge the wrapper.
fn wrap_lines(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        for piece in break_long_word(word, size, max_width) {
            let needed = if line.is_empty() {
                measure(&piece, size)
            } else {
                measure(&line, size) + measure(" ", size) + measure(&piece, size)
            };
            if !line.is_empty() && needed > max_width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&piece);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn break_long_word(word: &str, size: f32, max_width: f32) -> Vec<String> {
    if measure(word, size) <= max_width {
        return vec![word.to_string()];
    }
    let max_chars = ((max_width / (size * 0.6)) as usize).max(1);
    word.chars()
        .collect::<Vec<_>>()
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Stamp visible page numbers, bottom-centered, skipping front matter and
/// restarting the count at 1.
fn stamp_page_numbers(pages: &mut [Vec<Op>], front_matter: usize) {
    for (i, ops) in pages.iter_mut().enumerate().skip(front_matter) {
        let visible = i - front_matter + 1;
        centered_line_ops(ops, &visible.to_string(), BuiltinFont::Helvetica, FOOTER_SIZE, PAGE_H - 30.0);
    }
}

/// Mutable rendering state: finished pages, the op buffer for the current
/// page, and the top-down cursor.
struct PageRenderer<'a> {
    pdf: &'a mut PdfDocument,
    fetcher: &'a mut ImageFetcher,
    pages: Vec<Vec<Op>>,
    front_matter_pages: usize,
    cur: Vec<Op>,
    y: f32,
}

impl<'a> PageRenderer<'a> {
    fn new(pdf: &'a mut PdfDocument, fetcher: &'a mut ImageFetcher) -> Self {
        Self {
            pdf,
            fetcher,
            pages: Vec::new(),
            front_matter_pages: 0,
            cur: Vec::new(),
            y: MARGIN,
        }
    }

    /// Append a finished front-matter page (title or cover). Must be called
    /// before any content rendering starts.
    fn push_front_page(&mut self, ops: Vec<Op>) {
        debug_assert!(self.cur.is_empty());
        self.pages.push(ops);
        self.front_matter_pages += 1;
    }

    fn new_page(&mut self) {
        let ops = std::mem::take(&mut self.cur);
        self.pages.push(ops);
        self.y = MARGIN;
        log::debug!("pdf: allocated page {}", self.pages.len() + 1);
    }

    fn finish_current_page(&mut self) {
        if !self.cur.is_empty() {
            let ops = std::mem::take(&mut self.cur);
            self.pages.push(ops);
        }
    }

    fn bottom(&self) -> f32 {
        PAGE_H - MARGIN
    }

    /// Allocate a new page unless `estimate` points of vertical space remain.
    fn ensure_space(&mut self, estimate: f32) {
        if self.y + estimate > self.bottom() && !self.cur.is_empty() {
            self.new_page();
        }
    }

    fn render_chapter_title(&mut self, title: &str) {
        if !title.is_empty() {
            self.render_node(&Node::Heading {
                level: 1,
                text: title.to_string(),
            });
        }
    }

    fn render_node(&mut self, node: &Node) {
        match node {
            Node::Heading { level, text } => self.render_heading(*level, text),
            Node::Paragraph { text, bold, italic } => {
                let font = match (bold, italic) {
                    (true, _) => BuiltinFont::HelveticaBold,
                    (false, true) => BuiltinFont::HelveticaOblique,
                    (false, false) => BuiltinFont::Helvetica,
                };
                self.write_wrapped(text, font, BODY_SIZE, BODY_LINE_H, MARGIN);
                self.y += PARAGRAPH_GAP;
            }
            Node::ListBlock { ordered, items } => {
                for (i, item) in items.iter().enumerate() {
                    let marker = if *ordered {
                        format!("{}. {item}", i + 1)
                    } else {
                        format!("\u{2022} {item}")
                    };
                    self.write_wrapped(&marker, BuiltinFont::Helvetica, BODY_SIZE, BODY_LINE_H, MARGIN + 14.0);
                }
                self.y += PARAGRAPH_GAP;
            }
            Node::Image { src } => self.render_image(src),
        }
    }

    fn render_heading(&mut self, level: u8, text: &str) {
        let size = match level {
            1 => 22.0,
            2 => 18.0,
            _ => 15.0,
        };
        let line_h = size * 1.5;
        // Keep the heading attached to at least one body line.
        self.ensure_space(line_h + BODY_LINE_H);
        self.y += line_h * 0.4;
        self.write_wrapped(text, BuiltinFont::HelveticaBold, size, line_h, MARGIN);
        self.y += 4.0;
    }

    /// Word-wrap and emit text. A flush that lands past the bottom margin
    /// allocates a new page; the remaining lines of the same paragraph
    /// continue from the new top margin.
    fn write_wrapped(&mut self, text: &str, font: BuiltinFont, size: f32, line_h: f32, x: f32) {
        let max_width = CONTENT_W - (x - MARGIN);
        for line in wrap_lines(text, size, max_width) {
            if self.y + line_h > self.bottom() {
                self.new_page();
            }
            self.y += line_h;
            line_ops(&mut self.cur, &line, font, size, x, self.y);
        }
    }

    fn render_image(&mut self, src: &str) {
        match self.embed_image(src) {
            Ok(()) => {}
            Err(e) => {
                log::warn!("pdf: {e}");
                self.write_wrapped(
                    IMAGE_PLACEHOLDER,
                    BuiltinFont::HelveticaOblique,
                    BODY_SIZE,
                    BODY_LINE_H,
                    MARGIN,
                );
                self.y += PARAGRAPH_GAP;
            }
        }
    }

    fn embed_image(&mut self, src: &str) -> Result<()> {
        let image = self.fetcher.fetch(src)?;
        let (id, px_w, px_h) = self.register_image(src, &image.bytes)?;

        // 96dpi CSS pixels to points, capped at 80% of the content width.
        let natural_w = px_w as f32 * 0.75;
        let natural_h = px_h as f32 * 0.75;
        let target_w = natural_w.min(CONTENT_W * 0.8);
        let target_h = natural_h * (target_w / natural_w);

        self.ensure_space(target_h + PARAGRAPH_GAP);
        if target_h > self.bottom() - MARGIN {
            // Taller than a full page: scale down to fit rather than clip.
            let fit = (self.bottom() - self.y) / target_h;
            return self.place_image(id, px_w, target_w * fit, target_h * fit);
        }
        self.place_image(id, px_w, target_w, target_h)
    }

    fn place_image(&mut self, id: XObjectId, px_w: usize, w: f32, h: f32) -> Result<()> {
        let x = MARGIN + (CONTENT_W - w) / 2.0;
        let y_bottom = PAGE_H - (self.y + h);
        let scale = w / px_w as f32;
        self.cur.push(Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x)),
                translate_y: Some(Pt(y_bottom)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                rotate: None,
                dpi: Some(72.0),
            },
        });
        self.y += h + PARAGRAPH_GAP;
        Ok(())
    }

    fn register_image(&mut self, src: &str, bytes: &[u8]) -> Result<(XObjectId, usize, usize)> {
        let mut warnings = Vec::new();
        let raw = RawImage::decode_from_bytes(bytes, &mut warnings)
            .map_err(|e| Error::UnsupportedImageFormat(format!("{src}: {e}")))?;
        let (w, h) = (raw.width, raw.height);
        let id = XObjectId::new();
        self.pdf
            .resources
            .xobjects
            .map
            .insert(id.clone(), XObject::Image(raw));
        Ok((id, w, h))
    }

    /// Build the dedicated cover page: image at ~40% page width in the upper
    /// third, title at a fixed position below it, date near the bottom.
    ///
    /// Errors (fetch, decode) propagate so the caller can discard the page.
    fn cover_page_ops(&mut self, src: &str, title: &str) -> Result<Vec<Op>> {
        let image = self.fetcher.fetch(src)?;
        let (id, px_w, px_h) = self.register_image(src, &image.bytes)?;

        let w = PAGE_W * 0.4;
        let h = px_h as f32 * (w / px_w as f32);
        let x = (PAGE_W - w) / 2.0;
        let y_top = PAGE_H / 6.0;
        let scale = w / px_w as f32;

        let mut ops = Vec::new();
        ops.push(Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x)),
                translate_y: Some(Pt(PAGE_H - (y_top + h))),
                scale_x: Some(scale),
                scale_y: Some(scale),
                rotate: None,
                dpi: Some(72.0),
            },
        });

        for (i, line) in wrap_lines(title, 24.0, CONTENT_W).iter().enumerate() {
            centered_line_ops(&mut ops, line, BuiltinFont::HelveticaBold, 24.0, 560.0 + i as f32 * 34.0);
        }
        let date = Local::now().format("%B %e, %Y").to_string();
        centered_line_ops(&mut ops, &date, BuiltinFont::Helvetica, 12.0, PAGE_H - 80.0);
        Ok(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_lines_never_exceed_max_width() {
        let text = "The quick brown fox jumps over the lazy dog again and again and again";
        for line in wrap_lines(text, BODY_SIZE, 200.0) {
            assert!(measure(&line, BODY_SIZE) <= 200.0, "line too wide: {line}");
        }
    }

    #[test]
    fn oversized_word_is_hard_broken() {
        let word = "a".repeat(500);
        let lines = wrap_lines(&word, BODY_SIZE, 100.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(measure(line, BODY_SIZE) <= 100.0);
        }
        // And nothing is lost.
        assert_eq!(lines.concat().len(), 500);
    }

    #[test]
    fn wrap_preserves_word_order() {
        let lines = wrap_lines("one two three four five six seven", BODY_SIZE, 120.0);
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, "one two three four five six seven");
    }

    #[test]
    fn empty_text_produces_no_lines() {
        assert!(wrap_lines("", BODY_SIZE, 200.0).is_empty());
        assert!(wrap_lines("   ", BODY_SIZE, 200.0).is_empty());
    }

    #[test]
    fn paragraph_wrap_survives_page_break() {
        // Long enough that the wrapped lines cannot fit on one page.
        let text = "lorem ipsum dolor sit amet consectetur ".repeat(120);
        let expected_lines = wrap_lines(&text, BODY_SIZE, CONTENT_W).len();
        assert!(expected_lines as f32 * BODY_LINE_H > PAGE_H - 2.0 * MARGIN);

        let mut pdf = PdfDocument::new("test");
        let mut fetcher = ImageFetcher::new();
        let mut renderer = PageRenderer::new(&mut pdf, &mut fetcher);
        renderer.write_wrapped(&text, BuiltinFont::Helvetica, BODY_SIZE, BODY_LINE_H, MARGIN);
        renderer.finish_current_page();

        assert!(renderer.pages.len() >= 2, "paragraph should span pages");
        // Every wrapped line is written exactly once across the pages.
        let written = renderer
            .pages
            .iter()
            .flatten()
            .filter(|op| matches!(op, Op::WriteTextBuiltinFont { .. }))
            .count();
        assert_eq!(written, expected_lines);
        // The continuation restarts at the top margin of the new page.
        assert!(renderer.pages[1].iter().any(|op| matches!(
            op,
            Op::SetTextMatrix { matrix: TextMatrix::Translate(_, y) }
                if (y.0 - (PAGE_H - MARGIN - BODY_LINE_H)).abs() < 0.01
        )));
    }

    #[test]
    fn page_numbers_skip_front_matter_and_restart_at_one() {
        let mut pages: Vec<Vec<Op>> = vec![Vec::new(), Vec::new(), Vec::new(), Vec::new()];
        stamp_page_numbers(&mut pages, 2);
        assert!(pages[0].is_empty());
        assert!(pages[1].is_empty());
        let first_stamped = &pages[2];
        assert!(first_stamped.iter().any(|op| matches!(
            op,
            Op::WriteTextBuiltinFont { items, .. }
                if matches!(items.first(), Some(TextItem::Text(t)) if t == "1")
        )));
        let second_stamped = &pages[3];
        assert!(second_stamped.iter().any(|op| matches!(
            op,
            Op::WriteTextBuiltinFont { items, .. }
                if matches!(items.first(), Some(TextItem::Text(t)) if t == "2")
        )));
    }
}
