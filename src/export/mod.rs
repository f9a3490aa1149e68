//! Export module for rendering content documents to output artifacts.
//!
//! Provides the [`Exporter`] trait and format-specific implementations.
//!
//! # Architecture
//!
//! Exporters use a builder pattern:
//! - `new()` creates an exporter with default configuration
//! - `with_config()` allows customization
//! - `export()` renders to any `Write + Seek` destination
//!
//! Every exporter works from a private snapshot of the document, split by
//! [`prepare`] into an optional cover image plus the ordered content
//! chapters. The split goes through the same cover/quiz logic as the model,
//! so all three output formats agree on what is a cover and what is quiz
//! content.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use folio::ContentDocument;
//! use folio::export::{Exporter, PdfConfig, PdfExporter};
//!
//! let doc = ContentDocument::from_json("[]");
//! let mut file = File::create("out.pdf")?;
//! PdfExporter::new()
//!     .with_config(PdfConfig::new("My Course"))
//!     .export(&doc, &mut file)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{Seek, Write};

use crate::error::Result;
use crate::extract::{self, Node};
use crate::model::{ChapterKind, ContentDocument, cover};

mod docx;
mod pdf;
mod shared;

pub use docx::{DocxConfig, DocxExporter};
pub use pdf::{PdfConfig, PdfExporter};
pub use shared::{SharedViewConfig, SharedViewExporter};

/// Trait for exporting a content document to a specific format.
pub trait Exporter {
    /// Render the document to the provided writer.
    ///
    /// The document is never mutated; the caller is responsible for saving
    /// or serving the produced bytes.
    fn export<W: Write + Seek>(&self, doc: &ContentDocument, writer: &mut W) -> Result<()>;
}

/// A content chapter as the renderers see it.
pub(crate) struct RenderChapter {
    pub title: String,
    /// 1-based position among content chapters (cover excluded).
    pub ordinal: usize,
    pub nodes: Vec<Node>,
    /// Sanitized body with the shared quiz block stripped; the shared-view
    /// composer emits this directly instead of re-synthesizing HTML.
    pub body_html: String,
    /// Extracted via the model's quiz protocol so every format agrees on
    /// what is quiz content.
    pub quiz: Option<crate::model::quiz::QuizContent>,
}

/// Split a document into its cover image (if any) and content chapters.
pub(crate) fn prepare(doc: &ContentDocument) -> (Option<String>, Vec<RenderChapter>) {
    let mut cover_src = None;
    let mut chapters = Vec::new();

    for (i, chapter) in doc.chapters().iter().enumerate() {
        // The cover invariant puts the cover at position 0; chapters further
        // in are content even if they would match the structural heuristic.
        if i == 0 && chapter.kind() == ChapterKind::Cover {
            cover_src = cover::cover_image_src(&chapter.body);
            continue;
        }
        let ordinal = chapters.len() + 1;
        chapters.push(RenderChapter {
            title: chapter.title.clone(),
            ordinal,
            nodes: extract::extract_nodes(&chapter.body, ordinal),
            body_html: extract::sanitize(&crate::model::quiz::strip_shared_block(&chapter.body)),
            quiz: chapter.quiz(),
        });
    }

    (cover_src, chapters)
}

/// Placeholder line rendered where an image failed to fetch or decode.
pub(crate) const IMAGE_PLACEHOLDER: &str = "image could not be loaded";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chapter, ContentDocument};

    #[test]
    fn prepare_splits_cover_from_content() {
        let mut doc = ContentDocument::new();
        doc.push_chapter(Chapter::new("One", "<h1>One</h1>"));
        doc.push_chapter(Chapter::new("Two", "<h1>Two</h1>"));
        let doc = doc.insert_cover("http://img/c.png");

        let (cover, chapters) = prepare(&doc);
        assert_eq!(cover.as_deref(), Some("http://img/c.png"));
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].ordinal, 1);
        assert_eq!(chapters[1].title, "Two");
    }

    #[test]
    fn prepare_without_cover_keeps_all_chapters() {
        let mut doc = ContentDocument::new();
        doc.push_chapter(Chapter::new("Only", "<p>text</p>"));
        let (cover, chapters) = prepare(&doc);
        assert!(cover.is_none());
        assert_eq!(chapters.len(), 1);
    }
}
