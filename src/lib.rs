//! # folio
//!
//! Content document model and multi-format export pipeline for AI-assisted
//! course books.
//!
//! A [`ContentDocument`] is an ordered sequence of chapters: HTML bodies with
//! an optional always-first cover chapter and optional embedded quizzes. The
//! same document renders to three structurally different artifacts:
//!
//! - PDF via [`export::PdfExporter`] (fixed pages, manual word wrapping)
//! - DOCX via [`export::DocxExporter`] (semantic sections, format-owned reflow)
//! - a standalone shareable HTML page via [`export::SharedViewExporter`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::fs::File;
//! use folio::{ContentDocument, export::{Exporter, PdfExporter, PdfConfig}};
//!
//! let json = std::fs::read_to_string("course.json")?;
//! let doc = ContentDocument::from_json(&json);
//!
//! let mut file = File::create("course.pdf")?;
//! PdfExporter::new()
//!     .with_config(PdfConfig::new("My Course"))
//!     .export(&doc, &mut file)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Editing Operations
//!
//! Cover insertion/removal and quiz embedding/extraction/regeneration live on
//! the model types and obey two contracts: the cover chapter, when present,
//! is always at position 0, and no multi-step mutation leaves the document
//! partially updated (see [`ContentDocument::commit`]).

pub mod error;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod model;

pub use error::{Error, Result};
pub use extract::Node;
pub use fetch::{FetchedImage, ImageFetcher, ImageFormat};
pub use model::quiz::QuizContent;
pub use model::{Chapter, ChapterKind, ContentDocument, DocumentStore};
