//! Error types for folio operations.

use thiserror::Error;

/// Errors that can occur while loading, editing, or exporting a content
/// document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Malformed persisted content that could not even be recovered by the
    /// single-chapter fallback.
    #[error("Invalid content: {0}")]
    Parse(String),

    /// An image could not be fetched. Recoverable: exporters render an
    /// inline placeholder instead of failing the document.
    #[error("Image fetch failed: {0}")]
    Fetch(String),

    /// Fetched image bytes are neither PNG nor JPEG. Treated exactly like a
    /// fetch failure by the exporters.
    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    /// A quiz regeneration request referenced a question that does not
    /// exist. The quiz content is left untouched.
    #[error("Question index {index} out of bounds (quiz has {len} questions)")]
    QuestionIndexOutOfBounds { index: usize, len: usize },

    #[error("PDF generation error: {0}")]
    Pdf(String),

    /// The persistence callback rejected a commit. The in-memory document
    /// is unchanged when this is returned.
    #[error("Persistence error: {0}")]
    Persist(String),
}

pub type Result<T> = std::result::Result<T, Error>;
