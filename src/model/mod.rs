//! Content document model.
//!
//! A [`ContentDocument`] is the ordered chapter list that constitutes one
//! course/book, plus the author's current chapter selection. The invariants
//! this module owns:
//!
//! - at most one chapter is a cover, and if present it sits at position 0;
//! - cover insertion/removal never loses the selection: the chapter the
//!   author was viewing stays selected by content identity, not by index;
//! - multi-step mutations are compute-then-commit: a new document value is
//!   built first and swapped in only after persistence succeeds.
//!
//! The persisted form is a JSON array in which each chapter is either a
//! legacy plain HTML string or a `{title, content, quiz?}` object. Both are
//! accepted on read; writes always emit the object shape.

pub mod cover;
pub mod quiz;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use quiz::QuizContent;

/// Explicit chapter discriminant, derived from the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterKind {
    Cover,
    Content,
}

/// A titled unit of HTML content plus an optional embedded quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    /// Raw chapter HTML. When a quiz is embedded it contains the
    /// editor-facing exercises block followed by the sentinel-wrapped
    /// shared block (see [`quiz`]).
    pub body: String,
}

impl Chapter {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Whether this chapter is the cover. Derived from the body, never
    /// stored: the marker wins, a structural heuristic covers legacy
    /// documents (see [`cover::is_cover`]).
    pub fn kind(&self) -> ChapterKind {
        if cover::is_cover(&self.body) {
            ChapterKind::Cover
        } else {
            ChapterKind::Content
        }
    }

    /// The embedded quiz, if the body carries one.
    pub fn quiz(&self) -> Option<QuizContent> {
        quiz::extract_quiz(&self.body)
    }

    /// Append a quiz to this chapter's body (editor rendering inline,
    /// shared rendering sentinel-wrapped).
    pub fn embed_quiz(&mut self, editor_html: &str, shared_html: &str) {
        self.body = quiz::embed_quiz(&self.body, editor_html, shared_html);
    }
}

/// Persisted chapter shape. Legacy documents stored bare HTML strings;
/// current documents store objects.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum PersistedChapter {
    Entry {
        title: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        quiz: Option<QuizContent>,
    },
    Legacy(String),
}

/// Callback the model uses to persist a serialized document.
///
/// Mutating operations go through [`ContentDocument::commit`]: the store is
/// handed the new serialized form, and only a successful save swaps the new
/// value into memory.
pub trait DocumentStore {
    fn save(&mut self, json: &str) -> Result<()>;
}

/// The ordered collection of chapters for one course/book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDocument {
    chapters: Vec<Chapter>,
    selected: Option<usize>,
}

impl ContentDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the persisted JSON array.
    ///
    /// Malformed payloads are recovered locally: the whole payload becomes
    /// one untitled chapter rather than an error, so a corrupt save never
    /// locks the author out of their document.
    pub fn from_json(json: &str) -> Self {
        let persisted: Vec<PersistedChapter> = match serde_json::from_str(json) {
            Ok(chapters) => chapters,
            Err(e) => {
                log::warn!("persisted content did not parse ({e}); falling back to a single untitled chapter");
                return Self {
                    chapters: vec![Chapter::new("Untitled", json)],
                    selected: if json.trim().is_empty() { None } else { Some(0) },
                };
            }
        };

        let chapters = persisted
            .into_iter()
            .map(|p| match p {
                PersistedChapter::Legacy(content) => Chapter::new("Untitled", content),
                PersistedChapter::Entry {
                    title,
                    content,
                    quiz,
                } => {
                    let mut chapter = Chapter::new(title, content);
                    // A stored quiz that never made it into the body (older
                    // writers) gets embedded on read so the body stays the
                    // single source of truth.
                    if let Some(q) = quiz {
                        if quiz::extract_quiz(&chapter.body).is_none() {
                            chapter.embed_quiz(&q.editor_content, &q.shared_content);
                        }
                    }
                    chapter
                }
            })
            .collect::<Vec<_>>();

        let selected = if chapters.is_empty() { None } else { Some(0) };
        Self { chapters, selected }
    }

    /// Serialize to the persisted JSON array (always the object shape).
    pub fn to_json(&self) -> Result<String> {
        let persisted: Vec<PersistedChapter> = self
            .chapters
            .iter()
            .map(|c| PersistedChapter::Entry {
                title: c.title.clone(),
                content: c.body.clone(),
                quiz: c.quiz(),
            })
            .collect();
        Ok(serde_json::to_string(&persisted)?)
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Index of the currently selected chapter, if any.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_chapter(&self) -> Option<&Chapter> {
        self.selected.and_then(|i| self.chapters.get(i))
    }

    pub fn select(&mut self, index: usize) {
        if index < self.chapters.len() {
            self.selected = Some(index);
        }
    }

    /// The cover chapter, if the document has one.
    pub fn cover(&self) -> Option<&Chapter> {
        self.chapters
            .first()
            .filter(|c| c.kind() == ChapterKind::Cover)
    }

    pub fn push_chapter(&mut self, chapter: Chapter) {
        self.chapters.push(chapter);
        if self.selected.is_none() {
            self.selected = Some(self.chapters.len() - 1);
        }
    }

    /// Remove a chapter by index. The only way a chapter is destroyed apart
    /// from [`remove_cover`](Self::remove_cover).
    pub fn remove_chapter(&mut self, index: usize) {
        if index >= self.chapters.len() {
            return;
        }
        self.chapters.remove(index);
        self.selected = if self.chapters.is_empty() {
            None
        } else {
            match self.selected {
                Some(s) if s == index => Some(index.min(self.chapters.len() - 1)),
                Some(s) if s > index => Some(s - 1),
                other => other,
            }
        };
    }

    /// Replace the body of the chapter at `index` (the editor save path).
    pub fn update_body(&mut self, index: usize, body: impl Into<String>) {
        if let Some(chapter) = self.chapters.get_mut(index) {
            chapter.body = body.into();
        }
    }

    /// A copy of this document with a fresh cover chapter at position 0.
    ///
    /// An existing cover at position 0 is replaced; later chapters are never
    /// touched even when their bodies look cover-like, because only position
    /// 0 is ever the cover. The previously selected chapter stays selected by
    /// content identity, so the index shift never moves the author to a
    /// different chapter.
    pub fn insert_cover(&self, image_url: &str) -> ContentDocument {
        let selected_chapter = self.selected_chapter().cloned();

        let mut chapters = self.chapters.clone();
        if chapters
            .first()
            .is_some_and(|c| c.kind() == ChapterKind::Cover)
        {
            chapters.remove(0);
        }
        chapters.insert(0, Chapter::new("Cover", cover::cover_body(image_url)));

        let selected = match selected_chapter {
            Some(prev) => chapters
                .iter()
                .position(|c| *c == prev)
                .or(Some(0)),
            None => Some(0),
        };

        ContentDocument { chapters, selected }
    }

    /// A copy of this document with the cover chapter removed. A no-op when
    /// the chapter at position 0 is not a cover; content chapters further in
    /// are never candidates, whatever their bodies look like.
    ///
    /// If the author was viewing the cover, selection falls back to the new
    /// first chapter, or to no selection when the document becomes empty.
    pub fn remove_cover(&self) -> ContentDocument {
        let has_cover = self
            .chapters
            .first()
            .is_some_and(|c| c.kind() == ChapterKind::Cover);
        if !has_cover {
            return self.clone();
        }

        let chapters: Vec<Chapter> = self.chapters[1..].to_vec();
        let selected = match self.selected {
            Some(s) if s > 0 => Some(s - 1),
            _ if chapters.is_empty() => None,
            _ => Some(0),
        };

        ContentDocument { chapters, selected }
    }

    /// Persist `next` and, only on success, swap it into `self`.
    ///
    /// On persistence failure the in-memory document is unchanged and the
    /// error surfaces; no multi-step mutation is ever half-applied.
    pub fn commit<S: DocumentStore>(&mut self, next: ContentDocument, store: &mut S) -> Result<()> {
        let json = next.to_json()?;
        store
            .save(&json)
            .map_err(|e| Error::Persist(e.to_string()))?;
        *self = next;
        Ok(())
    }
}
