//! Quiz embedding protocol.
//!
//! A chapter carries its quiz inside the body HTML in two renderings: an
//! editor-facing block (`<h2>Exercises</h2>…`, displayed inline while the
//! author keeps editing) and an interactive shared block wrapped between two
//! literal sentinel comments. The sentinels are a wire contract with the
//! persistence API and the public share page; they must be emitted byte for
//! byte.
//!
//! Persisted bodies sometimes arrive after one or even two extra rounds of
//! JSON string escaping (an upstream encoder stringifies already-stringified
//! payloads). [`extract_quiz`] compensates by progressively un-escaping and
//! retrying, so the same stored document reads back identically no matter
//! how many rounds it went through.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opens the interactive quiz block inside a chapter body.
pub const SHARED_QUIZ_START: &str = "<!-- SHARED_QUIZ_START -->";
/// Closes the interactive quiz block inside a chapter body.
pub const SHARED_QUIZ_END: &str = "<!-- SHARED_QUIZ_END -->";

/// Marks the start of the editor-facing quiz rendering.
pub const EXERCISES_HEADING: &str = "<h2>Exercises</h2>";

/// Opening of a single question block, shared by both renderings.
const QUESTION_OPEN: &str = "<div class=\"quiz-question\"";

/// Maximum number of un-escape rounds tolerated when reading stored bodies.
const MAX_ESCAPE_ROUNDS: usize = 2;

/// Two renderings of the same logical quiz.
///
/// `editor_content` is static HTML shown inline in the editor;
/// `shared_content` is the interactive rendering used by the public share
/// page. Questions are identified by document-order position in both; no
/// stable per-question id survives regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizContent {
    #[serde(rename = "editorContent")]
    pub editor_content: String,
    #[serde(rename = "sharedContent")]
    pub shared_content: String,
}

impl QuizContent {
    pub fn new(editor_content: impl Into<String>, shared_content: impl Into<String>) -> Self {
        Self {
            editor_content: editor_content.into(),
            shared_content: shared_content.into(),
        }
    }

    /// Number of question blocks in the shared rendering.
    pub fn question_count(&self) -> usize {
        question_spans(&self.shared_content).len()
    }
}

/// Append a quiz to a chapter body.
///
/// The editor rendering goes directly after the existing content so it
/// displays inline during editing; the shared rendering follows, wrapped in
/// the sentinel comments.
pub fn embed_quiz(chapter_body: &str, editor_html: &str, shared_html: &str) -> String {
    let mut body = String::with_capacity(
        chapter_body.len()
            + editor_html.len()
            + shared_html.len()
            + SHARED_QUIZ_START.len()
            + SHARED_QUIZ_END.len(),
    );
    body.push_str(chapter_body);
    body.push_str(editor_html);
    body.push_str(SHARED_QUIZ_START);
    body.push_str(shared_html);
    body.push_str(SHARED_QUIZ_END);
    body
}

/// Extract the embedded quiz from a chapter body, if any.
///
/// Tolerates bodies that passed through up to two extra rounds of JSON
/// string escaping: when the sentinels do not match, or the enclosed HTML
/// still carries escape artifacts, the whole body is un-escaped one round
/// (`\n`, `\"`, `\\`) and the match is retried.
pub fn extract_quiz(body: &str) -> Option<QuizContent> {
    let mut current = body.to_string();

    for round in 0..=MAX_ESCAPE_ROUNDS {
        if let Some((open, close)) = find_sentinels(&current) {
            let shared = &current[open + SHARED_QUIZ_START.len()..close];
            if round < MAX_ESCAPE_ROUNDS && looks_escaped(shared) {
                current = unescape_round(&current);
                continue;
            }

            let before = &current[..open];
            let editor = match before.rfind(EXERCISES_HEADING) {
                Some(at) => before[at..].to_string(),
                // Body without an editor block: fall back to the shared
                // rendering for display purposes.
                None => shared.to_string(),
            };
            return Some(QuizContent {
                editor_content: editor,
                shared_content: shared.to_string(),
            });
        }
        current = unescape_round(&current);
    }

    None
}

/// Remove the sentinel-wrapped shared block, leaving everything else
/// (including the editor-facing exercises) in place.
///
/// Renderers feed the result to the node extractor so interactive markup
/// never leaks into PDF/DOCX output.
pub fn strip_shared_block(body: &str) -> String {
    match find_sentinels(body) {
        Some((open, close)) => {
            let mut out = String::with_capacity(body.len());
            out.push_str(&body[..open]);
            out.push_str(&body[close + SHARED_QUIZ_END.len()..]);
            out
        }
        None => body.to_string(),
    }
}

/// Replace the question at `index` (0-based, document order) in both
/// renderings, leaving the quiz container attributes and every sibling
/// question byte-identical.
///
/// Fails with [`Error::QuestionIndexOutOfBounds`] and returns no partial
/// result when either rendering has fewer questions than `index + 1`.
pub fn regenerate_question(
    quiz: &QuizContent,
    index: usize,
    new_editor_question: &str,
    new_shared_question: &str,
) -> Result<QuizContent> {
    let editor = replace_question(&quiz.editor_content, index, new_editor_question)?;
    let shared = replace_question(&quiz.shared_content, index, new_shared_question)?;
    Ok(QuizContent {
        editor_content: editor,
        shared_content: shared,
    })
}

fn replace_question(html: &str, index: usize, replacement: &str) -> Result<String> {
    let spans = question_spans(html);
    let Some(&(start, end)) = spans.get(index) else {
        return Err(Error::QuestionIndexOutOfBounds {
            index,
            len: spans.len(),
        });
    };

    let mut out = String::with_capacity(html.len() - (end - start) + replacement.len());
    out.push_str(&html[..start]);
    out.push_str(replacement);
    out.push_str(&html[end..]);
    Ok(out)
}

/// Byte spans of the top-level question blocks, in document order.
///
/// A question is a balanced `<div class="quiz-question" …>…</div>` block.
/// Working on raw bytes (instead of a parsed DOM) is what keeps sibling
/// questions byte-identical across a replacement.
fn question_spans(html: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(rel) = html[cursor..].find(QUESTION_OPEN) {
        let start = cursor + rel;
        match find_balanced_div_end(html, start) {
            Some(end) => {
                spans.push((start, end));
                cursor = end;
            }
            None => break, // unterminated block; ignore the tail
        }
    }

    spans
}

/// Given the byte offset of a `<div` opening tag, find the offset just past
/// its matching `</div>` by tracking nesting depth.
fn find_balanced_div_end(html: &str, open_at: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut cursor = open_at;

    loop {
        let rest = &html[cursor..];
        let next_open = find_div_open(rest);
        let next_close = rest.find("</div>");

        match (next_open, next_close) {
            (Some(o), Some(c)) if o < c => {
                depth += 1;
                cursor += o + 4;
            }
            (_, Some(c)) => {
                depth -= 1;
                cursor += c + "</div>".len();
                if depth == 0 {
                    return Some(cursor);
                }
            }
            _ => return None,
        }
    }
}

/// Find `<div` followed by whitespace or `>` (so `<divider>` never counts).
fn find_div_open(s: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = s[from..].find("<div") {
        let at = from + rel;
        match s.as_bytes().get(at + 4) {
            Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => return Some(at),
            _ => from = at + 4,
        }
    }
    None
}

fn find_sentinels(body: &str) -> Option<(usize, usize)> {
    let open = body.find(SHARED_QUIZ_START)?;
    let close = body[open..].find(SHARED_QUIZ_END)? + open;
    Some((open, close))
}

/// One round of JSON string un-escaping, in the fixed order `\n`, `\"`, `\\`.
fn unescape_round(s: &str) -> String {
    s.replace("\\n", "\n")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\")
}

fn looks_escaped(s: &str) -> bool {
    s.contains("\\\"") || s.contains("\\n") || s.contains("\\\\")
}

/// A question/answer pair from the legacy flat quiz text format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatQuestion {
    pub number: u32,
    pub question: String,
    pub answer: String,
}

static FLAT_QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*Question\s+(\d+):\s*Q:\s*(.+?)\s*A:\s*(.+?)\s*$").expect("valid regex")
});

/// Parse the legacy flat quiz format (`Question N: Q: … A: …` lines).
///
/// Display-only: old documents store quizzes this way and the share page
/// still has to render them. Lines that do not match are skipped.
pub fn parse_flat_quiz(text: &str) -> Vec<FlatQuestion> {
    FLAT_QUESTION_RE
        .captures_iter(text)
        .filter_map(|caps| {
            Some(FlatQuestion {
                number: caps[1].parse().ok()?,
                question: caps[2].to_string(),
                answer: caps[3].to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDITOR: &str = "<h2>Exercises</h2><p>Q1</p>";
    const SHARED: &str = "<div class=\"quiz-question\">Q1</div>";

    #[test]
    fn embed_orders_blocks_after_content() {
        let body = embed_quiz("<h1>Intro</h1><p>Hello</p>", EDITOR, SHARED);

        let h1 = body.find("<h1>Intro</h1>").unwrap();
        let editor = body.find(EDITOR).unwrap();
        let start = body.find(SHARED_QUIZ_START).unwrap();
        let shared = body.find(SHARED).unwrap();
        let end = body.find(SHARED_QUIZ_END).unwrap();
        assert!(h1 < editor && editor < start && start < shared && shared < end);
    }

    #[test]
    fn extract_recovers_both_renderings() {
        let body = embed_quiz("<p>content</p>", EDITOR, SHARED);
        let quiz = extract_quiz(&body).unwrap();
        assert_eq!(quiz.editor_content, EDITOR);
        assert_eq!(quiz.shared_content, SHARED);
    }

    #[test]
    fn extract_survives_double_json_encoding() {
        let body = embed_quiz(
            "<p>content</p>",
            "<h2>Exercises</h2><p>Pick \"a\" or \"b\"</p>",
            "<div class=\"quiz-question\">Pick one</div>",
        );
        let once = serde_json::to_string(&body).unwrap();
        let twice = serde_json::to_string(&once).unwrap();

        let quiz = extract_quiz(&twice).unwrap();
        assert_eq!(quiz.shared_content, "<div class=\"quiz-question\">Pick one</div>");
        assert_eq!(
            quiz.editor_content,
            "<h2>Exercises</h2><p>Pick \"a\" or \"b\"</p>"
        );
    }

    #[test]
    fn extract_returns_none_without_sentinels() {
        assert!(extract_quiz("<p>no quiz here</p>").is_none());
    }

    #[test]
    fn strip_shared_block_keeps_exercises() {
        let body = embed_quiz("<p>content</p>", EDITOR, SHARED);
        let stripped = strip_shared_block(&body);
        assert!(stripped.contains(EDITOR));
        assert!(!stripped.contains(SHARED_QUIZ_START));
        assert!(!stripped.contains(SHARED));
    }

    fn five_question_quiz() -> QuizContent {
        let questions: String = (0..5)
            .map(|i| format!("<div class=\"quiz-question\" data-type=\"mc\"><p>Q{i}</p><div class=\"options\"><span>a</span></div></div>"))
            .collect();
        QuizContent::new(
            format!("<h2>Exercises</h2>{questions}"),
            format!("<div id=\"quiz-1\" data-quiz-type=\"mc\">{questions}</div>"),
        )
    }

    #[test]
    fn regenerate_replaces_only_target_question() {
        let quiz = five_question_quiz();
        let new_e = "<div class=\"quiz-question\" data-type=\"mc\"><p>NEW</p></div>";
        let new_s = "<div class=\"quiz-question\" data-type=\"mc\"><p>NEW-S</p></div>";

        let updated = regenerate_question(&quiz, 2, new_e, new_s).unwrap();

        let before = question_spans(&quiz.shared_content);
        let after = question_spans(&updated.shared_content);
        assert_eq!(before.len(), after.len());
        for i in [0usize, 1, 3, 4] {
            let (s0, e0) = before[i];
            let (s1, e1) = after[i];
            assert_eq!(
                &quiz.shared_content[s0..e0],
                &updated.shared_content[s1..e1],
                "question {i} must be byte-identical"
            );
        }
        assert!(updated.shared_content.contains("NEW-S"));
        assert!(updated.editor_content.contains("NEW"));
        // Container attributes untouched.
        assert!(updated.shared_content.starts_with("<div id=\"quiz-1\" data-quiz-type=\"mc\">"));
    }

    #[test]
    fn regenerate_out_of_bounds_leaves_input_unchanged() {
        let quiz = five_question_quiz();
        let err = regenerate_question(&quiz, 5, "<div class=\"quiz-question\">x</div>", "y")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::QuestionIndexOutOfBounds { index: 5, len: 5 }
        ));
        assert_eq!(quiz, five_question_quiz());
    }

    #[test]
    fn regenerate_is_idempotent() {
        let quiz = five_question_quiz();
        let new_e = "<div class=\"quiz-question\"><p>NEW</p></div>";
        let new_s = "<div class=\"quiz-question\"><p>NEW-S</p></div>";
        let once = regenerate_question(&quiz, 1, new_e, new_s).unwrap();
        let twice = regenerate_question(&once, 1, new_e, new_s).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn nested_divs_inside_question_stay_balanced() {
        let html = "<div class=\"quiz-question\"><div><div>deep</div></div></div><div class=\"quiz-question\">two</div>";
        let spans = question_spans(html);
        assert_eq!(spans.len(), 2);
        assert_eq!(&html[spans[1].0..spans[1].1], "<div class=\"quiz-question\">two</div>");
    }

    #[test]
    fn flat_quiz_lines_parse_into_pairs() {
        let text = "Question 1: Q: What is 2+2? A: 4\nnoise\nQuestion 2: Q: Capital of France? A: Paris";
        let parsed = parse_flat_quiz(text);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].number, 1);
        assert_eq!(parsed[0].question, "What is 2+2?");
        assert_eq!(parsed[1].answer, "Paris");
    }
}
