//! Query helpers turning a question-answering result into a search.
//!
//! A QA service reports the answer together with its character offsets in the
//! flattened document text. The text around the answer is specific enough to
//! find the right passage on the page, so it becomes the search sentence.

use serde::{Deserialize, Serialize};

/// Characters of context kept on each side of the answer.
pub const DEFAULT_WINDOW: usize = 30;

/// An answer as returned by a question-answering service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSpan {
    /// Answer text
    pub answer: String,
    /// Model confidence
    #[serde(default)]
    pub score: f32,
    /// Character offset of the first answer character in the context
    pub start: usize,
    /// Character offset one past the last answer character
    pub end: usize,
}

/// Text surrounding the answer: `window` characters either side of the span.
///
/// Offsets count characters, not bytes, and are clamped to the context.
///
/// # Examples
///
/// ```
/// use pdf_evidence::evidence::snippet::{search_sentence, AnswerSpan};
///
/// let context = "Geography notes. The capital of France is Paris. Rivers follow.";
/// let start = context.find("Paris").unwrap();
/// let span = AnswerSpan { answer: "Paris".into(), score: 0.9, start, end: start + 5 };
/// assert_eq!(search_sentence(context, &span, 10), "France is Paris. Rivers f");
/// ```
pub fn search_sentence<'c>(context: &'c str, span: &AnswerSpan, window: usize) -> &'c str {
    let (answer_start, answer_end) = if span.start <= span.end {
        (span.start, span.end)
    } else {
        (span.end, span.start)
    };
    let start = byte_offset(context, answer_start.saturating_sub(window));
    let end = byte_offset(context, answer_end.saturating_add(window));
    &context[start..end]
}

/// Byte offset of the character at `index`, or the end of the text.
fn byte_offset(text: &str, index: usize) -> usize {
    text.char_indices().nth(index).map_or(text.len(), |(offset, _)| offset)
}

/// A search sentence and answer ready for the evidence locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceQuery {
    /// Passage to find on the page
    pub search_sentence: String,
    /// Answer to highlight inside the passage
    pub answer: String,
}

impl EvidenceQuery {
    /// Build a query from a QA answer.
    ///
    /// Returns `None` when the answer is blank, since there is nothing to
    /// show evidence for.
    pub fn from_span(context: &str, span: &AnswerSpan, window: usize) -> Option<Self> {
        let answer = span.answer.trim();
        if answer.is_empty() {
            return None;
        }
        let sentence = search_sentence(context, span, window).trim();
        if sentence.is_empty() {
            return None;
        }
        Some(Self {
            search_sentence: sentence.to_string(),
            answer: answer.to_string(),
        })
    }
}
