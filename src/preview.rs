//! Bounded preview excerpts for section-level chunks.
//!
//! A preview keeps a parent chunk small while still hinting at deep content:
//! opening context, one heuristically important middle sentence, and the
//! closing context, joined by an elision marker. It is descriptive, never a
//! content source of truth.

use std::sync::Arc;

use crate::boundaries::sentence_ranges;

/// Marker inserted where content was elided.
pub const ELISION: &str = " … ";

/// Marker words that flag a sentence as worth surfacing.
const DEFAULT_MARKERS: &[&str] = &[
    "important",
    "key",
    "essential",
    "critical",
    "significant",
    "note",
    "must",
    "conclusion",
    "summary",
    "result",
];

/// Scores a sentence as salient or not.
///
/// Implementations can swap the marker-word list per locale or domain
/// without touching segmentation logic.
pub trait Salience: Send + Sync {
    /// Whether `sentence` should be surfaced in a preview.
    fn is_salient(&self, sentence: &str) -> bool;
}

/// Default salience scorer: case-insensitive marker-word matching.
#[derive(Debug, Clone)]
pub struct KeywordSalience {
    markers: Vec<String>,
}

impl KeywordSalience {
    /// Create a scorer with the default English marker list.
    pub fn new() -> Self {
        Self {
            markers: DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Create a scorer with a custom marker list.
    pub fn with_markers(markers: Vec<String>) -> Self {
        Self {
            markers: markers.into_iter().map(|m| m.to_lowercase()).collect(),
        }
    }
}

impl Default for KeywordSalience {
    fn default() -> Self {
        Self::new()
    }
}

impl Salience for KeywordSalience {
    fn is_salient(&self, sentence: &str) -> bool {
        let lowered = sentence.to_lowercase();
        self.markers.iter().any(|m| lowered.contains(m.as_str()))
    }
}

/// Produces a bounded, representative excerpt of a block of text.
#[derive(Clone)]
pub struct PreviewSummarizer {
    salience: Arc<dyn Salience>,
}

impl PreviewSummarizer {
    /// Create a summarizer with the default keyword scorer.
    pub fn new() -> Self {
        Self {
            salience: Arc::new(KeywordSalience::new()),
        }
    }

    /// Create a summarizer with a custom salience scorer.
    pub fn with_salience(salience: Arc<dyn Salience>) -> Self {
        Self { salience }
    }

    /// Excerpt `text` down to at most `max_length` bytes.
    ///
    /// Short text passes through whole. Longer text keeps sentences from
    /// the start, the first salient sentence from the middle third, and
    /// sentences from the end, separated by [`ELISION`].
    pub fn summarize(&self, text: &str, max_length: usize) -> String {
        let text = text.trim();
        if text.len() <= max_length {
            return text.to_string();
        }
        if max_length == 0 {
            return String::new();
        }

        let head_budget = max_length * 2 / 5;
        let tail_budget = max_length / 4;
        let middle_budget = max_length
            .saturating_sub(head_budget + tail_budget + 2 * ELISION.len());

        let sentences = sentence_ranges(text);
        let head = take_from_start(text, &sentences, head_budget);
        let tail = take_from_end(text, &sentences, tail_budget);
        let middle = self.salient_middle(text, &sentences, middle_budget);

        let mut out = String::with_capacity(max_length);
        out.push_str(head);
        if let Some(middle) = middle {
            // avoid re-quoting a sentence already visible at either edge
            if !head.contains(middle) && !tail.contains(middle) {
                out.push_str(ELISION);
                out.push_str(middle);
            }
        }
        if !tail.is_empty() {
            out.push_str(ELISION);
            out.push_str(tail);
        }

        truncate_to(&out, max_length).to_string()
    }

    /// First salient sentence overlapping the middle third of the text.
    fn salient_middle<'t>(
        &self,
        text: &'t str,
        sentences: &[std::ops::Range<usize>],
        budget: usize,
    ) -> Option<&'t str> {
        if budget == 0 {
            return None;
        }
        let third = text.len() / 3;
        sentences
            .iter()
            .filter(|r| r.end > third && r.start < text.len() - third)
            .map(|r| text[r.clone()].trim())
            .find(|s| !s.is_empty() && s.len() <= budget && self.salience.is_salient(s))
    }
}

impl Default for PreviewSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Longest run of leading sentences fitting `budget`, or a truncated prefix
/// when even the first sentence is too long.
fn take_from_start<'t>(
    text: &'t str,
    sentences: &[std::ops::Range<usize>],
    budget: usize,
) -> &'t str {
    let mut end = 0;
    for range in sentences {
        if range.end > budget {
            break;
        }
        end = range.end;
    }
    if end == 0 {
        return truncate_to(text, budget);
    }
    text[..end].trim_end()
}

/// Longest run of trailing sentences fitting `budget`.
fn take_from_end<'t>(
    text: &'t str,
    sentences: &[std::ops::Range<usize>],
    budget: usize,
) -> &'t str {
    let mut start = text.len();
    for range in sentences.iter().rev() {
        if text.len() - range.start > budget {
            break;
        }
        start = range.start;
    }
    text[start..].trim()
}

/// Byte-budget truncation that respects char boundaries.
fn truncate_to(text: &str, max_length: usize) -> &str {
    if text.len() <= max_length {
        return text;
    }
    let mut end = max_length;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
