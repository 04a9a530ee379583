//! Boundary detection over raw text: sections, paragraphs, and leaf windows.
//!
//! The detectors in this module are pure, synchronous string scanners. They
//! never index outside the input and only cut at byte positions that are
//! also `char` boundaries, so the code built on top of them can slice
//! without checking.

mod leaves;
mod paragraphs;
mod sections;

pub use leaves::{LeafChunkBuilder, LeafPiece};
pub use paragraphs::{Paragraph, ParagraphExtractor};
pub use sections::{Section, SectionDetector};

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Sentence-ending punctuation, optionally closed by quotes or brackets,
    /// followed by whitespace.
    static ref SENTENCE_END: Regex = Regex::new(r#"[.!?]["')\]]*\s"#).unwrap();
}

/// Largest index `<= at` that lands on a char boundary of `text`.
pub(crate) fn floor_char_boundary(text: &str, at: usize) -> usize {
    if at >= text.len() {
        return text.len();
    }
    let mut i = at;
    while i > 0 && !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest index `>= at` that lands on a char boundary of `text`.
pub(crate) fn ceil_char_boundary(text: &str, at: usize) -> usize {
    if at >= text.len() {
        return text.len();
    }
    let mut i = at;
    while i < text.len() && !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Scan backward through `text[from..end]` for a sentence-ending mark
/// followed by whitespace or the end of the text. Returns the index just
/// past the mark.
pub(crate) fn rfind_sentence_end(text: &str, from: usize, end: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let end = end.min(bytes.len());
    if from >= end {
        return None;
    }
    let mut i = end;
    while i > from {
        i -= 1;
        let b = bytes[i];
        if (b == b'.' || b == b'!' || b == b'?')
            && bytes.get(i + 1).map_or(true, |n| n.is_ascii_whitespace())
        {
            return Some(i + 1);
        }
    }
    None
}

/// Scan backward through `text[from..end]` for a paragraph break (`\n\n`).
/// Returns the index just past the break.
pub(crate) fn rfind_paragraph_break(text: &str, from: usize, end: usize) -> Option<usize> {
    let from = floor_char_boundary(text, from);
    let end = floor_char_boundary(text, end);
    if from >= end {
        return None;
    }
    text[from..end].rfind("\n\n").map(|p| from + p + 2)
}

/// Scan backward through `text[from..end]` for a space or newline. Returns
/// the index just past it.
pub(crate) fn rfind_space(text: &str, from: usize, end: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let end = end.min(bytes.len());
    if from >= end {
        return None;
    }
    let mut i = end;
    while i > from {
        i -= 1;
        if bytes[i] == b' ' || bytes[i] == b'\n' || bytes[i] == b'\t' {
            return Some(i + 1);
        }
    }
    None
}

/// Sentence spans of `text`, each ending just past its terminating
/// punctuation and whitespace; the unterminated tail is its own span.
pub(crate) fn sentence_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut prev = 0;
    for m in SENTENCE_END.find_iter(text) {
        if m.end() > prev {
            ranges.push(prev..m.end());
            prev = m.end();
        }
    }
    if prev < text.len() {
        ranges.push(prev..text.len());
    }
    ranges
}

/// Trim a slice of the source text, translating the trimmed region back to
/// absolute offsets. Returns `None` when nothing but whitespace remains.
pub(crate) fn trimmed_with_offsets(piece: &str, abs_start: usize) -> Option<(String, usize, usize)> {
    let start_trimmed = piece.trim_start();
    let lead = piece.len() - start_trimmed.len();
    let trimmed = start_trimmed.trim_end();
    if trimmed.is_empty() {
        None
    } else {
        Some((
            trimmed.to_string(),
            abs_start + lead,
            abs_start + lead + trimmed.len(),
        ))
    }
}
