//! Paragraph extraction within one section.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use super::{floor_char_boundary, rfind_sentence_end, sentence_ranges};

/// Sections larger than this use the wide ideal-length band.
const LARGE_SECTION_LENGTH: usize = 20_000;

/// Content longer than this re-derives blocks from sentences when blank-line
/// splitting yields too few.
const SENTENCE_FALLBACK_LENGTH: usize = 5_000;

/// Minimum raw block count before the sentence fallback kicks in.
const MIN_RAW_BLOCKS: usize = 3;

/// Minimum sentence count for greedy packing; below this, fixed slicing.
const MIN_SENTENCES: usize = 5;

lazy_static! {
    /// A blank line: newline, optional horizontal whitespace, newline.
    static ref BLANK_LINE: Regex = Regex::new(r"\n[ \t]*\n").unwrap();
}

/// A paragraph-sized span of a section. Intermediate only.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    /// Trimmed paragraph text
    pub content: String,
    /// Start offset in the document
    pub start_char: usize,
    /// End offset (exclusive) in the document
    pub end_char: usize,
}

/// Splits one section's content into paragraphs sized near an ideal length
/// scaled to the content.
///
/// Blank-line blocks are preferred; long content with too few blocks falls
/// back to sentence-derived blocks, and content with too few sentences falls
/// back to fixed slices snapped to sentence punctuation. Every block is an
/// exact substring of the section, so offsets resolve by a monotonic forward
/// scan that never backtracks.
#[derive(Debug, Clone, Default)]
pub struct ParagraphExtractor;

impl ParagraphExtractor {
    /// Create a new paragraph extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract up to `max_paragraphs` paragraphs from `content`, with
    /// offsets translated by `base_offset` into document-global positions.
    pub fn extract(
        &self,
        content: &str,
        base_offset: usize,
        max_paragraphs: usize,
    ) -> Vec<Paragraph> {
        if content.is_empty() {
            return Vec::new();
        }
        let max_paragraphs = max_paragraphs.max(1);
        let ideal = ideal_paragraph_length(content.len());

        let mut blocks = raw_blocks(content);
        if blocks.len() < MIN_RAW_BLOCKS && content.len() > SENTENCE_FALLBACK_LENGTH {
            blocks = blocks_from_sentences(content, ideal);
        }
        let blocks = merge_short_blocks(blocks, ideal);

        let mut paragraphs = Vec::new();
        let mut search_from = 0;
        for range in blocks.into_iter().take(max_paragraphs) {
            let block = content[range].trim();
            if block.is_empty() {
                continue;
            }
            // monotonic scan: each block occurs at or after the previous end
            if let Some(rel) = content[search_from..].find(block) {
                let start = search_from + rel;
                let end = start + block.len();
                paragraphs.push(Paragraph {
                    content: block.to_string(),
                    start_char: base_offset + start,
                    end_char: base_offset + end,
                });
                search_from = end;
            }
        }

        if paragraphs.is_empty() {
            if let Some((trimmed, start, end)) =
                super::trimmed_with_offsets(content, base_offset)
            {
                paragraphs.push(Paragraph {
                    content: trimmed,
                    start_char: start,
                    end_char: end,
                });
            }
        }
        paragraphs
    }
}

/// Ideal paragraph length scaled to the content size.
fn ideal_paragraph_length(content_len: usize) -> usize {
    if content_len > LARGE_SECTION_LENGTH {
        (content_len / 20).clamp(500, 2000)
    } else {
        (content_len / 10).clamp(300, 1000)
    }
}

/// Blank-line-separated block spans.
fn raw_blocks(content: &str) -> Vec<Range<usize>> {
    let mut blocks = Vec::new();
    let mut prev = 0;
    for m in BLANK_LINE.find_iter(content) {
        if m.start() > prev {
            blocks.push(prev..m.start());
        }
        prev = m.end();
    }
    if prev < content.len() {
        blocks.push(prev..content.len());
    }
    blocks
}

/// Block spans re-derived from sentence boundaries: greedy packing up to
/// `ideal`, or fixed slices when sentences themselves are too few.
fn blocks_from_sentences(content: &str, ideal: usize) -> Vec<Range<usize>> {
    let sentences = sentence_ranges(content);
    if sentences.len() < MIN_SENTENCES {
        return fixed_slices(content, ideal);
    }

    let mut blocks: Vec<Range<usize>> = Vec::new();
    let mut current: Option<Range<usize>> = None;
    for sentence in sentences {
        match current.as_mut() {
            None => current = Some(sentence),
            Some(block) => {
                if sentence.end - block.start <= ideal {
                    block.end = sentence.end;
                } else {
                    blocks.push(block.clone());
                    current = Some(sentence);
                }
            }
        }
    }
    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

/// Fixed `ideal`-sized slices snapped to nearby sentence-ending punctuation.
fn fixed_slices(content: &str, ideal: usize) -> Vec<Range<usize>> {
    let mut blocks = Vec::new();
    let mut start = 0;
    while start < content.len() {
        let raw_end = floor_char_boundary(content, start + ideal);
        let end = if raw_end >= content.len() {
            content.len()
        } else {
            rfind_sentence_end(content, start + ideal / 2, raw_end).unwrap_or(raw_end)
        };
        if end <= start {
            break;
        }
        blocks.push(start..end);
        start = end;
    }
    blocks
}

/// Merge short adjacent blocks into blocks of up to `1.5 x ideal`.
fn merge_short_blocks(blocks: Vec<Range<usize>>, ideal: usize) -> Vec<Range<usize>> {
    let cap = ideal + ideal / 2;
    let mut out: Vec<Range<usize>> = Vec::new();
    for block in blocks {
        match out.last_mut() {
            Some(last) if last.end - last.start < ideal && block.end - last.start <= cap => {
                last.end = block.end;
            }
            _ => out.push(block),
        }
    }
    out
}
