//! Coarse section detection over full document text.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use super::floor_char_boundary;

/// Only this much of the text is scanned for heading patterns.
const PATTERN_SCAN_CAP: usize = 2_000_000;

/// Texts longer than this with no natural separators get artificial
/// boundaries.
const UNSTRUCTURED_THRESHOLD: usize = 100_000;

/// Sections spanning fewer characters than this are merged into a neighbor.
const MIN_SECTION_LENGTH: usize = 50;

/// Titles are truncated to this many grapheme clusters.
const MAX_TITLE_LENGTH: usize = 100;

/// Upper bound on collected candidates per heuristic pass, relative to the
/// section cap.
const CANDIDATE_FACTOR: usize = 4;

lazy_static! {
    /// Markdown-style heading: `# Title` through `###### Title`.
    static ref MARKDOWN_HEADING: Regex = Regex::new(r"(?m)^(#{1,6})[ \t]+(\S.*)$").unwrap();
    /// Setext-style heading: a short line underlined with `===` or `---`.
    static ref UNDERLINED_HEADING: Regex =
        Regex::new(r"(?m)^([^\n]{1,100})\n(?:={3,}|-{3,})[ \t]*$").unwrap();
    /// ALL-CAPS short line used as a heading.
    static ref CAPS_HEADING: Regex =
        Regex::new(r"(?m)^[A-Z][A-Z0-9][A-Z0-9 \t:,'&/().-]{1,77}$").unwrap();
    /// A run of two or more blank lines.
    static ref BLANK_RUN: Regex = Regex::new(r"\n(?:[ \t]*\n){2,}").unwrap();
    /// A single blank line directly followed by a capital letter.
    static ref BLANK_THEN_CAPITAL: Regex = Regex::new(r"\n[ \t]*\n[A-Z]").unwrap();
}

/// A coarse, titled span of the document. Intermediate only; sections are
/// consumed by the semantic strategy and never emitted as-is.
#[derive(Debug, Clone)]
pub struct Section {
    /// Heading text or first non-empty line, truncated
    pub title: String,
    /// Raw text of the section
    pub content: String,
    /// Start offset in the document
    pub start_char: usize,
    /// End offset (exclusive) in the document
    pub end_char: usize,
}

/// A section boundary produced by one of the detection heuristics.
struct BoundaryCandidate {
    offset: usize,
    title: Option<String>,
}

/// Splits full text into ordered, non-overlapping sections covering the
/// whole document.
///
/// Heuristics are layered: explicit heading patterns first, natural
/// separators when headings are sparse, artificial block division for very
/// large unstructured text, and a whole-document fallback. All candidate
/// sources feed a single ordered, deduplicated list consumed by one
/// construction pass.
#[derive(Debug, Clone, Default)]
pub struct SectionDetector;

impl SectionDetector {
    /// Create a new section detector.
    pub fn new() -> Self {
        Self
    }

    /// Detect up to `max_sections` sections in `text`.
    pub fn detect(&self, text: &str, max_sections: usize) -> Vec<Section> {
        if text.is_empty() {
            return Vec::new();
        }
        let max_sections = max_sections.max(1);
        let scan = &text[..floor_char_boundary(text, PATTERN_SCAN_CAP)];

        let mut candidates = self.pattern_candidates(scan, max_sections);
        if candidates.len() < max_sections / 2 {
            candidates.extend(self.separator_candidates(scan, max_sections));
        }
        if candidates.is_empty() && text.len() > UNSTRUCTURED_THRESHOLD {
            candidates = self.artificial_candidates(text, max_sections);
        }

        candidates.sort_by_key(|c| c.offset);
        candidates.dedup_by_key(|c| c.offset);
        candidates.retain(|c| c.offset < text.len());
        candidates.truncate(max_sections);

        if candidates.is_empty() {
            return vec![self.whole_document(text)];
        }
        let mut sections = self.build_sections(text, candidates);
        if sections.len() > max_sections {
            // fold the overflow into the final section
            let tail = &sections[max_sections - 1];
            let merged = Section {
                title: tail.title.clone(),
                content: text[tail.start_char..].to_string(),
                start_char: tail.start_char,
                end_char: text.len(),
            };
            sections.truncate(max_sections - 1);
            sections.push(merged);
        }
        sections
    }

    /// Heading-pattern candidates over the capped scan prefix.
    fn pattern_candidates(&self, scan: &str, max_sections: usize) -> Vec<BoundaryCandidate> {
        let cap = max_sections * CANDIDATE_FACTOR;
        let mut candidates = Vec::new();

        for caps in MARKDOWN_HEADING.captures_iter(scan).take(cap) {
            let m = caps.get(0).unwrap();
            let title = caps.get(2).map(|t| t.as_str().trim()).unwrap_or("");
            candidates.push(BoundaryCandidate {
                offset: m.start(),
                title: Some(truncate_title(title)),
            });
        }
        for caps in UNDERLINED_HEADING.captures_iter(scan).take(cap) {
            let m = caps.get(0).unwrap();
            let title = caps.get(1).map(|t| t.as_str().trim()).unwrap_or("");
            candidates.push(BoundaryCandidate {
                offset: m.start(),
                // a bare horizontal rule has no title line
                title: (!title.is_empty()).then(|| truncate_title(title)),
            });
        }
        for m in CAPS_HEADING.find_iter(scan).take(cap) {
            candidates.push(BoundaryCandidate {
                offset: m.start(),
                title: Some(truncate_title(m.as_str().trim())),
            });
        }

        candidates
    }

    /// Natural-separator candidates: blank-line runs and blank lines
    /// followed by a capital letter.
    fn separator_candidates(&self, scan: &str, max_sections: usize) -> Vec<BoundaryCandidate> {
        let cap = max_sections * CANDIDATE_FACTOR;
        let mut candidates = Vec::new();

        for m in BLANK_RUN.find_iter(scan).take(cap) {
            candidates.push(BoundaryCandidate {
                offset: m.end(),
                title: None,
            });
        }
        for m in BLANK_THEN_CAPITAL.find_iter(scan).take(cap) {
            // boundary sits on the capital letter, not the separator
            candidates.push(BoundaryCandidate {
                offset: m.end() - 1,
                title: None,
            });
        }

        candidates
    }

    /// Synthetic boundaries every `block_size` characters, snapped to the
    /// next line break, for large text with no usable structure.
    fn artificial_candidates(&self, text: &str, max_sections: usize) -> Vec<BoundaryCandidate> {
        let block_size = (text.len() / max_sections).max(10_000);
        let mut candidates = Vec::new();
        let mut pos = block_size;

        while pos < text.len() && candidates.len() < max_sections {
            let snapped = floor_char_boundary(text, pos);
            let offset = match text[snapped..].find('\n') {
                Some(rel) => snapped + rel + 1,
                None => break,
            };
            if offset >= text.len() {
                break;
            }
            candidates.push(BoundaryCandidate {
                offset,
                title: None,
            });
            pos = offset + block_size;
        }

        candidates
    }

    /// One section construction pass over the ordered candidate list.
    fn build_sections(&self, text: &str, mut candidates: Vec<BoundaryCandidate>) -> Vec<Section> {
        let first_offset = candidates[0].offset;
        if first_offset > 0 {
            if first_offset > MIN_SECTION_LENGTH {
                candidates.insert(
                    0,
                    BoundaryCandidate {
                        offset: 0,
                        title: Some("Introduction".to_string()),
                    },
                );
            } else {
                // tiny preamble folds into the first section
                candidates[0].offset = 0;
            }
        }

        let mut raw = Vec::with_capacity(candidates.len());
        for (i, candidate) in candidates.iter().enumerate() {
            let start = candidate.offset;
            let end = candidates
                .get(i + 1)
                .map(|next| next.offset)
                .unwrap_or(text.len());
            if start >= end {
                continue;
            }
            let content = &text[start..end];
            let title = candidate
                .title
                .clone()
                .unwrap_or_else(|| title_from_content(content));
            raw.push(Section {
                title,
                content: content.to_string(),
                start_char: start,
                end_char: end,
            });
        }

        merge_short_sections(text, raw)
    }

    /// The whole text as a single section.
    fn whole_document(&self, text: &str) -> Section {
        Section {
            title: title_from_content(text),
            content: text.to_string(),
            start_char: 0,
            end_char: text.len(),
        }
    }
}

/// Merge sections spanning fewer than [`MIN_SECTION_LENGTH`] characters into
/// a neighbor; the last section is kept regardless.
fn merge_short_sections(text: &str, raw: Vec<Section>) -> Vec<Section> {
    let count = raw.len();
    let mut out: Vec<Section> = Vec::with_capacity(count);
    let mut pending: Option<Section> = None;

    for (i, section) in raw.into_iter().enumerate() {
        let is_last = i + 1 == count;
        let short = section.end_char - section.start_char < MIN_SECTION_LENGTH;

        if short && !is_last {
            if let Some(prev) = out.last_mut() {
                prev.end_char = section.end_char;
                prev.content = text[prev.start_char..prev.end_char].to_string();
            } else if let Some(p) = pending.as_mut() {
                p.end_char = section.end_char;
                p.content = text[p.start_char..p.end_char].to_string();
            } else {
                pending = Some(section);
            }
        } else {
            let mut section = section;
            if let Some(p) = pending.take() {
                // the heading that introduced the folded span names the result
                section.start_char = p.start_char;
                section.title = p.title;
                section.content = text[section.start_char..section.end_char].to_string();
            }
            out.push(section);
        }
    }

    if let Some(p) = pending.take() {
        out.push(p);
    }
    out
}

/// First non-empty line of `content`, truncated, or "Document".
fn title_from_content(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(truncate_title)
        .unwrap_or_else(|| "Document".to_string())
}

/// Truncate a title to [`MAX_TITLE_LENGTH`] grapheme clusters, appending an
/// ellipsis when anything was cut.
fn truncate_title(title: &str) -> String {
    let mut graphemes = title.graphemes(true);
    let mut out: String = graphemes.by_ref().take(MAX_TITLE_LENGTH).collect();
    if graphemes.next().is_some() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_cover(sections: &[Section], len: usize) {
        assert_eq!(sections.first().unwrap().start_char, 0);
        assert_eq!(sections.last().unwrap().end_char, len);
        for pair in sections.windows(2) {
            assert_eq!(pair[0].end_char, pair[1].start_char);
        }
    }

    #[test]
    fn test_markdown_headings() {
        let text = format!(
            "# Overview\n\n{}\n\n# Details\n\n{}\n\n# Appendix\n\n{}\n",
            "Intro text. ".repeat(10),
            "Detail text. ".repeat(10),
            "Appendix text. ".repeat(10),
        );
        let sections = SectionDetector::new().detect(&text, 6);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].title, "Overview");
        assert_eq!(sections[1].title, "Details");
        assert_eq!(sections[2].title, "Appendix");
        spans_cover(&sections, text.len());
    }

    #[test]
    fn test_underlined_headings() {
        let text = format!(
            "Overview\n========\n\n{}\n\nDetails\n-------\n\n{}\n",
            "Body text. ".repeat(12),
            "More body. ".repeat(12),
        );
        let sections = SectionDetector::new().detect(&text, 10);
        assert!(sections.len() >= 2);
        assert_eq!(sections[0].title, "Overview");
        spans_cover(&sections, text.len());
    }

    #[test]
    fn test_introduction_prepended() {
        let text = format!(
            "{}\n\n# First Heading\n\n{}\n",
            "Preamble before any heading. ".repeat(5),
            "Section body. ".repeat(10),
        );
        let sections = SectionDetector::new().detect(&text, 10);
        assert_eq!(sections[0].title, "Introduction");
        assert_eq!(sections[0].start_char, 0);
        spans_cover(&sections, text.len());
    }

    #[test]
    fn test_short_preamble_folds_into_first_section() {
        let text = format!("tiny\n# Heading\n\n{}\n", "Section body. ".repeat(10));
        let sections = SectionDetector::new().detect(&text, 10);
        assert_eq!(sections[0].start_char, 0);
        assert_ne!(sections[0].title, "Introduction");
        spans_cover(&sections, text.len());
    }

    #[test]
    fn test_blank_line_separators() {
        let text = format!(
            "{}\n\n\n\n{}\n\n\n\n{}",
            "First block of prose without any heading marker. ".repeat(4),
            "Second block of prose, also unmarked but clearly separate. ".repeat(4),
            "Third block closing the document with more prose. ".repeat(4),
        );
        let sections = SectionDetector::new().detect(&text, 10);
        assert!(sections.len() >= 2);
        spans_cover(&sections, text.len());
    }

    #[test]
    fn test_whole_document_fallback() {
        let text = "Just one short paragraph with no structure at all.";
        let sections = SectionDetector::new().detect(text, 10);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].start_char, 0);
        assert_eq!(sections[0].end_char, text.len());
        assert_eq!(sections[0].title, "Just one short paragraph with no structure at all.");
    }

    #[test]
    fn test_untitled_document_fallback_title() {
        let sections = SectionDetector::new().detect("   \n \n x", 10);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "x");
    }

    #[test]
    fn test_artificial_blocks_for_large_unstructured_text() {
        // one very long line-broken blob, no blank lines, no headings
        let line = "lorem ipsum dolor sit amet consectetur adipiscing elit ";
        let mut text = String::new();
        while text.len() < 150_000 {
            text.push_str(line);
            text.push('\n');
        }
        let sections = SectionDetector::new().detect(&text, 10);
        assert!(sections.len() > 1, "expected artificial division");
        spans_cover(&sections, text.len());
    }

    #[test]
    fn test_title_truncation() {
        let long = "T".repeat(300);
        let title = truncate_title(&long);
        assert!(title.chars().count() <= MAX_TITLE_LENGTH + 1);
        assert!(title.ends_with('…'));
    }

    #[test]
    fn test_max_sections_cap() {
        let mut text = String::new();
        for i in 0..50 {
            text.push_str(&format!("# Heading {i}\n\n{}\n\n", "Body text. ".repeat(10)));
        }
        let sections = SectionDetector::new().detect(&text, 5);
        assert!(sections.len() <= 5);
        spans_cover(&sections, text.len());
    }
}
