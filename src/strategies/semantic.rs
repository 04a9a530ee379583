//! Structure-aware segmentation: root, sections, paragraphs, leaves.

use std::collections::VecDeque;

use tracing::{debug, warn};

use super::{ChunkStream, RunState, SegmentParams, SegmentationStrategy};
use crate::boundaries::{
    floor_char_boundary, LeafChunkBuilder, Paragraph, ParagraphExtractor, Section,
    SectionDetector,
};
use crate::error::SegmentError;
use crate::preview::PreviewSummarizer;
use crate::types::{Chunk, ChunkId, HierarchyLevel, SegmenterConfig};

/// Paragraph chunks shorter than this are skipped.
const MIN_PARAGRAPH_LENGTH: usize = 50;

/// Root content takes the first `min(1000, max(200, len/5))` characters.
const ROOT_CONTENT_MAX: usize = 1000;
const ROOT_CONTENT_MIN: usize = 200;

/// The primary strategy: a lazy state machine emitting a four-level tree in
/// parent-before-child order.
///
/// The root summary is emitted first, then for each detected section a
/// titled preview chunk, the section's paragraphs, and fine-grained
/// overlapping leaves for paragraphs long enough to warrant them. Budgets
/// are enforced with safety margins at each tier; exceeding one truncates
/// the traversal with a warning, it never errors.
pub struct SemanticStrategy {
    config: SegmenterConfig,
    detector: SectionDetector,
    summarizer: PreviewSummarizer,
}

impl SemanticStrategy {
    /// Create a semantic strategy with the default preview summarizer.
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            config,
            detector: SectionDetector::new(),
            summarizer: PreviewSummarizer::new(),
        }
    }

    /// Replace the preview summarizer (e.g. for a custom salience scorer).
    pub fn with_summarizer(mut self, summarizer: PreviewSummarizer) -> Self {
        self.summarizer = summarizer;
        self
    }
}

impl SegmentationStrategy for SemanticStrategy {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn description(&self) -> &'static str {
        "Structure-aware hierarchical segmentation (sections, paragraphs, leaves)"
    }

    fn segment<'a>(
        &self,
        text: &'a str,
        params: &SegmentParams,
    ) -> Result<ChunkStream<'a>, SegmentError> {
        let sections = self.detector.detect(text, self.config.max_sections);
        if sections.is_empty() {
            return Err(SegmentError::StrategyFailure {
                strategy: self.name(),
                reason: "section detection produced no sections".to_string(),
            });
        }
        // plan validation: ordered, in-bounds, gap-free coverage
        let mut prev_end = 0;
        for section in &sections {
            if section.start_char != prev_end || section.end_char > text.len() {
                return Err(SegmentError::InvalidPlan(format!(
                    "section [{}, {}) does not continue at {}",
                    section.start_char, section.end_char, prev_end
                )));
            }
            if section.start_char > section.end_char {
                return Err(SegmentError::InvalidPlan(format!(
                    "section span [{}, {}) is inverted",
                    section.start_char, section.end_char
                )));
            }
            prev_end = section.end_char;
        }
        if prev_end != text.len() {
            return Err(SegmentError::InvalidPlan(format!(
                "sections cover {prev_end} of {} chars",
                text.len()
            )));
        }
        debug!(sections = sections.len(), "semantic plan ready");

        Ok(Box::new(SemanticStream {
            text,
            max_length: params.max_length,
            extractor: ParagraphExtractor::new(),
            leaves: LeafChunkBuilder::new(self.config.max_chunk_size),
            summarizer: self.summarizer.clone(),
            run: RunState::new(self.config.max_chunks),
            config: self.config.clone(),
            sections: sections.into_iter(),
            root_id: None,
            current: None,
            pending: VecDeque::new(),
            truncated: false,
            done: false,
        }))
    }
}

/// Paragraph traversal position within one section.
struct SectionCursor {
    section_id: ChunkId,
    paragraphs: std::vec::IntoIter<Paragraph>,
}

/// Lazy chunk sequence over one document.
struct SemanticStream<'a> {
    text: &'a str,
    max_length: usize,
    extractor: ParagraphExtractor,
    leaves: LeafChunkBuilder,
    summarizer: PreviewSummarizer,
    run: RunState,
    config: SegmenterConfig,
    sections: std::vec::IntoIter<Section>,
    root_id: Option<ChunkId>,
    current: Option<SectionCursor>,
    pending: VecDeque<Chunk>,
    truncated: bool,
    done: bool,
}

impl<'a> SemanticStream<'a> {
    /// Emit the level-0 root: a bounded prefix spanning the whole document.
    fn emit_root(&mut self) -> Option<Chunk> {
        let target = (self.text.len() / 5)
            .clamp(ROOT_CONTENT_MIN, ROOT_CONTENT_MAX)
            .min(self.text.len());
        let end = floor_char_boundary(self.text, target);
        let chunk = self.run.admit(
            self.text[..end].to_string(),
            HierarchyLevel::Root,
            0,
            self.text.len(),
            None,
        )?;
        self.root_id = Some(chunk.id);
        Some(chunk)
    }

    /// Note a budget-margin stop exactly once.
    fn mark_truncated(&mut self, tier: &'static str) {
        if !self.truncated {
            self.truncated = true;
            warn!(
                emitted = self.run.emitted(),
                tier, "budget margin reached, truncating semantic traversal"
            );
        }
    }

    /// Emit the next paragraph chunk (with its queued leaves) from the
    /// current section, if any.
    fn next_from_section(&mut self) -> Option<Chunk> {
        loop {
            let cursor = self.current.as_mut()?;
            let paragraph = match cursor.paragraphs.next() {
                Some(p) => p,
                None => {
                    self.current = None;
                    return None;
                }
            };
            if paragraph.content.len() < MIN_PARAGRAPH_LENGTH {
                continue;
            }
            if self.run.emitted() >= self.config.max_chunks.saturating_sub(2) {
                self.mark_truncated("paragraph");
                self.current = None;
                return None;
            }
            let parent = cursor.section_id;
            let Some(chunk) = self.run.admit(
                paragraph.content.clone(),
                HierarchyLevel::Paragraph,
                paragraph.start_char,
                paragraph.end_char,
                Some(parent),
            ) else {
                // duplicate paragraph: skip it and its leaves
                continue;
            };
            self.queue_leaves(&paragraph, chunk.id);
            return Some(chunk);
        }
    }

    /// Build and queue level-3 leaves for a long paragraph.
    fn queue_leaves(&mut self, paragraph: &Paragraph, parent: ChunkId) {
        let threshold = (2 * self.max_length).max(self.config.min_leaf_length * 3);
        if paragraph.content.len() <= threshold {
            return;
        }
        if self.text.len() > self.config.large_text_threshold {
            // very large document: spend the budget on coverage, not depth
            return;
        }
        let budget = self
            .config
            .max_leaf_chunks
            .min(self.run.remaining().saturating_sub(1));
        if budget == 0 {
            return;
        }
        let min_overlap = (self.max_length / 10).max(20);
        let pieces = self.leaves.build(
            &paragraph.content,
            self.max_length,
            min_overlap,
            paragraph.start_char,
            budget,
        );
        for piece in pieces {
            if piece.content.len() < self.config.min_leaf_length {
                continue;
            }
            if let Some(chunk) = self.run.admit(
                piece.content,
                HierarchyLevel::Leaf,
                piece.start_char,
                piece.end_char,
                Some(parent),
            ) {
                self.pending.push_back(chunk);
            }
        }
    }

    /// Open the next section: emit its preview chunk and stage its
    /// paragraphs.
    fn open_next_section(&mut self) -> Option<Chunk> {
        loop {
            if self.run.emitted() + 1 >= self.config.max_chunks {
                self.mark_truncated("section");
                self.done = true;
                return None;
            }
            let section = match self.sections.next() {
                Some(s) => s,
                None => {
                    self.done = true;
                    return None;
                }
            };
            let paragraphs =
                self.extractor
                    .extract(&section.content, section.start_char, self.config.max_paragraphs);

            let preview_budget = self.max_length.clamp(ROOT_CONTENT_MIN, ROOT_CONTENT_MAX);
            let preview = self.summarizer.summarize(&section.content, preview_budget);
            let content = if preview.is_empty() {
                section.title.clone()
            } else {
                format!("{}\n\n{}", section.title, preview)
            };

            let Some(chunk) = self.run.admit(
                content,
                HierarchyLevel::Section,
                section.start_char,
                section.end_char,
                self.root_id,
            ) else {
                // duplicate section: skip it and its subtree
                continue;
            };
            self.current = Some(SectionCursor {
                section_id: chunk.id,
                paragraphs: paragraphs.into_iter(),
            });
            return Some(chunk);
        }
    }
}

impl<'a> Iterator for SemanticStream<'a> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        loop {
            if let Some(chunk) = self.pending.pop_front() {
                return Some(chunk);
            }
            if self.done {
                return None;
            }
            if self.root_id.is_none() {
                match self.emit_root() {
                    Some(chunk) => return Some(chunk),
                    None => {
                        self.done = true;
                        return None;
                    }
                }
            }
            if self.current.is_some() {
                match self.next_from_section() {
                    Some(chunk) => return Some(chunk),
                    None => continue,
                }
            }
            match self.open_next_section() {
                Some(chunk) => return Some(chunk),
                None => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, max_length: usize) -> Vec<Chunk> {
        let strategy = SemanticStrategy::new(SegmenterConfig::default());
        strategy
            .segment(text, &SegmentParams { max_length })
            .unwrap()
            .collect()
    }

    fn structured_text() -> String {
        let mut text = String::new();
        for i in 0..4 {
            text.push_str(&format!("# Section {i}\n\n"));
            for j in 0..3 {
                text.push_str(&format!(
                    "Paragraph {j} of section {i}. {}\n\n",
                    "It keeps adding distinct sentences to fill space. ".repeat(4)
                ));
            }
        }
        text
    }

    #[test]
    fn test_root_emitted_first() {
        let text = structured_text();
        let chunks = segment(&text, 500);
        assert!(chunks.len() > 1);
        assert_eq!(chunks[0].hierarchy_level, HierarchyLevel::Root);
        assert_eq!(chunks[0].start_char, 0);
        assert_eq!(chunks[0].end_char, text.len());
        assert_eq!(chunks[0].parent_id, None);
        assert_eq!(
            chunks
                .iter()
                .filter(|c| c.hierarchy_level == HierarchyLevel::Root)
                .count(),
            1
        );
    }

    #[test]
    fn test_parent_before_child() {
        let chunks = segment(&structured_text(), 500);
        for (i, chunk) in chunks.iter().enumerate() {
            if let Some(parent_id) = chunk.parent_id {
                let parent = chunks[..i]
                    .iter()
                    .find(|c| c.id == parent_id)
                    .expect("parent must be emitted earlier");
                assert!(parent.hierarchy_level < chunk.hierarchy_level);
            }
        }
    }

    #[test]
    fn test_section_chunks_are_previews() {
        let text = structured_text();
        let chunks = segment(&text, 500);
        let sections: Vec<_> = chunks
            .iter()
            .filter(|c| c.hierarchy_level == HierarchyLevel::Section)
            .collect();
        assert!(!sections.is_empty());
        for section in sections {
            // title line, blank line, preview
            assert!(section.content.contains("\n\n"));
            assert!(section.content.len() <= 1000 + 200);
        }
    }

    #[test]
    fn test_short_paragraphs_skipped() {
        let text = format!(
            "# Title\n\ntiny\n\n{}\n",
            "A paragraph big enough to be kept around for the assertions. ".repeat(3)
        );
        let chunks = segment(&text, 2000);
        for chunk in chunks
            .iter()
            .filter(|c| c.hierarchy_level == HierarchyLevel::Paragraph)
        {
            assert!(chunk.content.len() >= MIN_PARAGRAPH_LENGTH);
        }
    }

    #[test]
    fn test_leaves_for_long_paragraphs() {
        let long_paragraph =
            "One more sentence flows into the next without a break. ".repeat(40);
        let text = format!("# Only Section\n\n{long_paragraph}");
        let chunks = segment(&text, 300);
        let leaves: Vec<_> = chunks
            .iter()
            .filter(|c| c.hierarchy_level == HierarchyLevel::Leaf)
            .collect();
        assert!(!leaves.is_empty(), "expected leaf chunks");
        let parent_level = |id: ChunkId| {
            chunks
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.hierarchy_level)
        };
        for leaf in &leaves {
            assert!(leaf.content.len() >= SegmenterConfig::default().min_leaf_length);
            assert_eq!(
                parent_level(leaf.parent_id.unwrap()),
                Some(HierarchyLevel::Paragraph)
            );
        }
    }

    #[test]
    fn test_duplicate_paragraphs_skipped() {
        let repeated = "This exact paragraph repeats verbatim several times over. "
            .repeat(9)
            .trim()
            .to_string();
        let text = format!("# Title\n\n{repeated}\n\n{repeated}\n\n{repeated}\n");
        let chunks = segment(&text, 4000);
        let occurrences = chunks
            .iter()
            .filter(|c| c.hierarchy_level == HierarchyLevel::Paragraph)
            .filter(|c| c.content == repeated)
            .count();
        assert_eq!(occurrences, 1, "verbatim repeats must be deduplicated");
    }

    #[test]
    fn test_budget_truncation_is_not_an_error() {
        let config = SegmenterConfig::default().with_max_chunks(6);
        let strategy = SemanticStrategy::new(config);
        let chunks: Vec<_> = strategy
            .segment(&structured_text(), &SegmentParams { max_length: 300 })
            .unwrap()
            .collect();
        assert!(chunks.len() <= 6);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_spans_within_bounds() {
        let text = structured_text();
        let chunks = segment(&text, 400);
        for chunk in &chunks {
            assert!(chunk.start_char <= chunk.end_char);
            assert!(chunk.end_char <= text.len());
        }
    }

    #[test]
    fn test_lazy_early_stop() {
        let strategy = SemanticStrategy::new(SegmenterConfig::default());
        let text = structured_text();
        let mut stream = strategy
            .segment(&text, &SegmentParams { max_length: 300 })
            .unwrap();
        // pulling a prefix must not require draining the document
        let first_three: Vec<_> = stream.by_ref().take(3).collect();
        assert_eq!(first_three.len(), 3);
        assert_eq!(first_three[0].hierarchy_level, HierarchyLevel::Root);
    }
}
