//! Configuration for the segmentation pipeline.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    DEFAULT_MAX_LENGTH, LARGE_TEXT_THRESHOLD, MAX_CHUNKS, MAX_CHUNK_SIZE, MAX_LEAF_CHUNKS,
    MAX_TEXT_LENGTH, MIN_LEAF_LENGTH,
};

/// Default cap on detected sections per document
const DEFAULT_MAX_SECTIONS: usize = 100;

/// Default cap on extracted paragraphs per section
const DEFAULT_MAX_PARAGRAPHS: usize = 200;

/// Immutable tunables for one segmentation pipeline.
///
/// This is a construction-time configuration object, not environment or CLI
/// configuration. Every invocation of a [`crate::pipeline::Segmenter`] built
/// from one of these shares the same limits; per-call variation is limited
/// to the caller's target chunk length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Inputs longer than this are truncated with a warning
    pub max_text_length: usize,

    /// Hard ceiling on the length of any single chunk
    pub max_chunk_size: usize,

    /// Hard ceiling on the number of chunks emitted in one run
    pub max_chunks: usize,

    /// Texts longer than this skip the level-3 leaf tier
    pub large_text_threshold: usize,

    /// Leaf pieces shorter than this are dropped
    pub min_leaf_length: usize,

    /// Cap on level-3 leaves produced from one paragraph
    pub max_leaf_chunks: usize,

    /// Cap on detected sections per document
    pub max_sections: usize,

    /// Cap on extracted paragraphs per section
    pub max_paragraphs: usize,

    /// Target chunk length substituted when the caller passes zero
    pub default_max_length: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_text_length: MAX_TEXT_LENGTH,
            max_chunk_size: MAX_CHUNK_SIZE,
            max_chunks: MAX_CHUNKS,
            large_text_threshold: LARGE_TEXT_THRESHOLD,
            min_leaf_length: MIN_LEAF_LENGTH,
            max_leaf_chunks: MAX_LEAF_CHUNKS,
            max_sections: DEFAULT_MAX_SECTIONS,
            max_paragraphs: DEFAULT_MAX_PARAGRAPHS,
            default_max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl SegmenterConfig {
    /// Set the global chunk budget.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Set the hard ceiling on single-chunk length.
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    /// Set the input truncation threshold.
    pub fn with_max_text_length(mut self, max_text_length: usize) -> Self {
        self.max_text_length = max_text_length;
        self
    }

    /// Set the section cap.
    pub fn with_max_sections(mut self, max_sections: usize) -> Self {
        self.max_sections = max_sections;
        self
    }

    /// Set the per-section paragraph cap.
    pub fn with_max_paragraphs(mut self, max_paragraphs: usize) -> Self {
        self.max_paragraphs = max_paragraphs;
        self
    }

    /// Floor degenerate values so no configuration can produce an empty run.
    pub(crate) fn normalized(mut self) -> Self {
        self.max_chunks = self.max_chunks.max(1);
        self.max_chunk_size = self.max_chunk_size.max(1);
        self.max_text_length = self.max_text_length.max(1);
        self.max_sections = self.max_sections.max(1);
        self.max_paragraphs = self.max_paragraphs.max(1);
        self.default_max_length = self.default_max_length.clamp(1, self.max_chunk_size);
        self
    }

    /// Clamp a caller-provided target length into the valid range.
    ///
    /// Invalid values are not an error: zero falls back to the default and
    /// oversized values clamp to the ceiling, each with a warning.
    pub(crate) fn clamp_max_length(&self, max_length: usize) -> usize {
        if max_length == 0 {
            warn!(
                default = self.default_max_length,
                "invalid max_length 0, falling back to default"
            );
            self.default_max_length
        } else if max_length > self.max_chunk_size {
            warn!(
                requested = max_length,
                ceiling = self.max_chunk_size,
                "max_length exceeds chunk size ceiling, clamping"
            );
            self.max_chunk_size
        } else {
            max_length
        }
    }
}
