//! Degradation orchestrator and public entry point.
//!
//! The cascade never fails outright: semantic segmentation degrades to
//! windowed splitting, which degrades to a single truncated chunk. The only
//! caller-visible failure mode is a severely under-detailed chunk set, not
//! an error.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::boundaries::floor_char_boundary;
use crate::strategies::{
    ChunkStream, SegmentParams, SegmentationStrategy, SemanticStrategy, WindowedStrategy,
};
use crate::types::{Chunk, ChunkId, HierarchyLevel, SegmenterConfig};

/// Sentinel content emitted for empty input.
pub const EMPTY_TEXT_PLACEHOLDER: &str = "[empty document]";

/// Segments text into a bounded, hierarchical chunk tree.
///
/// Holds no per-call mutable state; one instance can segment independent
/// documents concurrently. Strategies are injectable for tests and
/// experimentation.
pub struct Segmenter {
    config: SegmenterConfig,
    semantic: Arc<dyn SegmentationStrategy>,
    fallback: Arc<dyn SegmentationStrategy>,
}

impl Segmenter {
    /// Create a segmenter with the built-in strategy cascade.
    pub fn new(config: SegmenterConfig) -> Self {
        let config = config.normalized();
        Self {
            semantic: Arc::new(SemanticStrategy::new(config.clone())),
            fallback: Arc::new(WindowedStrategy::new(config.clone())),
            config,
        }
    }

    /// Create a segmenter with custom strategies.
    pub fn with_strategies(
        config: SegmenterConfig,
        semantic: Arc<dyn SegmentationStrategy>,
        fallback: Arc<dyn SegmentationStrategy>,
    ) -> Self {
        Self {
            config: config.normalized(),
            semantic,
            fallback,
        }
    }

    /// The configuration this segmenter was built with.
    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Segment `text` into a lazy chunk sequence.
    ///
    /// The sequence yields at least one chunk for every input, root first,
    /// parents before children. Dropping the iterator early stops all
    /// remaining work.
    pub fn segment<'a>(&self, text: &'a str, max_length: usize) -> Chunks<'a> {
        let max_length = self.config.clamp_max_length(max_length);

        if text.is_empty() {
            debug!("empty input, emitting sentinel chunk");
            return Chunks::single(Chunk::new(
                ChunkId(0),
                EMPTY_TEXT_PLACEHOLDER.to_string(),
                HierarchyLevel::Root,
                0,
                0,
                None,
            ));
        }

        let text = if text.len() > self.config.max_text_length {
            let cap = floor_char_boundary(text, self.config.max_text_length);
            warn!(
                len = text.len(),
                max = self.config.max_text_length,
                "input exceeds maximum length, truncating"
            );
            &text[..cap]
        } else {
            text
        };

        if text.len() <= max_length {
            return Chunks::single(Chunk::new(
                ChunkId(0),
                text.to_string(),
                HierarchyLevel::Root,
                0,
                text.len(),
                None,
            ));
        }

        let params = SegmentParams { max_length };
        match self.semantic.segment(text, &params) {
            Ok(stream) => Chunks::stream(stream),
            Err(err) => {
                warn!(
                    strategy = self.semantic.name(),
                    error = %err,
                    "strategy failed, degrading to fallback"
                );
                match self.fallback.segment(text, &params) {
                    Ok(stream) => Chunks::stream(stream),
                    Err(err) => {
                        error!(
                            strategy = self.fallback.name(),
                            error = %err,
                            "all strategies failed, emitting single truncated chunk"
                        );
                        let end = floor_char_boundary(text, max_length.min(text.len()));
                        Chunks::single(Chunk::new(
                            ChunkId(0),
                            text[..end].to_string(),
                            HierarchyLevel::Root,
                            0,
                            end,
                            None,
                        ))
                    }
                }
            }
        }
    }

    /// Drain the lazy sequence into a bounded list.
    ///
    /// A pure convenience over [`segment`](Self::segment) for callers that
    /// need random access; it performs no additional computation.
    pub fn segment_all(&self, text: &str, max_length: usize) -> Vec<Chunk> {
        self.segment(text, max_length).collect()
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(SegmenterConfig::default())
    }
}

/// Lazy chunk sequence returned by [`Segmenter::segment`].
pub struct Chunks<'a> {
    inner: ChunksInner<'a>,
}

enum ChunksInner<'a> {
    Single(std::iter::Once<Chunk>),
    Stream(ChunkStream<'a>),
}

impl<'a> Chunks<'a> {
    fn single(chunk: Chunk) -> Self {
        Self {
            inner: ChunksInner::Single(std::iter::once(chunk)),
        }
    }

    fn stream(stream: ChunkStream<'a>) -> Self {
        Self {
            inner: ChunksInner::Stream(stream),
        }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        match &mut self.inner {
            ChunksInner::Single(once) => once.next(),
            ChunksInner::Stream(stream) => stream.next(),
        }
    }
}
