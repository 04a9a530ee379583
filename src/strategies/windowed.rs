//! Windowed fallback segmentation.
//!
//! Used when the semantic strategy fails to plan. Emits the root and then
//! fixed-size windows with a small overlap, cutting at sentence ends or, at
//! worst, at the nearest space so no word is split.

use tracing::debug;

use super::{ChunkStream, RunState, SegmentParams, SegmentationStrategy};
use crate::boundaries::{
    ceil_char_boundary, floor_char_boundary, rfind_sentence_end, rfind_space,
    trimmed_with_offsets,
};
use crate::error::SegmentError;
use crate::types::{Chunk, ChunkId, HierarchyLevel, SegmenterConfig};

/// Root content takes at most this many characters.
const ROOT_CONTENT_MAX: usize = 1000;

/// Overlap between consecutive windows is capped here.
const MAX_WINDOW_OVERLAP: usize = 100;

/// The fallback strategy: one root plus flat level-1 windows.
pub struct WindowedStrategy {
    config: SegmenterConfig,
}

impl WindowedStrategy {
    /// Create a windowed strategy.
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }
}

impl SegmentationStrategy for WindowedStrategy {
    fn name(&self) -> &'static str {
        "windowed"
    }

    fn description(&self) -> &'static str {
        "Fixed-size windowed segmentation with sentence-aware cuts"
    }

    fn segment<'a>(
        &self,
        text: &'a str,
        params: &SegmentParams,
    ) -> Result<ChunkStream<'a>, SegmentError> {
        if text.is_empty() {
            return Err(SegmentError::StrategyFailure {
                strategy: self.name(),
                reason: "empty text reached the windowed strategy".to_string(),
            });
        }
        let effective_length = (2 * params.max_length).min(self.config.max_chunk_size).max(1);
        debug!(effective_length, "windowed plan ready");
        Ok(Box::new(WindowedStream {
            text,
            run: RunState::new(self.config.max_chunks),
            root_id: None,
            pos: 0,
            effective_length,
            overlap: MAX_WINDOW_OVERLAP.min(effective_length / 10),
            max_length: params.max_length,
            done: false,
        }))
    }
}

/// Lazy window sequence over one document.
struct WindowedStream<'a> {
    text: &'a str,
    run: RunState,
    root_id: Option<ChunkId>,
    pos: usize,
    effective_length: usize,
    overlap: usize,
    max_length: usize,
    done: bool,
}

impl<'a> Iterator for WindowedStream<'a> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.done {
            return None;
        }

        if self.root_id.is_none() {
            let end = floor_char_boundary(self.text, ROOT_CONTENT_MAX.min(self.text.len()));
            let chunk = self.run.admit(
                self.text[..end].to_string(),
                HierarchyLevel::Root,
                0,
                self.text.len(),
                None,
            );
            match chunk {
                Some(chunk) => {
                    self.root_id = Some(chunk.id);
                    // short documents stop at the root
                    if self.text.len() <= self.max_length + self.max_length / 2 {
                        self.done = true;
                    } else {
                        self.pos = end;
                    }
                    return Some(chunk);
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
        }

        while self.pos < self.text.len() {
            let start = self.pos;
            let raw_end = floor_char_boundary(self.text, start + self.effective_length)
                .max(ceil_char_boundary(self.text, start + 1));
            let end = if raw_end >= self.text.len() {
                self.text.len()
            } else {
                let window_floor = start + (raw_end - start) / 2;
                rfind_sentence_end(self.text, window_floor, raw_end)
                    .or_else(|| rfind_space(self.text, window_floor, raw_end))
                    .unwrap_or(raw_end)
            };

            // advance before emitting so a skipped duplicate cannot stall
            if end >= self.text.len() {
                self.done = true;
            } else {
                let next = end.saturating_sub(self.overlap).max(start + 1);
                self.pos = ceil_char_boundary(self.text, next);
            }

            if let Some((content, start_char, end_char)) =
                trimmed_with_offsets(&self.text[start..end], start)
            {
                if let Some(chunk) = self.run.admit(
                    content,
                    HierarchyLevel::Section,
                    start_char,
                    end_char,
                    self.root_id,
                ) {
                    return Some(chunk);
                }
                if self.run.remaining() == 0 {
                    self.done = true;
                    return None;
                }
            }
            if self.done {
                return None;
            }
        }

        self.done = true;
        None
    }
}
