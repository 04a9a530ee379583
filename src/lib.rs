//! Hierarchical Text Segmentation Library
//!
//! Turns arbitrarily long plain text into a bounded, four-level tree of
//! overlapping chunks suitable for embedding and vector retrieval. The
//! pipeline is heuristic and total: structure-aware segmentation degrades to
//! windowed splitting, which degrades to a single truncated chunk, so a
//! caller always receives at least one chunk.
//!
//! The core receives a string and a target chunk length and returns a lazy,
//! parent-before-child sequence of chunk descriptors. File-format
//! extraction, embedding, persistence, and serving all live upstream or
//! downstream of this crate.

pub mod boundaries;
pub mod error;
pub mod pipeline;
pub mod preview;
pub mod remap;
pub mod strategies;
pub mod types;

pub use error::SegmentError;
pub use pipeline::{Chunks, Segmenter, EMPTY_TEXT_PLACEHOLDER};
pub use preview::{KeywordSalience, PreviewSummarizer, Salience};
pub use remap::DurableIdMap;
pub use strategies::{
    ChunkStream, SegmentParams, SegmentationStrategy, SemanticStrategy, WindowedStrategy,
};
pub use types::{Chunk, ChunkId, HierarchyLevel, SegmenterConfig};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::pipeline::{Chunks, Segmenter};
    pub use crate::strategies::{SegmentParams, SegmentationStrategy};
    pub use crate::types::{Chunk, ChunkId, HierarchyLevel, SegmenterConfig};
}

/// Default target chunk length in characters, used when a caller passes an
/// invalid one
pub const DEFAULT_MAX_LENGTH: usize = 1000;

/// Hard ceiling on the length of any single chunk
pub const MAX_CHUNK_SIZE: usize = 8000;

/// Hard ceiling on the number of chunks emitted in one run
pub const MAX_CHUNKS: usize = 5000;

/// Inputs longer than this are truncated before segmentation
pub const MAX_TEXT_LENGTH: usize = 20_000_000;

/// Texts longer than this skip the fine-grained leaf tier in favor of
/// breadth of coverage
pub const LARGE_TEXT_THRESHOLD: usize = 5_000_000;

/// Minimum length of a level-3 leaf chunk
pub const MIN_LEAF_LENGTH: usize = 200;

/// Maximum number of level-3 leaves produced from one paragraph
pub const MAX_LEAF_CHUNKS: usize = 100;
