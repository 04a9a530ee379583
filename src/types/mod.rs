//! Core types for the segmentation pipeline.

mod chunk;
mod config;

pub use chunk::{Chunk, ChunkId, HierarchyLevel};
pub use config::SegmenterConfig;
