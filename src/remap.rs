//! Translation of run-local chunk ids into durable storage keys.
//!
//! The core assigns sequential, run-local ids; durable identity belongs to
//! the persistence layer. This table is how that layer records its mapping
//! while draining a chunk sequence, so `parent_id` references can be
//! rewritten to durable keys.

use std::collections::HashMap;

use crate::types::{Chunk, ChunkId};

/// Mapping from run-local [`ChunkId`]s to durable keys of type `K`.
///
/// Populated by the consuming layer in emission order; since parents are
/// always emitted before children, a chunk's parent key is present by the
/// time the chunk itself is processed.
#[derive(Debug, Clone)]
pub struct DurableIdMap<K> {
    map: HashMap<ChunkId, K>,
}

impl<K> DurableIdMap<K> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Record the durable key for a run-local id. Returns the previous key
    /// if one was already recorded.
    pub fn insert(&mut self, local: ChunkId, durable: K) -> Option<K> {
        self.map.insert(local, durable)
    }

    /// Durable key for a run-local id.
    pub fn get(&self, local: ChunkId) -> Option<&K> {
        self.map.get(&local)
    }

    /// Durable key of a chunk's parent, if the parent has been recorded.
    pub fn parent_key(&self, chunk: &Chunk) -> Option<&K> {
        chunk.parent_id.and_then(|parent| self.get(parent))
    }

    /// Number of recorded mappings.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no mappings have been recorded.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K> Default for DurableIdMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Segmenter;
    use uuid::Uuid;

    #[test]
    fn test_emission_order_resolves_parents() {
        let segmenter = Segmenter::default();
        let mut text = String::new();
        for i in 0..5 {
            text.push_str(&format!(
                "# Part {i}\n\nBody paragraph {i} with enough text to be kept as a chunk. {}\n\n",
                "More sentences pad the paragraph out to a useful size. ".repeat(3)
            ));
        }

        let mut map: DurableIdMap<Uuid> = DurableIdMap::new();
        for chunk in segmenter.segment(&text, 400) {
            if let Some(parent) = chunk.parent_id {
                assert!(
                    map.get(parent).is_some(),
                    "parent {parent} must be recorded before its child"
                );
            }
            let durable = Uuid::new_v4();
            assert!(map.insert(chunk.id, durable).is_none());
            assert_eq!(map.parent_key(&chunk).is_some(), chunk.parent_id.is_some());
        }
        assert!(!map.is_empty());
    }

    #[test]
    fn test_missing_parent_is_none() {
        let map: DurableIdMap<String> = DurableIdMap::new();
        let chunk = Chunk::new(
            ChunkId(7),
            "x".to_string(),
            crate::types::HierarchyLevel::Section,
            0,
            1,
            Some(ChunkId(3)),
        );
        assert!(map.parent_key(&chunk).is_none());
        assert_eq!(map.len(), 0);
    }
}
