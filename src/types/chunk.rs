//! Chunk type definitions.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a chunk, unique within a single segmentation run.
///
/// Ids are sequential and carry no durable meaning. The persistence layer is
/// expected to replace them with its own keys and remap `parent_id`
/// references accordingly (see [`crate::remap::DurableIdMap`]).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChunkId(pub u64);

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position of a chunk in the four-level segmentation tree.
///
/// Serialized as the bare integer (0-3) expected by downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HierarchyLevel {
    /// Document root / summary
    Root = 0,
    /// Titled section with a bounded content preview
    Section = 1,
    /// Raw paragraph content
    Paragraph = 2,
    /// Fine-grained overlapping fragment of a long paragraph
    Leaf = 3,
}

impl HierarchyLevel {
    /// Numeric level, 0-3.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse a numeric level back into the enum.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Root),
            1 => Some(Self::Section),
            2 => Some(Self::Paragraph),
            3 => Some(Self::Leaf),
            _ => None,
        }
    }
}

impl Serialize for HierarchyLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for HierarchyLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hierarchy level {value}")))
    }
}

/// A fragment of the source text, the sole output entity of the pipeline.
///
/// Chunks are immutable once yielded. `start_char` and `end_char` bound the
/// *source span* in the original input; for derived content (the root
/// summary, section previews) the span is wider than `content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Run-local identifier
    pub id: ChunkId,

    /// The text payload of the chunk
    pub content: String,

    /// Level in the segmentation tree (0 = root .. 3 = leaf)
    pub hierarchy_level: HierarchyLevel,

    /// Start offset of the source span in the original text
    pub start_char: usize,

    /// End offset (exclusive) of the source span in the original text
    pub end_char: usize,

    /// Id of the parent chunk, emitted strictly earlier; `None` for the root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ChunkId>,
}

impl Chunk {
    /// Create a new chunk with the given parameters.
    pub fn new(
        id: ChunkId,
        content: String,
        hierarchy_level: HierarchyLevel,
        start_char: usize,
        end_char: usize,
        parent_id: Option<ChunkId>,
    ) -> Self {
        Self {
            id,
            content,
            hierarchy_level,
            start_char,
            end_char,
            parent_id,
        }
    }

    /// Length of the chunk content in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check if the chunk content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Length of the source span this chunk covers.
    pub fn span_len(&self) -> usize {
        self.end_char - self.start_char
    }

    /// Whether this is the document root.
    pub fn is_root(&self) -> bool {
        self.hierarchy_level == HierarchyLevel::Root
    }
}
