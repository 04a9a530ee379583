//! Overlapping, boundary-aware leaf chunks over one long paragraph.

use super::{
    ceil_char_boundary, floor_char_boundary, rfind_paragraph_break, rfind_sentence_end,
    trimmed_with_offsets,
};

/// Texts longer than this many windows get the small relative overlap.
const LONG_TEXT_WINDOWS: usize = 20;

/// A leaf-sized piece of a long paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafPiece {
    /// Trimmed piece text
    pub content: String,
    /// Start offset in the document
    pub start_char: usize,
    /// End offset (exclusive) in the document
    pub end_char: usize,
}

/// Splits one long paragraph into overlapping leaf chunks, cutting at
/// paragraph breaks or sentence ends where possible.
#[derive(Debug, Clone)]
pub struct LeafChunkBuilder {
    /// Hard ceiling on a single piece
    max_chunk_size: usize,
}

impl LeafChunkBuilder {
    /// Create a builder with the given single-chunk ceiling.
    pub fn new(max_chunk_size: usize) -> Self {
        Self {
            max_chunk_size: max_chunk_size.max(1),
        }
    }

    /// Split `text` into at most `max_chunks` pieces of roughly
    /// `max_length` characters with at least `min_overlap` characters of
    /// overlap, offsets translated by `base_offset`.
    pub fn build(
        &self,
        text: &str,
        max_length: usize,
        min_overlap: usize,
        base_offset: usize,
        max_chunks: usize,
    ) -> Vec<LeafPiece> {
        if text.is_empty() || max_chunks == 0 {
            return Vec::new();
        }
        let max_length = max_length.max(1);
        if text.len() <= max_length {
            return trimmed_with_offsets(text, base_offset)
                .map(|(content, start_char, end_char)| {
                    vec![LeafPiece {
                        content,
                        start_char,
                        end_char,
                    }]
                })
                .unwrap_or_default();
        }

        let effective_max = (max_length + max_length / 5).min(self.max_chunk_size).max(1);
        let effective_overlap = if text.len() > effective_max * LONG_TEXT_WINDOWS {
            // very long paragraph: favor coverage over continuity
            min_overlap.min(effective_max / 20)
        } else {
            (max_length / 10).max(min_overlap)
        }
        .min(effective_max / 2);

        let mut pieces = Vec::new();
        let mut start = 0;
        while start < text.len() && pieces.len() < max_chunks {
            let raw_end = floor_char_boundary(text, start + effective_max)
                .max(ceil_char_boundary(text, start + 1));
            let end = if raw_end >= text.len() {
                text.len()
            } else {
                // prefer a paragraph break, then a sentence end, past 30% of
                // the window
                let window_floor = start + (raw_end - start) * 3 / 10;
                rfind_paragraph_break(text, window_floor, raw_end)
                    .or_else(|| rfind_sentence_end(text, window_floor, raw_end))
                    .unwrap_or(raw_end)
            };

            if let Some((content, start_char, end_char)) =
                trimmed_with_offsets(&text[start..end], base_offset + start)
            {
                pieces.push(LeafPiece {
                    content,
                    start_char,
                    end_char,
                });
            }
            if end >= text.len() {
                break;
            }

            // back off from the cut to a clean overlap boundary
            let overlap_floor = end.saturating_sub(effective_overlap * 2).max(start);
            let next = rfind_sentence_end(text, overlap_floor, end)
                .unwrap_or_else(|| floor_char_boundary(text, end.saturating_sub(effective_overlap)));
            start = ceil_char_boundary(text, next.max(start + 1));
        }

        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_CHUNK_SIZE: usize = 8000;

    fn builder() -> LeafChunkBuilder {
        LeafChunkBuilder::new(MAX_CHUNK_SIZE)
    }

    #[test]
    fn test_short_text_single_piece() {
        let pieces = builder().build("A short paragraph.", 1000, 50, 10, 100);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].content, "A short paragraph.");
        assert_eq!(pieces[0].start_char, 10);
        assert_eq!(pieces[0].end_char, 28);
    }

    #[test]
    fn test_long_text_overlapping_pieces() {
        let text = "Each of these sentences adds a little more content. ".repeat(100);
        let pieces = builder().build(&text, 500, 50, 0, 100);
        assert!(pieces.len() > 1);
        for piece in &pieces {
            assert!(piece.content.len() <= 600 + 1); // 1.2 x max_length
            assert!(piece.end_char <= text.len());
            assert!(piece.start_char < piece.end_char);
        }
        // consecutive pieces overlap: each starts before the previous ends
        for pair in pieces.windows(2) {
            assert!(pair[1].start_char < pair[0].end_char);
            assert!(pair[1].start_char > pair[0].start_char);
        }
        // full coverage up to the last piece
        assert_eq!(pieces.last().unwrap().end_char, text.len() - 1); // trailing space trimmed
    }

    #[test]
    fn test_cuts_prefer_paragraph_breaks() {
        let para = "A sentence inside the block. ".repeat(12);
        let text = format!("{}\n\n{}\n\n{}", para.trim(), para.trim(), para.trim());
        let pieces = builder().build(&text, 400, 40, 0, 100);
        assert!(pieces.len() > 1);
        // first cut lands on the paragraph break, so the piece ends with the
        // block's final sentence
        assert!(pieces[0].content.ends_with('.'));
    }

    #[test]
    fn test_pathological_no_boundaries_terminates() {
        let text = "a".repeat(50_000);
        let pieces = builder().build(&text, 1000, 100, 0, 1000);
        assert!(!pieces.is_empty());
        assert!(pieces.len() < 1000);
        for piece in &pieces {
            assert!(piece.content.len() <= 1200);
        }
        assert_eq!(pieces.last().unwrap().end_char, text.len());
    }

    #[test]
    fn test_max_chunks_cap() {
        let text = "Sentence after sentence marches on. ".repeat(200);
        let pieces = builder().build(&text, 300, 30, 0, 5);
        assert_eq!(pieces.len(), 5);
    }

    #[test]
    fn test_ceiling_bounds_effective_max() {
        let small = LeafChunkBuilder::new(400);
        let text = "Words and more words fill this paragraph to the brim. ".repeat(50);
        let pieces = small.build(&text, 1000, 50, 0, 100);
        for piece in &pieces {
            assert!(piece.content.len() <= 400);
        }
    }

    #[test]
    fn test_multibyte_text_never_splits_a_char() {
        let text = "Ätherische Öle würzen die Gerichte ausgezeichnet. ".repeat(60);
        let pieces = builder().build(&text, 300, 30, 0, 100);
        assert!(pieces.len() > 1);
        for piece in &pieces {
            assert!(!piece.content.is_empty());
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(builder().build("", 1000, 50, 0, 100).is_empty());
        assert!(builder().build("text", 1000, 50, 0, 0).is_empty());
    }
}
