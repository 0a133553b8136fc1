//! Word-window text chunking for document ingestion.

/// Splits text into overlapping word windows.
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Create a chunker with the given window size and overlap, in words.
    /// An overlap equal to or larger than the window is clamped so the
    /// window always advances.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    /// Chunk `text` into overlapping windows. Empty or whitespace-only
    /// input yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();

        for i in (0..words.len()).step_by(step) {
            let end = (i + self.chunk_size).min(words.len());
            chunks.push(words[i..end].join(" "));
            if end == words.len() {
                break;
            }
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_short_text_is_single_chunk() {
        let chunker = TextChunker::new(100, 20);
        let chunks = chunker.chunk("a short sentence");
        assert_eq!(chunks, vec!["a short sentence".to_string()]);
    }

    #[test]
    fn test_chunk_empty_text() {
        let chunker = TextChunker::new(100, 20);
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\t ").is_empty());
    }

    #[test]
    fn test_chunk_overlap() {
        let chunker = TextChunker::new(4, 2);
        let chunks = chunker.chunk("one two three four five six");

        assert_eq!(chunks[0], "one two three four");
        assert_eq!(chunks[1], "three four five six");
    }

    #[test]
    fn test_chunk_overlap_clamped() {
        // Overlap >= size must not stall the window
        let chunker = TextChunker::new(2, 5);
        let chunks = chunker.chunk("a b c d");
        assert!(chunks.len() >= 2);
        assert_eq!(chunks[0], "a b");
    }

    #[test]
    fn test_chunk_covers_all_words() {
        let chunker = TextChunker::new(3, 1);
        let text = "w0 w1 w2 w3 w4 w5 w6 w7";
        let chunks = chunker.chunk(text);

        let joined = chunks.join(" ");
        for word in text.split_whitespace() {
            assert!(joined.contains(word));
        }
        // Last chunk ends with the final word
        assert!(chunks.last().unwrap().ends_with("w7"));
    }
}
