use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A contiguous slice of a document.
///
/// `range` is in bytes of the source text; chunk sizes are counted in
/// characters so a UTF-8 sequence is never split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// 0-based position
    pub index: usize,
    pub total: usize,
    pub range: Range<usize>,
    pub text: String,
}

impl DocumentChunk {
    /// 1-based position, as used in prompts
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split `text` into chunks of exactly `chunk_size` characters, the last one
/// holding the remainder. A zero chunk size is treated as one.
///
/// Empty text yields no chunks.
pub fn split_chunks(text: &str, chunk_size: usize) -> Vec<DocumentChunk> {
    let chunk_size = chunk_size.max(1);

    let mut bounds = Vec::new();
    let mut start = 0;
    for (count, (offset, _)) in text.char_indices().enumerate() {
        if count > 0 && count % chunk_size == 0 {
            bounds.push(start..offset);
            start = offset;
        }
    }
    if start < text.len() {
        bounds.push(start..text.len());
    }

    let total = bounds.len();
    bounds
        .into_iter()
        .enumerate()
        .map(|(index, range)| DocumentChunk {
            index,
            total,
            text: text[range.clone()].to_string(),
            range,
        })
        .collect()
}

/// Whether `text` has to be chunked at all
pub fn needs_chunking(text: &str, chunk_size: usize) -> bool {
    text.chars().count() > chunk_size.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejoin(chunks: &[DocumentChunk]) -> String {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_fifteen_by_ten() {
        let text = "abcdefghijklmno";
        let chunks = split_chunks(text, 10);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "abcdefghij");
        assert_eq!(chunks[1].text, "klmno");
        assert_eq!(chunks[1].total, 2);
        assert_eq!(chunks[1].number(), 2);
        assert_eq!(rejoin(&chunks), text);
    }

    #[test]
    fn test_even_division() {
        let text = "a".repeat(30);
        let chunks = split_chunks(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.char_len() == 10));
    }

    #[test]
    fn test_coverage_for_many_sizes() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(7);
        let len = text.chars().count();

        for size in 1..=len + 3 {
            let chunks = split_chunks(&text, size);
            assert_eq!(rejoin(&chunks), text, "size {}", size);

            let (last, rest) = chunks.split_last().unwrap();
            assert!(rest.iter().all(|c| c.char_len() == size));
            let expected_last = if len % size == 0 { size.min(len) } else { len % size };
            assert_eq!(last.char_len(), expected_last, "size {}", size);
        }
    }

    #[test]
    fn test_multibyte_characters_are_not_split() {
        let text = "héllo wörld ünïcode 日本語テキスト";
        let chunks = split_chunks(text, 4);

        assert_eq!(rejoin(&chunks), text);
        for chunk in &chunks {
            assert_eq!(&text[chunk.range.clone()], chunk.text);
            assert!(chunk.char_len() <= 4);
        }
    }

    #[test]
    fn test_empty_and_short_text() {
        assert!(split_chunks("", 10).is_empty());
        assert_eq!(split_chunks("short", 10).len(), 1);
        assert!(!needs_chunking("short", 10));
        assert!(!needs_chunking("0123456789", 10));
        assert!(needs_chunking("0123456789x", 10));
    }

    #[test]
    fn test_zero_chunk_size_is_one() {
        assert_eq!(split_chunks("abc", 0).len(), 3);
    }
}
