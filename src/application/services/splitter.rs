use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::{Chunk, DocumentContent};

#[derive(Debug)]
pub enum ChunkingError {
    InvalidParameters(String),
}

impl std::fmt::Display for ChunkingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkingError::InvalidParameters(msg) => write!(f, "Invalid parameters: {}", msg),
        }
    }
}

impl std::error::Error for ChunkingError {}

/// Serializable description of one split run: enough to reproduce the
/// chunk chain without re-fetching or re-splitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitManifest {
    pub document_uid: String,
    pub source: String,
    pub uri: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub chunks: Vec<Chunk>,
}

/// Splits one document into an ordered batch of chunks.
///
/// Boundary-seeking is recursive: paragraph breaks first, then line breaks,
/// sentence ends, word gaps, and finally a hard character cut. Each chunk
/// after the first starts with the `chunk_overlap` trailing characters of
/// its predecessor, and total chunk length never exceeds `chunk_size`.
/// Ordinals and previous/next ids are threaded in a single left-to-right
/// pass; ids are fresh random UUIDs, never derived from content, so
/// identical text at different ordinals cannot collide in the store.
pub struct ContentSplitter {
    document: DocumentContent,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<&'static str>,
    chunks: Vec<Chunk>,
}

impl ContentSplitter {
    pub fn new(document: DocumentContent, chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            document,
            chunk_size,
            chunk_overlap,
            separators: vec!["\n\n", "\n", ". ", " ", ""],
            chunks: Vec::new(),
        }
    }

    pub fn document(&self) -> &DocumentContent {
        &self.document
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Splits the document. Re-splitting the same instance discards the
    /// previous result with a warning; it is not an error. Content that is
    /// empty after trimming yields an empty batch.
    pub fn split(&mut self) -> Result<&[Chunk], ChunkingError> {
        if self.chunk_size == 0 {
            return Err(ChunkingError::InvalidParameters(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ChunkingError::InvalidParameters(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        if !self.chunks.is_empty() {
            warn!(
                document_uid = %self.document.uid(),
                discarded = self.chunks.len(),
                "re-splitting document, discarding previous chunks"
            );
            self.chunks.clear();
        }

        let content = self.document.content().trim();
        if content.is_empty() {
            return Ok(&self.chunks);
        }

        // Fresh text per chunk is bounded by chunk_size - chunk_overlap so
        // that prefixing the neighbour overlap stays within chunk_size.
        let stride = self.chunk_size - self.chunk_overlap;
        let pieces = self.split_text(content, stride);

        let mut contents: Vec<String> = Vec::with_capacity(pieces.len());
        for (index, piece) in pieces.into_iter().enumerate() {
            if index == 0 || self.chunk_overlap == 0 {
                contents.push(piece);
            } else {
                let overlap = tail_chars(&contents[index - 1], self.chunk_overlap);
                contents.push(format!("{}{}", overlap, piece));
            }
        }

        let ids: Vec<Uuid> = contents.iter().map(|_| Uuid::new_v4()).collect();
        self.chunks = contents
            .into_iter()
            .enumerate()
            .map(|(ordinal, content)| {
                let previous = (ordinal > 0).then(|| ids[ordinal - 1]);
                let next = (ordinal + 1 < ids.len()).then(|| ids[ordinal + 1]);
                Chunk::new(&self.document, ids[ordinal], ordinal, content, previous, next)
            })
            .collect();

        Ok(&self.chunks)
    }

    pub fn manifest(&self) -> SplitManifest {
        SplitManifest {
            document_uid: self.document.uid().to_string(),
            source: self.document.source().to_string(),
            uri: self.document.uri().to_string(),
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            chunks: self.chunks.clone(),
        }
    }

    fn split_text(&self, text: &str, max_piece_size: usize) -> Vec<String> {
        if char_len(text) <= max_piece_size {
            return vec![text.to_string()];
        }
        self.recursive_split(text, max_piece_size, 0)
    }

    fn recursive_split(
        &self,
        text: &str,
        max_piece_size: usize,
        separator_index: usize,
    ) -> Vec<String> {
        if char_len(text) <= max_piece_size {
            return vec![text.to_string()];
        }

        if separator_index >= self.separators.len() {
            return split_by_length(text, max_piece_size);
        }

        let separator = self.separators[separator_index];
        if separator.is_empty() {
            return split_by_length(text, max_piece_size);
        }

        let parts: Vec<&str> = text.split(separator).collect();
        if parts.len() == 1 {
            return self.recursive_split(text, max_piece_size, separator_index + 1);
        }

        let mut pieces = Vec::new();
        let mut current = String::new();

        for part in parts {
            let candidate = if current.is_empty() {
                part.to_string()
            } else {
                format!("{}{}{}", current, separator, part)
            };

            if char_len(&candidate) <= max_piece_size {
                current = candidate;
            } else {
                if !current.is_empty() {
                    pieces.push(current);
                }
                current = part.to_string();

                if char_len(&current) > max_piece_size {
                    let sub_pieces =
                        self.recursive_split(&current, max_piece_size, separator_index + 1);
                    pieces.extend(sub_pieces);
                    current = String::new();
                }
            }
        }

        if !current.is_empty() {
            pieces.push(current);
        }

        pieces
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn tail_chars(text: &str, n: usize) -> String {
    let len = char_len(text);
    if len <= n {
        return text.to_string();
    }
    text.chars().skip(len - n).collect()
}

fn split_by_length(text: &str, max_piece_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + max_piece_size).min(chars.len());
        pieces.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start = end;
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::MetadataMap;

    fn document_with(content: &str) -> DocumentContent {
        DocumentContent::new(
            "doc-1".to_string(),
            "https://example.com/blog/".to_string(),
            "/pages/blog".to_string(),
            content.to_string(),
            "text/html".to_string(),
            MetadataMap::new(),
        )
    }

    fn assert_valid_chain(chunks: &[Chunk]) {
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.ordinal(), i);
        }
        if let Some(first) = chunks.first() {
            assert_eq!(first.previous_chunk_id(), None);
        }
        if let Some(last) = chunks.last() {
            assert_eq!(last.next_chunk_id(), None);
        }
        for window in chunks.windows(2) {
            assert_eq!(window[0].next_chunk_id(), Some(window[1].chunk_id()));
            assert_eq!(window[1].previous_chunk_id(), Some(window[0].chunk_id()));
        }
    }

    #[test]
    fn test_empty_content_yields_empty_batch() {
        let mut splitter = ContentSplitter::new(document_with(""), 1024, 128);
        let chunks = splitter.split().unwrap();
        assert!(chunks.is_empty());

        let mut whitespace = ContentSplitter::new(document_with("  \n\t "), 1024, 128);
        assert!(whitespace.split().unwrap().is_empty());
    }

    #[test]
    fn test_short_content_yields_single_chunk() {
        let mut splitter = ContentSplitter::new(document_with("Short text."), 1024, 128);
        let chunks = splitter.split().unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content(), "Short text.");
        assert_valid_chain(chunks);
    }

    #[test]
    fn test_hard_cut_chunk_count() {
        // 2 * chunk_size + 10 characters with no boundaries and no overlap
        // must fall back to hard cuts: exactly three chunks.
        let content = "x".repeat(2 * 1024 + 10);
        let mut splitter = ContentSplitter::new(document_with(&content), 1024, 0);
        let chunks = splitter.split().unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].character_count(), 1024);
        assert_eq!(chunks[1].character_count(), 1024);
        assert_eq!(chunks[2].character_count(), 10);
        assert_valid_chain(chunks);
    }

    #[test]
    fn test_chain_links_follow_ordinals() {
        let paragraphs: Vec<String> = (0..20)
            .map(|i| format!("Paragraph number {} with a little bit of text.", i))
            .collect();
        let content = paragraphs.join("\n\n");
        let mut splitter = ContentSplitter::new(document_with(&content), 120, 20);
        let chunks = splitter.split().unwrap();

        assert!(chunks.len() > 1);
        assert_valid_chain(chunks);
    }

    #[test]
    fn test_chunks_bounded_by_chunk_size_with_overlap_retained() {
        let content = "word ".repeat(500);
        let mut splitter = ContentSplitter::new(document_with(&content), 100, 25);
        let chunks = splitter.split().unwrap().to_vec();

        for chunk in &chunks {
            assert!(chunk.character_count() <= 100);
        }
        for window in chunks.windows(2) {
            let overlap = tail_chars(window[0].content(), 25);
            assert!(window[1].content().starts_with(&overlap));
        }
    }

    #[test]
    fn test_resplit_is_idempotent_in_count_and_boundaries() {
        let content = "A sentence here. ".repeat(200);
        let mut splitter = ContentSplitter::new(document_with(&content), 150, 30);

        let first: Vec<String> = splitter
            .split()
            .unwrap()
            .iter()
            .map(|c| c.content().to_string())
            .collect();
        let first_ids: Vec<_> = splitter.chunks().iter().map(|c| c.chunk_id()).collect();

        let second: Vec<String> = splitter
            .split()
            .unwrap()
            .iter()
            .map(|c| c.content().to_string())
            .collect();
        let second_ids: Vec<_> = splitter.chunks().iter().map(|c| c.chunk_id()).collect();

        // Same boundaries, fresh ids.
        assert_eq!(first, second);
        assert_ne!(first_ids, second_ids);
        assert_valid_chain(splitter.chunks());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let mut zero = ContentSplitter::new(document_with("text"), 0, 0);
        assert!(zero.split().is_err());

        let mut overlap_too_big = ContentSplitter::new(document_with("text"), 100, 100);
        assert!(overlap_too_big.split().is_err());
    }

    #[test]
    fn test_manifest_round_trips() {
        let content = "Paragraph one.\n\nParagraph two.\n\nParagraph three.";
        let mut splitter = ContentSplitter::new(document_with(content), 30, 5);
        splitter.split().unwrap();

        let manifest = splitter.manifest();
        let json = serde_json::to_string(&manifest).unwrap();
        let restored: SplitManifest = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.document_uid, "doc-1");
        assert_eq!(restored.chunks.len(), manifest.chunks.len());
        for (a, b) in restored.chunks.iter().zip(manifest.chunks.iter()) {
            assert_eq!(a.chunk_id(), b.chunk_id());
            assert_eq!(a.previous_chunk_id(), b.previous_chunk_id());
            assert_eq!(a.next_chunk_id(), b.next_chunk_id());
        }
    }
}
