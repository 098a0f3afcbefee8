use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::Chunk;
use crate::domain::value_objects::MetadataMap;

/// The embedding produced for exactly one chunk, denormalized into a flat
/// record: the persistence layer stores rows, not a graph, so the chunk's
/// content, ordinal, chain neighbours, and document identity are copied in.
/// Write-once; exactly one per chunk after a successful dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    chunk_id: Uuid,
    vector: Vec<f32>,
    model_id: String,
    approx_tokens: usize,
    content: String,
    ordinal: usize,
    previous_chunk_id: Option<Uuid>,
    next_chunk_id: Option<Uuid>,
    document_uid: String,
    document_url: String,
    metadata: MetadataMap,
    generated_at: DateTime<Utc>,
}

impl Embedding {
    pub fn new(chunk: &Chunk, vector: Vec<f32>, model_id: String, approx_tokens: usize) -> Self {
        Self {
            chunk_id: chunk.chunk_id(),
            vector,
            model_id,
            approx_tokens,
            content: chunk.content().to_string(),
            ordinal: chunk.ordinal(),
            previous_chunk_id: chunk.previous_chunk_id(),
            next_chunk_id: chunk.next_chunk_id(),
            document_uid: chunk.document_uid().to_string(),
            document_url: chunk.source().to_string(),
            metadata: chunk.metadata().clone(),
            generated_at: Utc::now(),
        }
    }

    pub fn chunk_id(&self) -> Uuid {
        self.chunk_id
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn approx_tokens(&self) -> usize {
        self.approx_tokens
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn previous_chunk_id(&self) -> Option<Uuid> {
        self.previous_chunk_id
    }

    pub fn next_chunk_id(&self) -> Option<Uuid> {
        self.next_chunk_id
    }

    pub fn document_uid(&self) -> &str {
        &self.document_uid
    }

    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    pub fn belongs_to_chunk(&self, chunk_id: Uuid) -> bool {
        self.chunk_id == chunk_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DocumentContent;

    #[test]
    fn test_embedding_denormalizes_chunk_fields() {
        let document = DocumentContent::new(
            "doc-1".to_string(),
            "https://example.com/".to_string(),
            "/pages/example".to_string(),
            String::new(),
            "text/html".to_string(),
            MetadataMap::new(),
        );
        let previous = Uuid::new_v4();
        let chunk = Chunk::new(
            &document,
            Uuid::new_v4(),
            1,
            "slice text".to_string(),
            Some(previous),
            None,
        );

        let embedding = Embedding::new(&chunk, vec![0.1, 0.2, 0.3], "test-model".to_string(), 3);

        assert!(embedding.belongs_to_chunk(chunk.chunk_id()));
        assert_eq!(embedding.dimension(), 3);
        assert_eq!(embedding.content(), "slice text");
        assert_eq!(embedding.ordinal(), 1);
        assert_eq!(embedding.previous_chunk_id(), Some(previous));
        assert_eq!(embedding.next_chunk_id(), None);
        assert_eq!(embedding.document_uid(), "doc-1");
        assert_eq!(embedding.document_url(), "https://example.com/");
        assert_eq!(embedding.model_id(), "test-model");
    }
}
