use std::sync::Arc;

use tracing::info;

use crate::application::ports::{RecordBatch, StorageError, VectorStore};
use crate::domain::entities::Embedding;
use crate::domain::value_objects::MetadataMap;

/// Persists one document's embeddings into the vector collection as a
/// single batch upsert keyed by chunk id.
///
/// The batch carries three parallel sequences (ids, documents, vectors)
/// plus one flattened metadata map per record. Optional fields such as the
/// chain neighbours are omitted when absent; the store rejects null-valued
/// keys. Re-ingesting a chunk id overwrites the stored record instead of
/// duplicating it.
pub struct VectorStoreWriter {
    store: Arc<dyn VectorStore>,
    collection: String,
}

impl VectorStoreWriter {
    pub fn new(store: Arc<dyn VectorStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub async fn persist(&self, embeddings: &[Embedding]) -> Result<(), StorageError> {
        if embeddings.is_empty() {
            return Ok(());
        }

        let collection_id = self.store.get_or_create_collection(&self.collection).await?;

        let mut batch = RecordBatch::default();
        for embedding in embeddings {
            batch.ids.push(embedding.chunk_id().to_string());
            batch.documents.push(embedding.content().to_string());
            batch.embeddings.push(embedding.vector().to_vec());
            batch.metadatas.push(record_metadata(embedding));
        }

        self.store.upsert(&collection_id, batch).await?;

        info!(
            collection = %self.collection,
            records = embeddings.len(),
            document_uid = %embeddings[0].document_uid(),
            "embeddings upserted"
        );
        Ok(())
    }
}

/// Flat metadata for one stored record: the chunk's inherited document
/// metadata, the chain keys, and the model bookkeeping. Absent neighbours
/// are left out entirely.
fn record_metadata(embedding: &Embedding) -> MetadataMap {
    let mut metadata = embedding.metadata().clone();
    metadata.insert("document_uid", embedding.document_uid());
    metadata.insert("document_url", embedding.document_url());
    metadata.insert("chunk_id", embedding.chunk_id().to_string());
    metadata.insert("ordinal", embedding.ordinal());
    metadata.insert("model", embedding.model_id());
    metadata.insert("approx_tokens", embedding.approx_tokens());
    metadata.insert_opt(
        "previous",
        embedding.previous_chunk_id().map(|id| id.to_string()),
    );
    metadata.insert_opt("next", embedding.next_chunk_id().map(|id| id.to_string()));
    metadata
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::domain::entities::{Chunk, DocumentContent};

    fn embedding_for(previous: Option<Uuid>, next: Option<Uuid>) -> Embedding {
        let mut doc_metadata = MetadataMap::new();
        doc_metadata.insert("title", "Example");
        // No description: the absent key must stay absent downstream.
        let document = DocumentContent::new(
            "doc-1".to_string(),
            "https://example.com/".to_string(),
            "/pages/example".to_string(),
            String::new(),
            "text/html".to_string(),
            doc_metadata,
        );
        let chunk = Chunk::new(
            &document,
            Uuid::new_v4(),
            1,
            "body".to_string(),
            previous,
            next,
        );
        Embedding::new(&chunk, vec![0.0; 3], "test-model".to_string(), 1)
    }

    #[test]
    fn test_record_metadata_contains_chain_keys() {
        let previous = Uuid::new_v4();
        let embedding = embedding_for(Some(previous), None);
        let metadata = record_metadata(&embedding);

        assert_eq!(
            metadata.get("document_uid").and_then(|v| v.as_str()),
            Some("doc-1")
        );
        assert_eq!(metadata.get("ordinal").and_then(|v| v.as_int()), Some(1));
        assert_eq!(
            metadata.get("previous").and_then(|v| v.as_str()),
            Some(previous.to_string().as_str())
        );
        assert_eq!(
            metadata.get("title").and_then(|v| v.as_str()),
            Some("Example")
        );
    }

    #[test]
    fn test_absent_values_are_omitted_not_null() {
        let embedding = embedding_for(None, None);
        let metadata = record_metadata(&embedding);

        assert!(!metadata.contains_key("previous"));
        assert!(!metadata.contains_key("next"));
        assert!(!metadata.contains_key("description"));

        let json = serde_json::to_string(&metadata).unwrap();
        assert!(!json.contains("null"));
    }
}
