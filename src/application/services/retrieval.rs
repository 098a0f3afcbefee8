use std::sync::Arc;

use tracing::debug;

use crate::application::ports::{
    EmbeddingProvider, EmbeddingProviderError, StorageError, VectorStore,
};
use crate::domain::value_objects::MetadataMap;

#[derive(Debug)]
pub enum RetrievalError {
    EmbeddingError(EmbeddingProviderError),
    StorageError(StorageError),
}

impl std::fmt::Display for RetrievalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrievalError::EmbeddingError(e) => write!(f, "Query embedding failed: {}", e),
            RetrievalError::StorageError(e) => write!(f, "Similarity query failed: {}", e),
        }
    }
}

impl std::error::Error for RetrievalError {}

/// One retrieved passage, closest first.
#[derive(Debug, Clone)]
pub struct RetrievedPassage {
    pub chunk_id: String,
    pub content: String,
    pub distance: f32,
    pub metadata: MetadataMap,
}

/// Read path against the collection the writer populates: embeds the query
/// text with the same provider and returns the top-k closest chunk
/// documents for downstream prompt augmentation. Performs no generation.
pub struct RetrievalService {
    store: Arc<dyn VectorStore>,
    provider: Arc<dyn EmbeddingProvider>,
    collection: String,
}

impl RetrievalService {
    pub fn new(
        store: Arc<dyn VectorStore>,
        provider: Arc<dyn EmbeddingProvider>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provider,
            collection: collection.into(),
        }
    }

    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        let query_embedding = self
            .provider
            .embed(text)
            .await
            .map_err(RetrievalError::EmbeddingError)?;

        let collection_id = self
            .store
            .get_or_create_collection(&self.collection)
            .await
            .map_err(RetrievalError::StorageError)?;

        let matches = self
            .store
            .query(&collection_id, &query_embedding.vector, k)
            .await
            .map_err(RetrievalError::StorageError)?;

        debug!(collection = %self.collection, k, matches = matches.len(), "similarity query");

        Ok(matches
            .into_iter()
            .map(|record| RetrievedPassage {
                chunk_id: record.id,
                content: record.document,
                distance: record.distance,
                metadata: record.metadata,
            })
            .collect())
    }
}
