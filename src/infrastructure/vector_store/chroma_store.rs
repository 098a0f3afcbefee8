use async_trait::async_trait;
use serde_json::{Value, json};

use crate::application::ports::{
    RecordBatch, ScoredRecord, StorageError, StoredRecord, VectorStore,
};
use crate::domain::value_objects::MetadataMap;
use crate::infrastructure::vector_store::chroma_client::{
    ChromaClient, ChromaGetResult, ChromaQueryResult,
};

/// `VectorStore` adapter over the Chroma HTTP client. Collections are
/// created with cosine similarity space; record ids key the upserts, so
/// the store's own concurrency control covers concurrent ingest calls.
pub struct ChromaStore {
    client: ChromaClient,
}

impl ChromaStore {
    pub fn new(client: ChromaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn get_or_create_collection(&self, name: &str) -> Result<String, StorageError> {
        let info = self
            .client
            .get_or_create_collection(name, Some(json!({ "hnsw:space": "cosine" })))
            .await?;
        Ok(info.id)
    }

    async fn upsert(&self, collection_id: &str, batch: RecordBatch) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }

        let metadatas = batch
            .metadatas
            .iter()
            .map(|metadata| {
                serde_json::to_value(metadata)
                    .map_err(|e| StorageError::InvalidInput(e.to_string()))
            })
            .collect::<Result<Vec<Value>, StorageError>>()?;

        self.client
            .upsert(
                collection_id,
                batch.ids,
                batch.documents,
                batch.embeddings,
                metadatas,
            )
            .await
    }

    async fn query(
        &self,
        collection_id: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredRecord>, StorageError> {
        let result = self.client.query(collection_id, embedding, k).await?;
        Ok(scored_records(result))
    }

    async fn get(
        &self,
        collection_id: &str,
        ids: &[String],
    ) -> Result<Vec<StoredRecord>, StorageError> {
        let result = self.client.get(collection_id, ids).await?;
        Ok(stored_records(result))
    }
}

fn scored_records(result: ChromaQueryResult) -> Vec<ScoredRecord> {
    // One query embedding in, so only the first inner sequence matters.
    let ids = result.ids.into_iter().next().unwrap_or_default();
    let documents = result
        .documents
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default();
    let metadatas = result
        .metadatas
        .and_then(|m| m.into_iter().next())
        .unwrap_or_default();
    let distances = result
        .distances
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default();

    ids.into_iter()
        .enumerate()
        .map(|(i, id)| ScoredRecord {
            id,
            document: documents
                .get(i)
                .and_then(|d| d.clone())
                .unwrap_or_default(),
            metadata: metadatas
                .get(i)
                .and_then(|m| m.as_ref())
                .map(MetadataMap::from_json_object)
                .unwrap_or_default(),
            distance: distances.get(i).copied().unwrap_or(f32::MAX),
        })
        .collect()
}

fn stored_records(result: ChromaGetResult) -> Vec<StoredRecord> {
    let documents = result.documents.unwrap_or_default();
    let embeddings = result.embeddings.unwrap_or_default();
    let metadatas = result.metadatas.unwrap_or_default();

    result
        .ids
        .into_iter()
        .enumerate()
        .map(|(i, id)| StoredRecord {
            id,
            document: documents.get(i).and_then(|d| d.clone()),
            vector: embeddings.get(i).and_then(|e| e.clone()),
            metadata: metadatas
                .get(i)
                .and_then(|m| m.as_ref())
                .map(MetadataMap::from_json_object),
        })
        .collect()
}
