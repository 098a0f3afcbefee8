use async_trait::async_trait;

use crate::domain::value_objects::MetadataMap;

#[derive(Debug)]
pub enum StorageError {
    Http(String),
    InvalidInput(String),
    Deserialize(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Http(msg) => write!(f, "Storage HTTP error: {}", msg),
            StorageError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            StorageError::Deserialize(msg) => write!(f, "Deserialization error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// Three parallel sequences plus one metadata map per record, exactly the
/// shape the store's batch call takes. Metadata maps carry no null values.
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
    pub metadatas: Vec<MetadataMap>,
}

impl RecordBatch {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// One record read back from the store by id.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: String,
    pub document: Option<String>,
    pub vector: Option<Vec<f32>>,
    pub metadata: Option<MetadataMap>,
}

/// One similarity match, distance ascending (smaller is closer).
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub id: String,
    pub document: String,
    pub metadata: MetadataMap,
    pub distance: f32,
}

/// External vector store boundary. Collections key records on id, so
/// upserts are idempotent per id and safe under concurrent ingest calls.
/// No vector dimensionality validation happens here; a mismatch surfaces
/// as an opaque storage error.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates the named collection if absent, configured for cosine
    /// similarity. Returns the store's collection handle.
    async fn get_or_create_collection(&self, name: &str) -> Result<String, StorageError>;

    async fn upsert(&self, collection_id: &str, batch: RecordBatch) -> Result<(), StorageError>;

    async fn query(
        &self,
        collection_id: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredRecord>, StorageError>;

    async fn get(
        &self,
        collection_id: &str,
        ids: &[String],
    ) -> Result<Vec<StoredRecord>, StorageError>;
}
