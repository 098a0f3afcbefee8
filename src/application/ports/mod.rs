pub mod content_fetcher;
pub mod embedding_provider;
pub mod vector_store;

pub use content_fetcher::{ContentFetcher, FetchError, FetchRequest};
pub use embedding_provider::{EmbeddingProvider, EmbeddingProviderError, EmbeddingVector};
pub use vector_store::{RecordBatch, ScoredRecord, StorageError, StoredRecord, VectorStore};
