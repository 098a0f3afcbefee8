//! Web page ingestion pipeline for retrieval-augmented generation.
//!
//! One ingest call fetches a document, splits it into an ordered batch of
//! overlapping chunks, embeds each chunk through an external model with a
//! bounded worker pool, and upserts the resulting records into a vector
//! collection in a single batch. Retrieval is an independent read path
//! against the same collection.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::ports::{
    ContentFetcher, EmbeddingProvider, FetchRequest, RecordBatch, VectorStore,
};
pub use application::services::{
    ContentSplitter, EmbeddingDispatcher, IngestError, IngestReport, IngestService,
    RetrievalService, VectorStoreWriter,
};
pub use domain::entities::{Chunk, DocumentContent, Embedding};
pub use domain::value_objects::{MetadataMap, MetadataValue};
pub use infrastructure::config::IndexerConfig;
pub use infrastructure::container::PipelineContainer;
