use std::sync::Arc;

use crate::application::ports::{ContentFetcher, EmbeddingProvider, VectorStore};
use crate::application::services::{
    EmbeddingDispatcher, IngestService, RetrievalService, VectorStoreWriter,
};
use crate::infrastructure::artifacts::ArtifactWriter;
use crate::infrastructure::config::IndexerConfig;
use crate::infrastructure::external_services::{OllamaClient, WebPageFetcher};
use crate::infrastructure::vector_store::{ChromaClient, ChromaStore};

/// Wires the concrete adapters into the ingest and retrieval services.
/// Every dependency is built here and passed down explicitly, so callers
/// (and tests) can just as well assemble the services with their own
/// adapters.
pub struct PipelineContainer {
    pub ingest: IngestService,
    pub retrieval: RetrievalService,
}

impl PipelineContainer {
    pub fn new(config: IndexerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let fetcher: Arc<dyn ContentFetcher> = Arc::new(WebPageFetcher::new()?);
        let provider: Arc<dyn EmbeddingProvider> =
            Arc::new(OllamaClient::new(config.embedding.clone())?);
        let store: Arc<dyn VectorStore> =
            Arc::new(ChromaStore::new(ChromaClient::new(config.chroma.clone())?));

        let dispatcher =
            EmbeddingDispatcher::new(provider.clone()).with_concurrency(config.concurrency);
        let writer = VectorStoreWriter::new(store.clone(), config.collection.clone());

        let mut ingest = IngestService::new(
            fetcher,
            dispatcher,
            writer,
            config.chunk_size,
            config.chunk_overlap,
        );
        if let Some(dir) = &config.artifacts_dir {
            ingest = ingest.with_artifacts(ArtifactWriter::new(dir.clone()));
        }

        let retrieval = RetrievalService::new(store, provider, config.collection);

        Ok(Self { ingest, retrieval })
    }

    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Self::new(IndexerConfig::from_env())
    }
}
