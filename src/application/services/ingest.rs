use std::sync::Arc;
use std::time::Instant;

use tracing::info;
use uuid::Uuid;

use crate::application::ports::{ContentFetcher, FetchError, FetchRequest, StorageError};
use crate::application::services::dispatcher::{EmbeddingDispatcher, EmbeddingError};
use crate::application::services::splitter::{ChunkingError, ContentSplitter};
use crate::application::services::store_writer::VectorStoreWriter;
use crate::infrastructure::artifacts::ArtifactWriter;

#[derive(Debug)]
pub enum IngestError {
    Fetch { uid: String, source: FetchError },
    Chunking { uid: String, source: ChunkingError },
    Embedding { uid: String, source: EmbeddingError },
    Storage { uid: String, source: StorageError },
    Artifacts { uid: String, source: std::io::Error },
}

impl IngestError {
    /// The uid of the document whose ingest failed.
    pub fn document_uid(&self) -> &str {
        match self {
            IngestError::Fetch { uid, .. }
            | IngestError::Chunking { uid, .. }
            | IngestError::Embedding { uid, .. }
            | IngestError::Storage { uid, .. }
            | IngestError::Artifacts { uid, .. } => uid,
        }
    }
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Fetch { uid, source } => {
                write!(f, "Ingest of document {} failed at fetch stage: {}", uid, source)
            }
            IngestError::Chunking { uid, source } => {
                write!(f, "Ingest of document {} failed at chunk stage: {}", uid, source)
            }
            IngestError::Embedding { uid, source } => {
                write!(f, "Ingest of document {} failed at embed stage: {}", uid, source)
            }
            IngestError::Storage { uid, source } => {
                write!(f, "Ingest of document {} failed at persist stage: {}", uid, source)
            }
            IngestError::Artifacts { uid, source } => write!(
                f,
                "Ingest of document {} failed writing debug artifacts: {}",
                uid, source
            ),
        }
    }
}

impl std::error::Error for IngestError {}

#[derive(Debug, Clone)]
pub struct IngestReport {
    pub document_uid: String,
    pub chunk_count: usize,
    pub embedding_count: usize,
    pub elapsed_ms: u128,
}

/// Orchestrates the fetch → chunk → embed → persist sequence for one
/// document.
///
/// Stages run strictly in order and fail closed: an error at any stage
/// stops the pipeline before the next stage runs, so a document is either
/// fully visible in the vector store or not at all. Only the embedding
/// stage parallelizes internally. Dependencies are injected explicitly;
/// nothing here is a process-wide singleton, which keeps concurrent ingest
/// calls and test doubles straightforward.
pub struct IngestService {
    fetcher: Arc<dyn ContentFetcher>,
    dispatcher: EmbeddingDispatcher,
    writer: VectorStoreWriter,
    chunk_size: usize,
    chunk_overlap: usize,
    artifacts: Option<ArtifactWriter>,
}

impl IngestService {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        dispatcher: EmbeddingDispatcher,
        writer: VectorStoreWriter,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Self {
        Self {
            fetcher,
            dispatcher,
            writer,
            chunk_size,
            chunk_overlap,
            artifacts: None,
        }
    }

    /// Enables JSON debug artifacts (`splits.json`, `embeddings.json`) for
    /// each ingest, useful for replaying a run without re-calling the
    /// embedding service.
    pub fn with_artifacts(mut self, artifacts: ArtifactWriter) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    /// Ingests one document, generating a fresh uid for it.
    pub async fn ingest(&self, source: &str, uri: &str) -> Result<IngestReport, IngestError> {
        self.ingest_with_uid(Uuid::new_v4().to_string(), source, uri)
            .await
    }

    /// Ingests one document under a caller-supplied uid.
    pub async fn ingest_with_uid(
        &self,
        uid: String,
        source: &str,
        uri: &str,
    ) -> Result<IngestReport, IngestError> {
        let started = Instant::now();
        info!(document_uid = %uid, source, "ingest started");

        let request = FetchRequest {
            uid: uid.clone(),
            source: source.to_string(),
            uri: uri.to_string(),
        };
        let document = self
            .fetcher
            .fetch(&request)
            .await
            .map_err(|source| IngestError::Fetch {
                uid: uid.clone(),
                source,
            })?;

        let mut splitter = ContentSplitter::new(document, self.chunk_size, self.chunk_overlap);
        let chunk_count = splitter
            .split()
            .map_err(|source| IngestError::Chunking {
                uid: uid.clone(),
                source,
            })?
            .len();

        if chunk_count == 0 {
            info!(document_uid = %uid, "document has no content, nothing to persist");
            return Ok(IngestReport {
                document_uid: uid,
                chunk_count: 0,
                embedding_count: 0,
                elapsed_ms: started.elapsed().as_millis(),
            });
        }

        if let Some(artifacts) = &self.artifacts {
            artifacts
                .save_splits(&splitter.manifest())
                .await
                .map_err(|source| IngestError::Artifacts {
                    uid: uid.clone(),
                    source,
                })?;
        }

        let embeddings = self
            .dispatcher
            .embed_all(splitter.chunks())
            .await
            .map_err(|source| IngestError::Embedding {
                uid: uid.clone(),
                source,
            })?;

        if let Some(artifacts) = &self.artifacts {
            artifacts
                .save_embeddings(&embeddings)
                .await
                .map_err(|source| IngestError::Artifacts {
                    uid: uid.clone(),
                    source,
                })?;
        }

        self.writer
            .persist(&embeddings)
            .await
            .map_err(|source| IngestError::Storage {
                uid: uid.clone(),
                source,
            })?;

        let elapsed_ms = started.elapsed().as_millis();
        info!(
            document_uid = %uid,
            chunks = chunk_count,
            embeddings = embeddings.len(),
            elapsed_ms,
            "ingest finished"
        );

        Ok(IngestReport {
            document_uid: uid,
            chunk_count,
            embedding_count: embeddings.len(),
            elapsed_ms,
        })
    }
}
