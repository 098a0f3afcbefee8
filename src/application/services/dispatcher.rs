use std::sync::Arc;

use futures::StreamExt;
use tracing::debug;
use uuid::Uuid;

use crate::application::ports::{EmbeddingProvider, EmbeddingProviderError};
use crate::domain::entities::{Chunk, Embedding};

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug)]
pub enum EmbeddingError {
    ChunkFailed {
        chunk_id: Uuid,
        ordinal: usize,
        source: EmbeddingProviderError,
    },
    Incomplete {
        expected: usize,
        produced: usize,
    },
}

impl std::fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingError::ChunkFailed {
                chunk_id,
                ordinal,
                source,
            } => write!(
                f,
                "Embedding failed for chunk {} (ordinal {}): {}",
                chunk_id, ordinal, source
            ),
            EmbeddingError::Incomplete { expected, produced } => write!(
                f,
                "Dispatch produced {} embeddings, expected {}",
                produced, expected
            ),
        }
    }
}

impl std::error::Error for EmbeddingError {}

/// Fans a chunk batch out across a bounded pool of embedding calls and fans
/// the results back in, in input order.
///
/// Workers complete in arbitrary order; each result is placed into a
/// pre-sized slot addressed by the chunk's input position, so
/// `result[i].chunk_id() == chunks[i].chunk_id()` always holds. The first
/// failure aborts the dispatch: the stream is dropped, outstanding calls
/// are abandoned, and partial results are discarded so that callers never
/// persist an incomplete document.
pub struct EmbeddingDispatcher {
    provider: Arc<dyn EmbeddingProvider>,
    concurrency: usize,
}

impl EmbeddingDispatcher {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn embed_all(&self, chunks: &[Chunk]) -> Result<Vec<Embedding>, EmbeddingError> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let mut slots: Vec<Option<Embedding>> = Vec::new();
        slots.resize_with(chunks.len(), || None);

        let mut completions = futures::stream::iter(chunks.iter().enumerate().map(
            |(ordinal, chunk)| {
                let provider = Arc::clone(&self.provider);
                async move { (ordinal, provider.embed(chunk.content()).await) }
            },
        ))
        .buffer_unordered(self.concurrency);

        while let Some((ordinal, result)) = completions.next().await {
            let chunk = &chunks[ordinal];
            let response = result.map_err(|source| EmbeddingError::ChunkFailed {
                chunk_id: chunk.chunk_id(),
                ordinal,
                source,
            })?;

            debug!(
                chunk_id = %chunk.chunk_id(),
                ordinal,
                dimension = response.vector.len(),
                "chunk embedded"
            );

            let approx_tokens = approx_token_count(chunk.content());
            slots[ordinal] = Some(Embedding::new(
                chunk,
                response.vector,
                response.model_id,
                approx_tokens,
            ));
        }
        drop(completions);

        let embeddings: Vec<Embedding> = slots.into_iter().flatten().collect();
        if embeddings.len() != chunks.len() {
            return Err(EmbeddingError::Incomplete {
                expected: chunks.len(),
                produced: embeddings.len(),
            });
        }

        Ok(embeddings)
    }
}

/// Rough token estimate: common BPE vocabularies average about four
/// characters per token on English prose.
pub fn approx_token_count(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
