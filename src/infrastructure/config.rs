use std::env;
use std::path::PathBuf;

use dotenv::dotenv;

use crate::application::services::dispatcher::DEFAULT_CONCURRENCY;
use crate::infrastructure::external_services::ollama_client::EmbeddingClientConfig;
use crate::infrastructure::vector_store::chroma_client::ChromaConfig;

pub const DEFAULT_COLLECTION: &str = "devcollection";
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
pub const DEFAULT_CHUNK_OVERLAP: usize = 128;

/// Pipeline configuration, resolved once from the environment (a `.env`
/// file is honoured) with defaults for everything.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub collection: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub concurrency: usize,
    pub artifacts_dir: Option<PathBuf>,
    pub embedding: EmbeddingClientConfig,
    pub chroma: ChromaConfig,
}

impl IndexerConfig {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            collection: env::var("VECTOR_COLLECTION")
                .unwrap_or_else(|_| DEFAULT_COLLECTION.to_string()),
            chunk_size: env_usize("CHUNK_SIZE", DEFAULT_CHUNK_SIZE),
            chunk_overlap: env_usize("CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP),
            concurrency: env_usize("EMBED_CONCURRENCY", DEFAULT_CONCURRENCY),
            artifacts_dir: env::var("ARTIFACTS_DIR").ok().map(PathBuf::from),
            embedding: EmbeddingClientConfig::default(),
            chroma: ChromaConfig::default(),
        }
    }
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            concurrency: DEFAULT_CONCURRENCY,
            artifacts_dir: None,
            embedding: EmbeddingClientConfig::default(),
            chroma: ChromaConfig::default(),
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
