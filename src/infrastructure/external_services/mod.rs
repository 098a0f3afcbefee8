pub mod ollama_client;
pub mod web_fetcher;

pub use ollama_client::{EmbeddingClientConfig, OllamaClient};
pub use web_fetcher::WebPageFetcher;
