use async_trait::async_trait;

#[derive(Debug)]
pub enum EmbeddingProviderError {
    NetworkError(String),
    ApiError(String),
    ServiceUnavailable,
}

impl std::fmt::Display for EmbeddingProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProviderError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            EmbeddingProviderError::ApiError(msg) => write!(f, "API error: {}", msg),
            EmbeddingProviderError::ServiceUnavailable => write!(f, "Service unavailable"),
        }
    }
}

impl std::error::Error for EmbeddingProviderError {}

/// Vector returned by the external model, plus the model that produced it.
#[derive(Debug, Clone)]
pub struct EmbeddingVector {
    pub vector: Vec<f32>,
    pub model_id: String,
}

/// External embedding model boundary. One call per chunk; a failure is
/// non-retryable within a single dispatch (the adapter may retry
/// internally before reporting one).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingProviderError>;

    fn model_id(&self) -> &str;
}
