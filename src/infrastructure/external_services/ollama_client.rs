use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError};
use serde::{Deserialize, Serialize};

use crate::application::ports::{EmbeddingProvider, EmbeddingProviderError, EmbeddingVector};

#[derive(Serialize)]
struct OllamaEmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingClientConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_factor: f64,
}

impl Default for EmbeddingClientConfig {
    fn default() -> Self {
        let base_url = env::var("EMBEDDINGS_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:11434".to_string());
        let model = env::var("EMBED_MODEL").unwrap_or_else(|_| "nomic-embed-text".to_string());

        Self {
            base_url,
            model,
            timeout_secs: 30,
            max_retries: 3,
            backoff_factor: 1.5,
        }
    }
}

#[derive(Debug)]
pub enum EmbeddingsError {
    RequestError(String),
    ParseError(String),
    MaxRetriesExceeded(String),
}

impl std::fmt::Display for EmbeddingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingsError::RequestError(msg) => write!(f, "Request error: {}", msg),
            EmbeddingsError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            EmbeddingsError::MaxRetriesExceeded(msg) => write!(f, "Max retries exceeded: {}", msg),
        }
    }
}

impl std::error::Error for EmbeddingsError {}

/// HTTP client for an Ollama-compatible embeddings endpoint. Calls are
/// bounded by the configured timeout and retried with exponential backoff
/// before a failure is reported to the dispatcher.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    config: EmbeddingClientConfig,
}

impl OllamaClient {
    pub fn new(config: EmbeddingClientConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, ReqwestError> {
        Self::new(EmbeddingClientConfig::default())
    }

    pub async fn get_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingsError> {
        let mut attempts = 0;
        let mut last_error = None;

        loop {
            attempts += 1;

            match self.execute_request(text).await {
                Ok(vector) => return Ok(vector),
                Err(e) => {
                    last_error = Some(e);

                    if attempts > self.config.max_retries {
                        break;
                    }

                    let backoff = Duration::from_millis(
                        (self.config.backoff_factor.powi(attempts as i32 - 1) * 1000.0) as u64,
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            EmbeddingsError::MaxRetriesExceeded("max retries exceeded".to_string())
        }))
    }

    async fn execute_request(&self, text: &str) -> Result<Vec<f32>, EmbeddingsError> {
        let request = OllamaEmbeddingsRequest {
            model: &self.config.model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.config.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingsError::RequestError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingsError::RequestError(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed = response
            .json::<OllamaEmbeddingsResponse>()
            .await
            .map_err(|e| EmbeddingsError::ParseError(e.to_string()))?;

        if parsed.embedding.is_empty() {
            return Err(EmbeddingsError::ParseError(
                "empty embedding returned".to_string(),
            ));
        }

        Ok(parsed.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingProviderError> {
        let vector = self.get_embedding(text).await.map_err(|e| match e {
            EmbeddingsError::RequestError(msg) => EmbeddingProviderError::NetworkError(msg),
            EmbeddingsError::ParseError(msg) => EmbeddingProviderError::ApiError(msg),
            EmbeddingsError::MaxRetriesExceeded(_) => EmbeddingProviderError::ServiceUnavailable,
        })?;

        Ok(EmbeddingVector {
            vector,
            model_id: self.config.model.clone(),
        })
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = OllamaEmbeddingsRequest {
            model: "nomic-embed-text",
            prompt: "Hello world",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "nomic-embed-text");
        assert_eq!(json["prompt"], "Hello world");
    }

    #[test]
    fn test_response_parsing() {
        let body = serde_json::json!({ "embedding": [0.25, -0.5, 1.0] }).to_string();
        let parsed: OllamaEmbeddingsResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.embedding, vec![0.25, -0.5, 1.0]);
    }
}
