use std::env;
use std::time::Duration;

use reqwest::{Client, Error as ReqwestError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::application::ports::StorageError;

#[derive(Debug, Clone)]
pub struct ChromaConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        let base_url =
            env::var("CHROMA_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());

        Self {
            base_url,
            timeout_secs: 30,
        }
    }
}

/// Collection info returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Result of a similarity query: one inner sequence per query embedding.
#[derive(Debug, Clone, Deserialize)]
pub struct ChromaQueryResult {
    pub ids: Vec<Vec<String>>,
    pub documents: Option<Vec<Vec<Option<String>>>>,
    pub metadatas: Option<Vec<Vec<Option<Value>>>>,
    pub distances: Option<Vec<Vec<f32>>>,
}

/// Result of a get-by-id call.
#[derive(Debug, Clone, Deserialize)]
pub struct ChromaGetResult {
    pub ids: Vec<String>,
    pub documents: Option<Vec<Option<String>>>,
    pub embeddings: Option<Vec<Option<Vec<f32>>>>,
    pub metadatas: Option<Vec<Option<Value>>>,
}

/// Minimal HTTP client for the Chroma REST API: collection lookup, batch
/// upsert, similarity query, get-by-id. Constructed explicitly and passed
/// where needed; there is no process-wide instance.
#[derive(Debug, Clone)]
pub struct ChromaClient {
    http: Client,
    config: ChromaConfig,
}

impl ChromaClient {
    pub fn new(config: ChromaConfig) -> Result<Self, ReqwestError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config: ChromaConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
        })
    }

    pub fn from_env() -> Result<Self, ReqwestError> {
        Self::new(ChromaConfig::default())
    }

    pub async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: Option<Value>,
    ) -> Result<CollectionInfo, StorageError> {
        let mut body = json!({
            "name": name,
            "get_or_create": true,
        });
        if let Some(meta) = metadata {
            body["metadata"] = meta;
        }

        let response = self
            .http
            .post(format!("{}/api/v1/collections", self.config.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(StorageError::Http(format!(
                "get_or_create collection failed ({}): {}",
                status, text
            )));
        }

        debug!(name = %name, "collection get_or_create");
        serde_json::from_str(&text).map_err(|e| StorageError::Deserialize(format!("{}: {}", e, text)))
    }

    pub async fn upsert(
        &self,
        collection_id: &str,
        ids: Vec<String>,
        documents: Vec<String>,
        embeddings: Vec<Vec<f32>>,
        metadatas: Vec<Value>,
    ) -> Result<(), StorageError> {
        if ids.is_empty() {
            return Err(StorageError::InvalidInput("ids cannot be empty".to_string()));
        }

        let count = ids.len();
        let body = json!({
            "ids": ids,
            "documents": documents,
            "embeddings": embeddings,
            "metadatas": metadatas,
        });

        let response = self
            .http
            .post(format!(
                "{}/api/v1/collections/{}/upsert",
                self.config.base_url, collection_id
            ))
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StorageError::Http(format!(
                "upsert failed ({}): {}",
                status, text
            )));
        }

        info!(collection = %collection_id, count, "records upserted");
        Ok(())
    }

    pub async fn query(
        &self,
        collection_id: &str,
        query_embedding: &[f32],
        n_results: usize,
    ) -> Result<ChromaQueryResult, StorageError> {
        let body = json!({
            "query_embeddings": [query_embedding],
            "n_results": n_results,
            "include": ["documents", "metadatas", "distances"],
        });

        let response = self
            .http
            .post(format!(
                "{}/api/v1/collections/{}/query",
                self.config.base_url, collection_id
            ))
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StorageError::Http(format!(
                "query failed ({}): {}",
                status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StorageError::Deserialize(e.to_string()))
    }

    pub async fn get(
        &self,
        collection_id: &str,
        ids: &[String],
    ) -> Result<ChromaGetResult, StorageError> {
        let body = json!({
            "ids": ids,
            "include": ["documents", "embeddings", "metadatas"],
        });

        let response = self
            .http
            .post(format!(
                "{}/api/v1/collections/{}/get",
                self.config.base_url, collection_id
            ))
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StorageError::Http(format!(
                "get failed ({}): {}",
                status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StorageError::Deserialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_result_parses_parallel_sequences() {
        let body = json!({
            "ids": [["a", "b"]],
            "documents": [["first", "second"]],
            "metadatas": [[{"ordinal": 0}, {"ordinal": 1}]],
            "distances": [[0.1, 0.4]],
        })
        .to_string();

        let result: ChromaQueryResult = serde_json::from_str(&body).unwrap();
        assert_eq!(result.ids[0], vec!["a", "b"]);
        assert_eq!(result.distances.unwrap()[0], vec![0.1, 0.4]);
    }

    #[test]
    fn test_get_result_tolerates_missing_fields() {
        let body = json!({ "ids": ["a"] }).to_string();
        let result: ChromaGetResult = serde_json::from_str(&body).unwrap();
        assert_eq!(result.ids, vec!["a"]);
        assert!(result.documents.is_none());
    }
}
