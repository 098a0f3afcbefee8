use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::MetadataMap;

/// Normalized text of one fetched document, plus the identifiers the rest
/// of the pipeline threads through chunks and stored records. Immutable
/// after creation; owned by the ingest call that created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentContent {
    uid: String,
    source: String,
    uri: String,
    content: String,
    content_type: String,
    metadata: MetadataMap,
    fetched_at: DateTime<Utc>,
}

impl DocumentContent {
    pub fn new(
        uid: String,
        source: String,
        uri: String,
        content: String,
        content_type: String,
        metadata: MetadataMap,
    ) -> Self {
        Self {
            uid,
            source,
            uri,
            content,
            content_type,
            metadata,
            fetched_at: Utc::now(),
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Where the raw bytes came from, e.g. `https://example.com/blog/`.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Logical address used by the rest of the system.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let mut metadata = MetadataMap::new();
        metadata.insert("title", "Example");

        let document = DocumentContent::new(
            "doc-1".to_string(),
            "https://example.com/blog/".to_string(),
            "/pages/blog".to_string(),
            "Some text".to_string(),
            "text/html".to_string(),
            metadata,
        );

        assert_eq!(document.uid(), "doc-1");
        assert_eq!(document.source(), "https://example.com/blog/");
        assert_eq!(document.uri(), "/pages/blog");
        assert!(!document.is_empty());
        assert_eq!(
            document.metadata().get("title").and_then(|v| v.as_str()),
            Some("Example")
        );
    }
}
