use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::DocumentContent;
use crate::domain::value_objects::MetadataMap;

/// One bounded slice of a document's text, ordered within its document.
///
/// Chunks are produced once, as an immutable batch, by the splitter. The
/// previous/next relation is a same-batch id reference threaded at split
/// time; consumers look neighbours up by ordinal in the batch, never by
/// following a live pointer, so the chain stays valid when chunks are
/// handed to concurrent embedding tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    chunk_id: Uuid,
    document_uid: String,
    source: String,
    uri: String,
    ordinal: usize,
    content: String,
    metadata: MetadataMap,
    previous_chunk_id: Option<Uuid>,
    next_chunk_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl Chunk {
    pub fn new(
        document: &DocumentContent,
        chunk_id: Uuid,
        ordinal: usize,
        content: String,
        previous_chunk_id: Option<Uuid>,
        next_chunk_id: Option<Uuid>,
    ) -> Self {
        let mut metadata = document.metadata().clone();
        metadata.insert("ordinal", ordinal);

        Self {
            chunk_id,
            document_uid: document.uid().to_string(),
            source: document.source().to_string(),
            uri: document.uri().to_string(),
            ordinal,
            content,
            metadata,
            previous_chunk_id,
            next_chunk_id,
            created_at: Utc::now(),
        }
    }

    pub fn chunk_id(&self) -> Uuid {
        self.chunk_id
    }

    pub fn document_uid(&self) -> &str {
        &self.document_uid
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    pub fn previous_chunk_id(&self) -> Option<Uuid> {
        self.previous_chunk_id
    }

    pub fn next_chunk_id(&self) -> Option<Uuid> {
        self.next_chunk_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn character_count(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_first(&self) -> bool {
        self.previous_chunk_id.is_none()
    }

    pub fn is_last(&self) -> bool {
        self.next_chunk_id.is_none()
    }
}
