pub mod dispatcher;
pub mod ingest;
pub mod retrieval;
pub mod splitter;
pub mod store_writer;

pub use dispatcher::{EmbeddingDispatcher, EmbeddingError};
pub use ingest::{IngestError, IngestReport, IngestService};
pub use retrieval::{RetrievalError, RetrievalService, RetrievedPassage};
pub use splitter::{ChunkingError, ContentSplitter, SplitManifest};
pub use store_writer::VectorStoreWriter;
