pub mod chroma_client;
pub mod chroma_store;

pub use chroma_client::{ChromaClient, ChromaConfig};
pub use chroma_store::ChromaStore;
