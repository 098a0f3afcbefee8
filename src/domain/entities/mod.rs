pub mod chunk;
pub mod document;
pub mod embedding;

pub use chunk::Chunk;
pub use document::DocumentContent;
pub use embedding::Embedding;
