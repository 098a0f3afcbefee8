pub mod metadata;

pub use metadata::{MetadataMap, MetadataValue};
