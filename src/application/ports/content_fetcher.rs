use async_trait::async_trait;

use crate::domain::entities::DocumentContent;

#[derive(Debug)]
pub enum FetchError {
    InvalidLocator(String),
    HttpStatus { status: u16, locator: String },
    Network(String),
    Io(String),
    Extraction(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::InvalidLocator(locator) => write!(f, "Invalid locator: {}", locator),
            FetchError::HttpStatus { status, locator } => {
                write!(f, "HTTP status {} fetching {}", status, locator)
            }
            FetchError::Network(msg) => write!(f, "Network error: {}", msg),
            FetchError::Io(msg) => write!(f, "I/O error: {}", msg),
            FetchError::Extraction(msg) => write!(f, "Extraction error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// Identity handed to the fetcher: the caller owns uid/uri assignment, the
/// fetcher only resolves `source` into normalized text.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub uid: String,
    pub source: String,
    pub uri: String,
}

/// Retrieves raw markup for a source locator and normalizes it into a
/// `DocumentContent`. No retries at this layer; retry policy belongs to the
/// caller.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<DocumentContent, FetchError>;
}
