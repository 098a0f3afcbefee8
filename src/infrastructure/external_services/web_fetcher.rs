use std::time::Duration;

use async_trait::async_trait;
use html2text::from_read;
use regex::Regex;
use reqwest::{Client, Error as ReqwestError};
use tracing::debug;
use url::Url;

use crate::application::ports::{ContentFetcher, FetchError, FetchRequest};
use crate::domain::entities::DocumentContent;
use crate::domain::value_objects::MetadataMap;

const FETCH_TIMEOUT_SECS: u64 = 30;
const TEXT_WIDTH: usize = 80;

// Elements removed before text extraction. Page metadata is scraped from
// the raw markup first, so stripping cannot lose the title or description.
const STRIP_PATTERNS: [&str; 3] = [
    r"(?is)<script\b[^>]*>.*?</script>",
    r"(?is)<style\b[^>]*>.*?</style>",
    r"(?is)<a\b[^>]*>.*?</a>",
];

/// Fetches raw markup over HTTP or from a local file and normalizes it
/// into a `DocumentContent`: metadata scrape, markup strip, text
/// extraction. No retries here; the caller owns retry policy.
pub struct WebPageFetcher {
    client: Client,
}

impl WebPageFetcher {
    pub fn new() -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    async fn fetch_remote(&self, locator: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(locator)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                locator: locator.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))
    }

    async fn read_local(&self, path: &str) -> Result<String, FetchError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FetchError::Io(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl ContentFetcher for WebPageFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<DocumentContent, FetchError> {
        let markup = match Url::parse(&request.source) {
            Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {
                self.fetch_remote(&request.source).await?
            }
            Ok(parsed) if parsed.scheme() == "file" => {
                self.read_local(parsed.path()).await?
            }
            Ok(parsed) => {
                return Err(FetchError::InvalidLocator(format!(
                    "unsupported scheme {} in {}",
                    parsed.scheme(),
                    request.source
                )));
            }
            // Not a URL: treat it as a local path.
            Err(_) => self.read_local(&request.source).await?,
        };

        // Capture page metadata before stripping removes the elements
        // carrying it.
        let metadata = scrape_metadata(&markup);

        let stripped = strip_non_content(&markup);
        let text = from_read(stripped.as_bytes(), TEXT_WIDTH)
            .map_err(|e| FetchError::Extraction(e.to_string()))?;

        debug!(
            source = %request.source,
            bytes = markup.len(),
            text_chars = text.chars().count(),
            "document fetched"
        );

        Ok(DocumentContent::new(
            request.uid.clone(),
            request.source.clone(),
            request.uri.clone(),
            text.trim().to_string(),
            "text/html".to_string(),
            metadata,
        ))
    }
}

fn scrape_metadata(html: &str) -> MetadataMap {
    let mut metadata = MetadataMap::new();
    metadata.insert_opt("title", extract_title(html));
    metadata.insert_opt("description", extract_description(html));
    metadata.insert_opt("language", extract_language(html));
    metadata
}

fn extract_title(html: &str) -> Option<String> {
    let re = Regex::new(r"(?is)<title[^>]*>([^<]+)</title>").ok()?;
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_description(html: &str) -> Option<String> {
    let re =
        Regex::new(r#"(?is)<meta[^>]+name=["']description["'][^>]*content=["']([^"']*)["']"#)
            .ok()?;
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_language(html: &str) -> Option<String> {
    let re = Regex::new(r#"(?is)<html[^>]*\blang=["']([^"']+)["']"#).ok()?;
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn strip_non_content(html: &str) -> String {
    let mut output = html.to_string();
    for pattern in STRIP_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            output = re.replace_all(&output, " ").into_owned();
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html lang="en">
<head>
<title> Example Page </title>
<style>body { color: red; }</style>
<script>console.log("tracking");</script>
</head>
<body>
<p>Visible paragraph.</p>
<a href="/elsewhere">navigation link</a>
<p>Another paragraph.</p>
</body>
</html>"#;

    #[test]
    fn test_metadata_scraped_before_strip() {
        let metadata = scrape_metadata(PAGE);
        assert_eq!(
            metadata.get("title").and_then(|v| v.as_str()),
            Some("Example Page")
        );
        assert_eq!(
            metadata.get("language").and_then(|v| v.as_str()),
            Some("en")
        );
        // No meta description on this page: key must be absent, not null.
        assert!(!metadata.contains_key("description"));
    }

    #[test]
    fn test_description_scraped_when_present() {
        let page = r#"<html><head><meta name="description" content="A short summary."></head></html>"#;
        let metadata = scrape_metadata(page);
        assert_eq!(
            metadata.get("description").and_then(|v| v.as_str()),
            Some("A short summary.")
        );
    }

    #[test]
    fn test_strip_removes_script_style_and_anchor() {
        let stripped = strip_non_content(PAGE);
        assert!(!stripped.contains("console.log"));
        assert!(!stripped.contains("color: red"));
        assert!(!stripped.contains("navigation link"));
        assert!(stripped.contains("Visible paragraph."));
    }

    #[test]
    fn test_extracted_text_keeps_content_only() {
        let stripped = strip_non_content(PAGE);
        let text = from_read(stripped.as_bytes(), TEXT_WIDTH).unwrap();
        assert!(text.contains("Visible paragraph."));
        assert!(text.contains("Another paragraph."));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("navigation link"));
    }
}
