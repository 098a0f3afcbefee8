use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::application::services::splitter::SplitManifest;
use crate::domain::entities::Embedding;

const SPLITS_FILE: &str = "splits.json";
const EMBEDDINGS_FILE: &str = "embeddings.json";

/// Writes JSON debug artifacts for one ingest run: the full chunk chain
/// and the embedding records. Enough to reproduce a run without
/// re-calling the embedding service.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save_splits(&self, manifest: &SplitManifest) -> io::Result<()> {
        self.write_json(SPLITS_FILE, manifest).await?;
        info!(
            document_uid = %manifest.document_uid,
            chunks = manifest.chunks.len(),
            "saved split manifest"
        );
        Ok(())
    }

    pub async fn save_embeddings(&self, embeddings: &[Embedding]) -> io::Result<()> {
        self.write_json(EMBEDDINGS_FILE, &embeddings).await?;
        info!(count = embeddings.len(), "saved embedding records");
        Ok(())
    }

    async fn write_json<T: serde::Serialize>(&self, file_name: &str, value: &T) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let body = serde_json::to_vec_pretty(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        tokio::fs::write(self.dir.join(file_name), body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::splitter::ContentSplitter;
    use crate::domain::entities::DocumentContent;
    use crate::domain::value_objects::MetadataMap;

    #[tokio::test]
    async fn test_split_manifest_written_and_reloadable() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(tmp.path());

        let document = DocumentContent::new(
            "doc-1".to_string(),
            "https://example.com/".to_string(),
            "/pages/example".to_string(),
            "One paragraph.\n\nAnother paragraph.".to_string(),
            "text/html".to_string(),
            MetadataMap::new(),
        );
        let mut splitter = ContentSplitter::new(document, 20, 4);
        splitter.split().unwrap();

        writer.save_splits(&splitter.manifest()).await.unwrap();

        let body = tokio::fs::read_to_string(tmp.path().join(SPLITS_FILE))
            .await
            .unwrap();
        let restored: SplitManifest = serde_json::from_str(&body).unwrap();
        assert_eq!(restored.document_uid, "doc-1");
        assert_eq!(restored.chunks.len(), splitter.chunks().len());
    }
}
