//! Where artifact bytes come from.

use async_trait::async_trait;
use cropwise_core::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// Pluggable storage backend for model artifacts.
///
/// Implementations return raw bytes; decoding is left to
/// [`crate::artifact`]. A missing artifact is `Ok(None)`, not an error, so
/// the registry can fall back to the default model.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Fetch an artifact by name
    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Whether an artifact is present
    async fn contains(&self, name: &str) -> bool;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Artifacts stored as files in one directory
#[derive(Debug, Clone)]
pub struct FsArtifactSource {
    root: PathBuf,
}

impl FsArtifactSource {
    /// Create a source rooted at the given models directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(Error::artifact(format!("invalid artifact name '{}'", name)));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl ArtifactSource for FsArtifactSource {
    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(artifact = name, bytes = bytes.len(), "read artifact");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            // Report the artifact name only; the storage path stays internal.
            Err(e) => Err(Error::model_load(name, format!("read failed ({})", e.kind()))),
        }
    }

    async fn contains(&self, name: &str) -> bool {
        match self.path_for(name) {
            Ok(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

/// Artifacts held in memory, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryArtifactSource {
    artifacts: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact, builder style
    pub fn with_artifact(self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Add or replace an artifact
    pub fn insert(&self, name: impl Into<String>, bytes: Vec<u8>) {
        self.artifacts.write().insert(name.into(), bytes);
    }
}

#[async_trait]
impl ArtifactSource for MemoryArtifactSource {
    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.artifacts.read().get(name).cloned())
    }

    async fn contains(&self, name: &str) -> bool {
        self.artifacts.read().contains_key(name)
    }

    fn describe(&self) -> String {
        format!("in-memory ({} artifacts)", self.artifacts.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_source_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsArtifactSource::new(dir.path());

        assert!(source.fetch("svm.json").await.unwrap().is_none());
        assert!(!source.contains("svm.json").await);
    }

    #[tokio::test]
    async fn test_fs_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.json"), b"{}").unwrap();
        let source = FsArtifactSource::new(dir.path());

        assert_eq!(source.fetch("model.json").await.unwrap(), Some(b"{}".to_vec()));
        assert!(source.contains("model.json").await);
    }

    #[tokio::test]
    async fn test_fs_source_rejects_traversal() {
        let source = FsArtifactSource::new("/tmp");
        assert!(source.fetch("../etc/passwd").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemoryArtifactSource::new().with_artifact("a.json", vec![1, 2]);
        assert_eq!(source.fetch("a.json").await.unwrap(), Some(vec![1, 2]));
        assert_eq!(source.fetch("b.json").await.unwrap(), None);
    }
}
