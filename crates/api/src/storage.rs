//! Binary storage for uploaded media.
//!
//! Handlers talk to [`BlobStore`]; the default implementation writes to a
//! local directory rooted at `UPLOAD_DIR`. Paths are relative
//! (`treeId/memberId/category/name.ext`) and stored verbatim in the
//! database, so the backend can be swapped without a data migration.

use async_trait::async_trait;
use kintree_core::error::CoreError;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Length of the random portion of generated object names.
const OBJECT_NAME_LENGTH: usize = 12;

/// Abstract binary store keyed by relative path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `data` at `path`, creating parent directories as needed.
    async fn put(&self, path: &str, data: &[u8]) -> Result<(), CoreError>;

    /// Read the object at `path`; `Ok(None)` when it does not exist.
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, CoreError>;

    /// Remove the object at `path`; removing a missing object is not an error.
    async fn delete(&self, path: &str) -> Result<(), CoreError>;
}

/// Generate a random 12-character alphanumeric object name with the given
/// extension (e.g. `"k3Jd8sPq2xWz.jpg"`).
pub fn generate_object_name(extension: &str) -> String {
    let name: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(OBJECT_NAME_LENGTH)
        .map(char::from)
        .collect();
    format!("{name}{extension}")
}

/// Local-filesystem store rooted at a base directory.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalStore { root: root.into() }
    }

    /// Resolve a relative storage path, rejecting traversal components.
    fn resolve(&self, path: &str) -> Result<PathBuf, CoreError> {
        let relative = Path::new(path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(CoreError::Storage(format!("Invalid storage path: {path}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn put(&self, path: &str, data: &[u8]) -> Result<(), CoreError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::Storage(format!("Failed to create {parent:?}: {e}")))?;
        }
        tokio::fs::write(&full, data)
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to write {path}: {e}")))
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, CoreError> {
        let full = self.resolve(path)?;
        match tokio::fs::read(&full).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Storage(format!("Failed to read {path}: {e}"))),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), CoreError> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Storage(format!("Failed to delete {path}: {e}"))),
        }
    }
}

/// Best-effort delete of a batch of stored objects. Failures are logged and
/// never propagated; metadata deletion must not be blocked by storage.
pub async fn delete_all_quietly(store: &dyn BlobStore, paths: &[String]) {
    for path in paths {
        if let Err(e) = store.delete(path).await {
            tracing::warn!(path = %path, error = %e, "Failed to delete stored file");
        }
    }
}
