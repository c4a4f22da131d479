//! Implements the `Storage` trait with one file per slot.

use crate::storage::{check_quota, Storage, StorageError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Stores each slot as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    quota: Option<u64>,
}

impl FileStorage {
    /// Uses `dir`, which must already exist, for the slot files. When `quota` is given, writes that
    /// would make the slot files larger than `quota` bytes in total are refused.
    pub fn new(dir: impl Into<PathBuf>, quota: Option<u64>) -> Self {
        Self {
            dir: dir.into(),
            quota,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Sums the sizes of every slot file other than `key`'s.
    async fn used_by_others(&self, key: &str) -> Result<u64, StorageError> {
        let io = |source: std::io::Error| StorageError::Io {
            key: key.to_string(),
            source,
        };
        let own = format!("{key}.json");
        let mut total = 0;
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(io)?;
        while let Some(entry) = entries.next_entry().await.map_err(io)? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name == own || !name.ends_with(".json") {
                continue;
            }
            total += entry.metadata().await.map_err(io)?.len();
        }
        Ok(total)
    }
}

#[async_trait::async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key)?;
        trace!("reading slot {}", path.display());
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;
        if self.quota.is_some() {
            let projected = self.used_by_others(key).await? + value.len() as u64;
            check_quota(key, projected, self.quota)?;
        }
        trace!("writing {} bytes to slot {}", value.len(), path.display());
        tokio::fs::write(&path, value)
            .await
            .map_err(|source| StorageError::Io {
                key: key.to_string(),
                source,
            })
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}
