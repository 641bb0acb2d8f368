//! JSON file store.
//!
//! The whole file is a single JSON object mapping keys to string values.
//! Every write rewrites the file through a temporary sibling and a rename, so
//! a crash mid-write leaves either the old or the new contents. A corrupt file
//! fails reads but is replaced by the next write.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{KeyValueStore, StorageError};

type Entries = BTreeMap<String, String>;

/// Persistent store backed by a JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store for `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Entries, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(Entries::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    /// Current entries for a read-modify-write cycle, and whether corrupt
    /// contents were discarded so the write can replace them.
    async fn load_for_write(&self) -> Result<(Entries, bool), StorageError> {
        match self.load().await {
            Ok(entries) => Ok((entries, false)),
            Err(e @ StorageError::Corrupt { .. }) => {
                warn!(error = %e, "Discarding corrupt session file");
                Ok((Entries::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    async fn save(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let json = serde_json::to_string_pretty(entries).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| self.io_error(source))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| self.io_error(source))?;

        debug!(path = %self.path.display(), keys = entries.len(), "Session file written");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let (mut entries, _) = self.load_for_write().await?;
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let (mut entries, discarded) = self.load_for_write().await?;
        if entries.remove(key).is_none() && !discarded {
            return Ok(());
        }
        self.save(&entries).await
    }
}
