//! File-backed key-value store.
//!
//! All keys live in one JSON object on disk:
//!
//! ```text
//! { "popx_user": "{\"version\":1,\"owner\":\"user-1\",...}" }
//! ```
//!
//! Writes go to a sibling temp file which is then renamed over the real
//! one, so a crash mid-write leaves either the old or the new file, never a
//! truncated one.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rapport_model::CodecError;
use tokio::sync::Mutex;

use crate::{CacheError, KeyValueStore};

/// A [`KeyValueStore`] persisted to a single JSON file.
///
/// The file is created on first write. A missing file reads as empty.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Uses `path` as the backing file. Nothing is touched on disk until
    /// the first call.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<String, String>, CacheError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(CacheError::Io(e)),
        };
        if text.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&text).map_err(|e| CacheError::Codec(CodecError::Decode(e)))
    }

    async fn write_all(&self, values: &HashMap<String, String>) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(CacheError::Io)?;
        }

        let text = serde_json::to_string_pretty(values)
            .map_err(|e| CacheError::Codec(CodecError::Encode(e)))?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, text).await.map_err(CacheError::Io)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(CacheError::Io)
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        // A corrupt file is replaced rather than blocking every future write.
        let mut values = match self.read_all().await {
            Ok(values) => values,
            Err(CacheError::Codec(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cache file unreadable, starting fresh");
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        values.insert(key.to_string(), value);
        self.write_all(&values).await
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        let mut values = match self.read_all().await {
            Ok(values) => values,
            Err(CacheError::Codec(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cache file unreadable, clearing it");
                return self.write_all(&HashMap::new()).await;
            }
            Err(e) => return Err(e),
        };
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&values).await
    }
}
