//! Key-value persistence backends.
//!
//! The [`KeyValue`] trait is the narrow interface the rest of the client
//! depends on. [`FileKv`] is the production backend (one file per key in
//! the platform data directory); [`MemoryKv`] backs tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use directories::ProjectDirs;

use crate::error::StoreError;
use crate::Result;

/// String key-value persistence with `get`/`set` semantics.
///
/// Absence and unreadability are both reported as `Ok(None)` by callers
/// that layer parsing on top; the trait itself only distinguishes a
/// missing key from an I/O failure.
#[async_trait]
pub trait KeyValue: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed [`KeyValue`] store: each key is a file in a flat directory.
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    /// Open (or create) the default application store.
    ///
    /// The directory is placed in the platform-appropriate data location:
    /// - Linux:   `~/.local/share/parley/kv/`
    /// - macOS:   `~/Library/Application Support/com.parley.parley/kv/`
    /// - Windows: `{FOLDERID_RoamingAppData}\parley\parley\data\kv\`
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "parley", "parley").ok_or(StoreError::NoDataDir)?;
        let dir = project_dirs.data_dir().join("kv");

        tracing::info!(path = %dir.display(), "opening key-value store");

        Self::open_at(&dir)
    }

    /// Open (or create) a store at an explicit directory.
    ///
    /// Useful for tests and for embedding the store inside custom layouts.
    pub fn open_at(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl KeyValue for FileKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        // Write to a sibling temp file first so a crash mid-write never
        // leaves a truncated value under the real key.
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// In-memory [`KeyValue`] store for tests.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValue for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_kv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKv::open_at(dir.path()).expect("should open");

        assert_eq!(kv.get("messages").await.unwrap(), None);
        kv.set("messages", "[]").await.unwrap();
        assert_eq!(kv.get("messages").await.unwrap(), Some("[]".to_string()));
    }

    #[tokio::test]
    async fn file_kv_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKv::open_at(dir.path()).unwrap();

        kv.set("storedName", "Ana").await.unwrap();
        kv.set("storedName", "Bob").await.unwrap();
        assert_eq!(
            kv.get("storedName").await.unwrap(),
            Some("Bob".to_string())
        );
    }

    #[tokio::test]
    async fn memory_kv_round_trip() {
        let kv = MemoryKv::new();
        assert_eq!(kv.get("k").await.unwrap(), None);
        kv.set("k", "v").await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), Some("v".to_string()));
    }
}
