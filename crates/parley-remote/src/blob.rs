//! Blob-storage contract.
//!
//! Used by the attachment-picking flow (out of scope here) to upload
//! image/audio bytes before handing the resulting URL to the composer.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use parley_shared::TransportError;

/// Opaque reference to an uploaded blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef(pub String);

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<BlobRef, TransportError>;
    async fn download_url(&self, blob: &BlobRef) -> Result<String, TransportError>;
}

/// Unique upload key: `<userId>-<millis>-<fileName>`.
pub fn blob_reference(user_id: &str, millis: i64, file_name: &str) -> String {
    let name = file_name.rsplit('/').next().unwrap_or(file_name);
    format!("{user_id}-{millis}-{name}")
}

/// In-memory [`BlobStore`] for tests.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<BlobRef, TransportError> {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes);
        Ok(BlobRef(key.to_string()))
    }

    async fn download_url(&self, blob: &BlobRef) -> Result<String, TransportError> {
        let blobs = self.blobs.lock().unwrap();
        if !blobs.contains_key(&blob.0) {
            return Err(TransportError::Insert(format!(
                "unknown blob: {}",
                blob.0
            )));
        }
        Ok(format!("memory://{}", blob.0))
    }
}
