//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the client starts with zero
//! configuration.

use std::path::PathBuf;
use std::sync::Arc;

use parley_remote::MemoryFeed;
use parley_store::{FileKv, KeyValue, StoreError};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Directory for the key-value store (snapshot cache and welcome
    /// marker). Env: `PARLEY_DATA_DIR`. Default: the platform data
    /// directory.
    pub data_dir: Option<PathBuf>,

    /// Capacity of the in-process feed's snapshot channel.
    /// Env: `PARLEY_FEED_CAPACITY`. Default: `64`.
    pub feed_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            feed_capacity: parley_remote::store::DEFAULT_FEED_CAPACITY,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let data_dir = std::env::var("PARLEY_DATA_DIR").ok().map(PathBuf::from);

        let feed_capacity = std::env::var("PARLEY_FEED_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(parley_remote::store::DEFAULT_FEED_CAPACITY);

        Self {
            data_dir,
            feed_capacity,
        }
    }

    /// Open the configured key-value store.
    pub fn open_kv(&self) -> Result<Arc<dyn KeyValue>, StoreError> {
        let kv = match &self.data_dir {
            Some(dir) => FileKv::open_at(dir)?,
            None => FileKv::new()?,
        };
        Ok(Arc::new(kv))
    }

    /// Build an in-process feed for local runs and tests.
    pub fn open_local_feed(&self) -> Arc<MemoryFeed> {
        Arc::new(MemoryFeed::with_capacity(self.feed_capacity))
    }
}
