//! Remote document-store contract and the in-process implementation.
//!
//! The real store is an external service; this module pins down the two
//! capabilities the client relies on (single-record insert and an
//! ordered live snapshot feed) and provides [`MemoryFeed`], an
//! in-process store with the same observable behavior for tests and
//! local runs.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;

use parley_shared::constants::MESSAGES_COLLECTION;
use parley_shared::{MessageId, TransportError};

use crate::record::{MessageRecord, StoredRecord};

/// Default capacity of the snapshot fan-out channel.
pub const DEFAULT_FEED_CAPACITY: usize = 64;

/// Append-only message collection with an ordered live feed.
///
/// Every change to the collection is delivered to watchers as a complete
/// newest-first snapshot, never a delta.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a single record. The store assigns and returns the id.
    async fn insert(&self, record: MessageRecord) -> Result<MessageId, TransportError>;

    /// Open a live view: the current snapshot plus a receiver for every
    /// subsequent one.
    async fn watch(
        &self,
    ) -> (
        Vec<StoredRecord>,
        broadcast::Receiver<Vec<StoredRecord>>,
    );
}

/// In-process [`DocumentStore`] backed by a `Vec` and a broadcast channel.
pub struct MemoryFeed {
    records: Mutex<Vec<StoredRecord>>,
    snapshots: broadcast::Sender<Vec<StoredRecord>>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (snapshots, _) = broadcast::channel(capacity);
        Self {
            records: Mutex::new(Vec::new()),
            snapshots,
        }
    }

    /// Current contents, newest first. Insertion order breaks
    /// `created_at` ties, latest insert first.
    fn snapshot(&self) -> Vec<StoredRecord> {
        let mut records = self.records.lock().unwrap().clone();
        records.reverse();
        records.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
        records
    }
}

impl Default for MemoryFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryFeed {
    async fn insert(&self, record: MessageRecord) -> Result<MessageId, TransportError> {
        let id = MessageId::generate();
        {
            let mut records = self.records.lock().unwrap();
            records.push(StoredRecord {
                id: id.clone(),
                record,
            });
        }
        tracing::debug!(collection = MESSAGES_COLLECTION, id = %id, "record inserted");

        // No watchers is fine; the snapshot simply goes undelivered.
        let _ = self.snapshots.send(self.snapshot());
        Ok(id)
    }

    async fn watch(
        &self,
    ) -> (
        Vec<StoredRecord>,
        broadcast::Receiver<Vec<StoredRecord>>,
    ) {
        // Subscribe before taking the snapshot so no insert between the
        // two is ever missed.
        let rx = self.snapshots.subscribe();
        (self.snapshot(), rx)
    }
}
