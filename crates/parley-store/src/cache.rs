//! Message-list snapshot cache.
//!
//! The cache mirrors the last remote snapshot so the client can show a
//! usable (possibly stale) view while offline. Replace-whole-list
//! semantics only: every save overwrites the prior snapshot, and a load
//! always yields the full list or nothing.

use std::sync::Arc;

use parley_shared::constants::SNAPSHOT_KEY;
use parley_shared::Message;

use crate::kv::KeyValue;
use crate::Result;

/// Read/write access to the cached message snapshot.
#[derive(Clone)]
pub struct MessageCache {
    kv: Arc<dyn KeyValue>,
}

impl MessageCache {
    pub fn new(kv: Arc<dyn KeyValue>) -> Self {
        Self { kv }
    }

    /// Serialize and persist the full message list, overwriting any prior
    /// snapshot. Failure is non-fatal to the session; callers log it and
    /// continue with in-memory state.
    pub async fn save(&self, messages: &[Message]) -> Result<()> {
        let json = serde_json::to_string(messages)?;
        self.kv.set(SNAPSHOT_KEY, &json).await?;
        tracing::debug!(count = messages.len(), "cached message snapshot");
        Ok(())
    }

    /// Load the cached snapshot, or `None` if no snapshot exists.
    ///
    /// A snapshot that fails to parse is treated exactly like an absent
    /// one: logged and discarded, never an error to the caller.
    pub async fn load(&self) -> Option<Vec<Message>> {
        let raw = match self.kv.get(SNAPSHOT_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read cached snapshot");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(messages) => Some(messages),
            Err(e) => {
                tracing::warn!(error = %e, "cached snapshot failed to parse, ignoring");
                None
            }
        }
    }
}
