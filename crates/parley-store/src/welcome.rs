//! Welcome-sent marker.
//!
//! A single persisted string: the display name last greeted with the
//! one-time "has entered the chat" system notice. Read at session start,
//! written after a welcome is successfully submitted, so the same identity
//! is never welcomed twice across reconnects or re-entries.

use std::sync::Arc;

use parley_shared::constants::WELCOME_MARKER_KEY;

use crate::kv::KeyValue;
use crate::Result;

#[derive(Clone)]
pub struct WelcomeMarker {
    kv: Arc<dyn KeyValue>,
}

impl WelcomeMarker {
    pub fn new(kv: Arc<dyn KeyValue>) -> Self {
        Self { kv }
    }

    /// The display name last welcomed, or `None` if nobody has been.
    pub async fn last_welcomed(&self) -> Option<String> {
        match self.kv.get(WELCOME_MARKER_KEY).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read welcome marker");
                None
            }
        }
    }

    /// Record `display_name` as welcomed. Called only after the welcome
    /// notice has been confirmed written to the remote store.
    pub async fn mark(&self, display_name: &str) -> Result<()> {
        self.kv.set(WELCOME_MARKER_KEY, display_name).await
    }
}
