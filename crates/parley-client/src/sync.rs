//! The synchronizer: reconciles the live remote feed with the local
//! snapshot cache under changing connectivity.
//!
//! A three-state machine (`Unknown`, `Online`, `Offline`) driven solely
//! by connectivity readings:
//!
//! - going online tears down any stale subscription and attaches a fresh
//!   one whose snapshots replace the in-memory list and write through to
//!   the cache;
//! - going offline cancels the subscription and replaces the in-memory
//!   list with the cached snapshot (empty if absent);
//! - repeated readings of the current state are no-ops, so the
//!   subscription is never needlessly churned;
//! - teardown cancels the active subscription exactly once, whatever
//!   state the machine is in.
//!
//! All transitions run inside the session's serial event loop, which is
//! what keeps "at most one active subscription" an invariant rather than
//! a hope.

use std::sync::{Arc, Mutex};

use parley_remote::{DocumentStore, FeedSubscriber, Subscription};
use parley_shared::{Connectivity, Message};
use parley_store::MessageCache;

pub struct Synchronizer {
    store: Arc<dyn DocumentStore>,
    cache: MessageCache,
    state: Connectivity,
    subscription: Option<Subscription>,
    /// Visible message list, newest first. Shared with whatever renders it.
    messages: Arc<Mutex<Vec<Message>>>,
}

impl Synchronizer {
    pub fn new(store: Arc<dyn DocumentStore>, cache: MessageCache) -> Self {
        Self {
            store,
            cache,
            state: Connectivity::Unknown,
            subscription: None,
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn state(&self) -> Connectivity {
        self.state
    }

    pub fn has_active_subscription(&self) -> bool {
        self.subscription.is_some()
    }

    /// Shared handle to the visible list; the UI layer clones this.
    pub fn messages_handle(&self) -> Arc<Mutex<Vec<Message>>> {
        self.messages.clone()
    }

    /// Current visible list, newest first (the storage order).
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    /// Current visible list, oldest first (the display order).
    pub fn display_messages(&self) -> Vec<Message> {
        let mut messages = self.messages();
        messages.reverse();
        messages
    }

    /// Apply one connectivity reading. `Unknown` readings and readings
    /// equal to the current state do nothing.
    pub async fn handle_reading(&mut self, reading: Connectivity) {
        if reading == self.state || reading == Connectivity::Unknown {
            return;
        }

        match reading {
            Connectivity::Online => self.go_online().await,
            Connectivity::Offline => self.go_offline().await,
            Connectivity::Unknown => unreachable!("filtered above"),
        }
        self.state = reading;
    }

    async fn go_online(&mut self) {
        // Stale handle teardown; none should exist, but a fresh attach
        // must never coexist with an old one.
        if let Some(old) = self.subscription.take() {
            tracing::warn!("stale subscription found while going online");
            old.cancel();
        }

        tracing::info!("going online, attaching live feed");

        let messages = self.messages.clone();
        let cache = self.cache.clone();
        let subscription = FeedSubscriber::attach(self.store.clone(), move |snapshot| {
            *messages.lock().unwrap() = snapshot.clone();

            // Write-through is fire-and-forget: a failed save is logged
            // and the in-memory list stays authoritative.
            let cache = cache.clone();
            tokio::spawn(async move {
                if let Err(e) = cache.save(&snapshot).await {
                    tracing::warn!(error = %e, "failed to cache snapshot");
                }
            });
        })
        .await;

        self.subscription = Some(subscription);
    }

    async fn go_offline(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }

        tracing::info!("going offline, loading cached snapshot");

        let cached = self.cache.load().await.unwrap_or_default();
        *self.messages.lock().unwrap() = cached;
    }

    /// Session teardown: cancel the active subscription unconditionally.
    /// Safe to call in any state and more than once.
    pub fn shutdown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            tracing::debug!("synchronizer shut down");
        }
    }
}

impl Drop for Synchronizer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
