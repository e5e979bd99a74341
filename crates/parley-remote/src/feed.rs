//! Live feed subscription with explicit cancellation.
//!
//! [`FeedSubscriber::attach`] opens exactly one live view per call and
//! delivers every snapshot (full replace, never a delta) to a single
//! handler as canonical messages, newest first. The returned
//! [`Subscription`] handle owns the delivery lifecycle: `cancel()` is
//! idempotent, and once it returns the handler is never invoked again,
//! even for a snapshot already in flight.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use parley_shared::{Message, TransportError};

use crate::record::StoredRecord;
use crate::store::DocumentStore;

/// Receives every delivered snapshot as the complete newest-first list.
pub type SnapshotHandler = Box<dyn FnMut(Vec<Message>) + Send>;

struct Delivery {
    cancelled: bool,
    handler: SnapshotHandler,
}

struct Shared {
    // cancel() and snapshot delivery contend on this lock; holding it
    // across the handler call is what makes "no callback after cancel
    // returns" a hard guarantee instead of a scheduling accident.
    delivery: Mutex<Delivery>,
}

impl Shared {
    /// Deliver one snapshot. Returns `false` once cancelled, at which
    /// point the feed task exits.
    fn deliver(&self, records: Vec<StoredRecord>) -> bool {
        let mut guard = self.delivery.lock().unwrap();
        if guard.cancelled {
            return false;
        }
        let messages: Vec<Message> = records.into_iter().map(StoredRecord::into_message).collect();
        (guard.handler)(messages);
        true
    }
}

/// Handle to an active feed subscription.
pub struct Subscription {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Terminate the subscription. Idempotent: calling it twice, or
    /// after the feed has already closed, has no effect. After this
    /// returns, no further handler invocation occurs for this handle.
    pub fn cancel(&self) {
        let mut guard = self.shared.delivery.lock().unwrap();
        if !guard.cancelled {
            guard.cancelled = true;
            self.task.abort();
            tracing::debug!("feed subscription cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.delivery.lock().unwrap().cancelled
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Opens live subscriptions against a [`DocumentStore`].
pub struct FeedSubscriber;

impl FeedSubscriber {
    /// Start a live subscription: the handler receives the current
    /// snapshot immediately, then every subsequent one until the returned
    /// handle is cancelled.
    ///
    /// The live view is established before this returns; only delivery
    /// runs on the spawned task. A handle cancelled right after attach
    /// has therefore still opened (and closed) a real subscription.
    ///
    /// Transport-level failures are not retried here; they are surfaced
    /// on the error channel via `tracing::error!` and the feed task ends.
    pub async fn attach<F>(store: Arc<dyn DocumentStore>, handler: F) -> Subscription
    where
        F: FnMut(Vec<Message>) + Send + 'static,
    {
        let (initial, mut rx) = store.watch().await;

        let shared = Arc::new(Shared {
            delivery: Mutex::new(Delivery {
                cancelled: false,
                handler: Box::new(handler),
            }),
        });

        let task_shared = shared.clone();
        let task = tokio::spawn(async move {
            if !task_shared.deliver(initial) {
                return;
            }

            loop {
                match rx.recv().await {
                    Ok(snapshot) => {
                        if !task_shared.deliver(snapshot) {
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        // The next successful recv carries a complete
                        // snapshot, so skipped intermediates are harmless.
                        tracing::warn!(error = %TransportError::Lagged(n), "feed lagged");
                    }
                    Err(RecvError::Closed) => {
                        tracing::error!(
                            error = %TransportError::SubscriptionClosed,
                            "feed closed upstream"
                        );
                        return;
                    }
                }
            }
        });

        Subscription { shared, task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MessageRecord;
    use crate::store::MemoryFeed;
    use chrono::Utc;
    use parley_shared::Author;
    use tokio::sync::mpsc;

    fn text_record(text: &str) -> MessageRecord {
        MessageRecord::compose(
            Some(text.into()),
            None,
            Author {
                id: "u1".into(),
                display_name: "Bob".into(),
            },
            Utc::now(),
            false,
        )
    }

    #[tokio::test]
    async fn handler_receives_initial_and_live_snapshots() {
        let store = Arc::new(MemoryFeed::new());
        store.insert(text_record("hi")).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sub = FeedSubscriber::attach(store.clone(), move |messages| {
            let _ = tx.send(messages);
        })
        .await;

        let initial = rx.recv().await.unwrap();
        assert_eq!(initial.len(), 1);
        assert_eq!(initial[0].text.as_deref(), Some("hi"));

        store.insert(text_record("again")).await.unwrap();
        let live = rx.recv().await.unwrap();
        assert_eq!(live.len(), 2);

        sub.cancel();
    }

    #[tokio::test]
    async fn cancel_stops_delivery() {
        let store = Arc::new(MemoryFeed::new());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sub = FeedSubscriber::attach(store.clone(), move |messages| {
            let _ = tx.send(messages);
        })
        .await;

        // Drain the (empty) initial snapshot.
        assert_eq!(rx.recv().await.unwrap(), vec![]);

        sub.cancel();
        store.insert(text_record("late")).await.unwrap();

        // Nothing may arrive after cancel returns.
        let late = tokio::time::timeout(std::time::Duration::from_millis(100), rx.recv()).await;
        assert!(late.is_err(), "snapshot delivered after cancel");
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let store = Arc::new(MemoryFeed::new());
        let sub = FeedSubscriber::attach(store, |_| {}).await;

        sub.cancel();
        sub.cancel();
        assert!(sub.is_cancelled());
    }

    #[tokio::test]
    async fn dropping_the_handle_cancels() {
        let store = Arc::new(MemoryFeed::new());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sub = FeedSubscriber::attach(store.clone(), move |messages| {
            let _ = tx.send(messages);
        })
        .await;
        rx.recv().await.unwrap();

        drop(sub);
        store.insert(text_record("late")).await.unwrap();
        assert_eq!(rx.recv().await, None);
    }
}
