//! Chat session lifecycle.
//!
//! A session is: anonymous sign-in, the one-time welcome notice, then a
//! serial loop feeding connectivity readings into the [`Synchronizer`]
//! until the session closes. Readings and snapshot callbacks are the
//! only two event sources; the loop processes readings one at a time,
//! so synchronizer transitions never interleave.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use parley_remote::{DocumentStore, IdentityProvider, MessageRecord};
use parley_shared::constants::welcome_text;
use parley_shared::{Author, AuthError, Connectivity, Message, SessionIdentity};
use parley_store::{KeyValue, MessageCache, WelcomeMarker};

use crate::composer::Composer;
use crate::connectivity::ConnectivityObserver;
use crate::sync::Synchronizer;

/// Notifications the embedding UI may care about (e.g. the "sending is
/// unavailable" alert on loss of connectivity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionEvent {
    WentOnline,
    WentOffline,
}

/// An open chat session for one signed-in identity.
pub struct ChatSession {
    identity: SessionIdentity,
    composer: Composer,
    synchronizer: Arc<tokio::sync::Mutex<Synchronizer>>,
    loop_task: JoinHandle<()>,
    closed: bool,
}

impl ChatSession {
    /// Sign in and open the room.
    ///
    /// Fails only on identity-provider errors; those are fatal to session
    /// start and must be surfaced to the user. The welcome policy runs
    /// here, before the state machine attaches anything.
    pub async fn open(
        auth: &dyn IdentityProvider,
        store: Arc<dyn DocumentStore>,
        kv: Arc<dyn KeyValue>,
        display_name: &str,
        theme_background: &str,
        theme_text: &str,
        mut connectivity: ConnectivityObserver,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SessionEvent>), AuthError> {
        let user = auth.sign_in_anonymous().await?;
        auth.set_display_name(&user.id, display_name).await?;

        let identity = SessionIdentity {
            user_id: user.id,
            display_name: display_name.to_string(),
            theme_background: theme_background.to_string(),
            theme_text: theme_text.to_string(),
        };
        tracing::info!(user_id = %identity.user_id, name = %identity.display_name, "session opened");

        let marker = WelcomeMarker::new(kv.clone());
        send_welcome(store.as_ref(), &marker, &identity.display_name).await;

        let cache = MessageCache::new(kv);
        let synchronizer = Arc::new(tokio::sync::Mutex::new(Synchronizer::new(
            store.clone(),
            cache,
        )));

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let loop_sync = synchronizer.clone();
        let loop_task = tokio::spawn(async move {
            while let Some(reading) = connectivity.next().await {
                let mut sync = loop_sync.lock().await;
                let before = sync.state();
                sync.handle_reading(reading).await;
                let after = sync.state();
                drop(sync);

                if before != after {
                    let event = match after {
                        Connectivity::Online => SessionEvent::WentOnline,
                        Connectivity::Offline => SessionEvent::WentOffline,
                        Connectivity::Unknown => continue,
                    };
                    let _ = events_tx.send(event);
                }
            }
        });

        let composer = Composer::new(store, identity.clone());

        Ok((
            Self {
                identity,
                composer,
                synchronizer,
                loop_task,
                closed: false,
            },
            events_rx,
        ))
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Shared handle to the visible message list, newest first.
    pub async fn messages_handle(&self) -> Arc<Mutex<Vec<Message>>> {
        self.synchronizer.lock().await.messages_handle()
    }

    /// Current visible list in display order (oldest first).
    pub async fn display_messages(&self) -> Vec<Message> {
        self.synchronizer.lock().await.display_messages()
    }

    pub async fn connectivity_state(&self) -> Connectivity {
        self.synchronizer.lock().await.state()
    }

    /// Tear the session down: stop the reading loop and cancel any active
    /// subscription. Idempotent; also runs on drop.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.loop_task.abort();
        self.synchronizer.lock().await.shutdown();
        tracing::info!(user_id = %self.identity.user_id, "session closed");
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if !self.closed {
            self.loop_task.abort();
            // The synchronizer's own Drop cancels the subscription once
            // the last Arc clone goes away.
        }
    }
}

/// Post the one-time "has entered the chat" notice unless this display
/// name was already welcomed.
///
/// The marker is written only after the remote insert succeeds: a failed
/// welcome is logged and retried on the next session rather than lost
/// forever.
async fn send_welcome(store: &dyn DocumentStore, marker: &WelcomeMarker, display_name: &str) {
    if marker.last_welcomed().await.as_deref() == Some(display_name) {
        tracing::debug!(name = %display_name, "already welcomed, skipping notice");
        return;
    }

    let record = MessageRecord::compose(
        Some(welcome_text(display_name)),
        None,
        Author::system(),
        Utc::now(),
        true,
    );

    match store.insert(record).await {
        Ok(id) => {
            tracing::info!(id = %id, name = %display_name, "welcome notice posted");
            if let Err(e) = marker.mark(display_name).await {
                tracing::warn!(error = %e, "failed to persist welcome marker");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "welcome notice failed, will retry next session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::connectivity_channel;

    use async_trait::async_trait;
    use parley_remote::{AnonymousAuth, AuthUser, MemoryFeed};
    use parley_shared::constants::WELCOME_MARKER_KEY;
    use parley_shared::MessageDraft;
    use parley_store::MemoryKv;

    async fn wait_for<F: Fn() -> bool>(cond: F) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    async fn open_session(
        store: Arc<MemoryFeed>,
        kv: Arc<MemoryKv>,
        name: &str,
    ) -> (
        ChatSession,
        mpsc::UnboundedReceiver<SessionEvent>,
        crate::connectivity::ConnectivitySource,
    ) {
        let (source, observer) = connectivity_channel();
        let (session, events) = ChatSession::open(
            &AnonymousAuth,
            store,
            kv,
            name,
            "#090C08",
            "#FFF",
            observer,
        )
        .await
        .expect("session should open");
        (session, events, source)
    }

    #[tokio::test]
    async fn first_session_posts_exactly_one_welcome() {
        let store = Arc::new(MemoryFeed::new());
        let kv = Arc::new(MemoryKv::new());

        let (mut session, _events, _source) = open_session(store.clone(), kv.clone(), "Ana").await;

        let (snapshot, _rx) = store.watch().await;
        let welcomes: Vec<_> = snapshot
            .iter()
            .filter(|s| s.record.system)
            .collect();
        assert_eq!(welcomes.len(), 1);
        assert_eq!(
            welcomes[0].record.text.as_deref(),
            Some("Ana has entered the chat. Welcome 👋")
        );
        assert_eq!(welcomes[0].record.user.id, "system");
        assert_eq!(
            kv.get(WELCOME_MARKER_KEY).await.unwrap().as_deref(),
            Some("Ana")
        );

        session.close().await;
    }

    #[tokio::test]
    async fn second_session_with_same_name_posts_no_welcome() {
        let store = Arc::new(MemoryFeed::new());
        let kv = Arc::new(MemoryKv::new());

        let (mut first, _e1, _s1) = open_session(store.clone(), kv.clone(), "Ana").await;
        first.close().await;

        let (mut second, _e2, _s2) = open_session(store.clone(), kv.clone(), "Ana").await;
        second.close().await;

        let (snapshot, _rx) = store.watch().await;
        assert_eq!(snapshot.iter().filter(|s| s.record.system).count(), 1);
    }

    #[tokio::test]
    async fn new_name_is_welcomed_again() {
        let store = Arc::new(MemoryFeed::new());
        let kv = Arc::new(MemoryKv::new());

        let (mut first, _e1, _s1) = open_session(store.clone(), kv.clone(), "Ana").await;
        first.close().await;
        let (mut second, _e2, _s2) = open_session(store.clone(), kv.clone(), "Bob").await;
        second.close().await;

        let (snapshot, _rx) = store.watch().await;
        assert_eq!(snapshot.iter().filter(|s| s.record.system).count(), 2);
        assert_eq!(
            kv.get(WELCOME_MARKER_KEY).await.unwrap().as_deref(),
            Some("Bob")
        );
    }

    /// Auth that always fails; session start must not proceed.
    struct RefusingAuth;

    #[async_trait]
    impl IdentityProvider for RefusingAuth {
        async fn sign_in_anonymous(&self) -> Result<AuthUser, AuthError> {
            Err(AuthError::SignInFailed("provider unreachable".into()))
        }

        async fn set_display_name(&self, _user_id: &str, _name: &str) -> Result<(), AuthError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn auth_failure_aborts_session_start() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryFeed::new());
        let kv = Arc::new(MemoryKv::new());
        let (_source, observer) = connectivity_channel();

        let result = ChatSession::open(
            &RefusingAuth,
            store.clone(),
            kv,
            "Ana",
            "#090C08",
            "#FFF",
            observer,
        )
        .await;
        assert!(result.is_err());

        // No welcome was posted either.
        let (snapshot, _rx) = store.watch().await;
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn online_offline_end_to_end() {
        let store = Arc::new(MemoryFeed::new());
        let kv = Arc::new(MemoryKv::new());
        let (mut session, mut events, source) =
            open_session(store.clone(), kv.clone(), "Ana").await;

        source.report(Connectivity::Online);
        assert_eq!(events.recv().await, Some(SessionEvent::WentOnline));

        // The live feed delivers the welcome notice posted at open.
        let handle = session.messages_handle().await;
        wait_for(|| !handle.lock().unwrap().is_empty()).await;

        session
            .composer()
            .send(MessageDraft::Text("hi".into()))
            .await
            .unwrap();
        wait_for(|| handle.lock().unwrap().len() == 2).await;

        // Newest first in storage order; display order is reversed.
        let display = session.display_messages().await;
        assert!(display[0].is_system);
        assert_eq!(display[1].text.as_deref(), Some("hi"));

        // Let the fire-and-forget cache write land before flipping offline.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        source.report(Connectivity::Offline);
        assert_eq!(events.recv().await, Some(SessionEvent::WentOffline));
        assert_eq!(session.connectivity_state().await, Connectivity::Offline);

        // The cached snapshot still backs the visible list.
        assert_eq!(session.display_messages().await.len(), 2);

        // A message posted while we are offline stays invisible.
        store
            .insert(MessageRecord::compose(
                Some("unseen".into()),
                None,
                Author {
                    id: "u9".into(),
                    display_name: "Eve".into(),
                },
                Utc::now(),
                false,
            ))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(session.display_messages().await.len(), 2);

        session.close().await;
    }

    #[tokio::test]
    async fn sending_does_not_mutate_the_list_directly() {
        let store = Arc::new(MemoryFeed::new());
        let kv = Arc::new(MemoryKv::new());
        let (mut session, _events, _source) = open_session(store, kv, "Ana").await;

        // Never went online: no subscription, so a send cannot show up.
        session
            .composer()
            .send(MessageDraft::Text("hello".into()))
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(session.display_messages().await.is_empty());

        session.close().await;
    }
}
