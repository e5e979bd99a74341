//! Message composition and submission.
//!
//! The composer turns a locally created draft into a wire record,
//! stamping the session author and `created_at = now`, and hands it to
//! the remote store. It never touches the in-memory list or the cache:
//! a sent message becomes visible only when the live feed's next
//! snapshot includes it (or, while offline, not until reconnection; any
//! queueing is the transport's concern).

use std::sync::Arc;

use chrono::Utc;

use parley_remote::{DocumentStore, MessageRecord};
use parley_shared::{Attachment, Author, MessageDraft, MessageId, SessionIdentity, TransportError};

pub struct Composer {
    store: Arc<dyn DocumentStore>,
    identity: SessionIdentity,
}

impl Composer {
    pub fn new(store: Arc<dyn DocumentStore>, identity: SessionIdentity) -> Self {
        Self { store, identity }
    }

    /// Submit one draft. The remote store assigns the id.
    pub async fn send(&self, draft: MessageDraft) -> Result<MessageId, TransportError> {
        let (text, attachment) = match draft {
            MessageDraft::Text(text) => (Some(text), None),
            MessageDraft::Image { url } => (None, Some(Attachment::Image { url })),
            MessageDraft::Location {
                latitude,
                longitude,
            } => (
                None,
                Some(Attachment::Location {
                    latitude,
                    longitude,
                }),
            ),
            MessageDraft::Audio { url } => (None, Some(Attachment::Audio { url })),
        };

        let record = MessageRecord::compose(
            text,
            attachment,
            Author {
                id: self.identity.user_id.clone(),
                display_name: self.identity.display_name.clone(),
            },
            Utc::now(),
            false,
        );

        let id = self.store.insert(record).await?;
        tracing::debug!(id = %id, "message sent");
        Ok(id)
    }
}
