use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Message identifier assigned by the remote store on insert. Opaque to the
// client; stable for the lifetime of the message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl MessageId {
    /// Mint a fresh id. Only the remote store does this; clients never
    /// assign ids locally.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who sent a message. `id` is stable per session, not globally unique
/// across sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub display_name: String,
}

impl Author {
    /// The reserved identity that authors synthetic system notices.
    pub fn system() -> Self {
        Self {
            id: crate::constants::SYSTEM_USER_ID.to_string(),
            display_name: crate::constants::SYSTEM_USER_NAME.to_string(),
        }
    }
}

/// Payload carried alongside (or instead of) message text. Exactly one
/// kind per message; the sum type makes the exclusivity structural.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Attachment {
    Image { url: String },
    Location { latitude: f64, longitude: f64 },
    Audio { url: String },
}

/// The canonical in-memory message shape, used uniformly whether a message
/// came from a remote snapshot, the local cache, or local composition.
///
/// Messages are immutable once created; there is no edit or delete path.
/// Ordering is total and defined by `created_at`: newest first for
/// storage and transmission, oldest first for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Assigned by the remote store; uniqueness is its guarantee, not ours.
    pub id: MessageId,
    /// Plain text body, absent for pure attachment messages.
    pub text: Option<String>,
    /// Sole ordering key.
    pub created_at: DateTime<Utc>,
    pub author: Author,
    /// At most one attachment kind.
    pub attachment: Option<Attachment>,
    /// Synthetic system notice, rendered distinctly, never triggers
    /// further side effects.
    pub is_system: bool,
}

/// A locally composed message before submission. The variants mirror the
/// four composable kinds; `created_at` and the author are stamped by the
/// composer at send time.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageDraft {
    Text(String),
    Image { url: String },
    Location { latitude: f64, longitude: f64 },
    Audio { url: String },
}

/// The authenticated-anonymous user's identity plus chosen theme, valid
/// for one chat session. Produced once at sign-in, passed by value, and
/// re-derived on every app launch, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub display_name: String,
    pub theme_background: String,
    pub theme_text: String,
}

/// A connectivity reading from the host platform.
///
/// `Unknown` is the cold-start value before the first definite reading
/// arrives; consumers must treat it as neither online nor offline and
/// take no action on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    Unknown,
    Online,
    Offline,
}

impl Connectivity {
    /// Map the platform's tri-state `Option<bool>` signal into a reading.
    pub fn from_reading(is_connected: Option<bool>) -> Self {
        match is_connected {
            None => Self::Unknown,
            Some(true) => Self::Online,
            Some(false) => Self::Offline,
        }
    }
}
