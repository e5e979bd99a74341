//! Wire record shape and conversion to the canonical message.
//!
//! The remote store holds records with optional attachment fields; the
//! client converts them into [`Message`] values with a tagged attachment
//! sum the moment they cross the wire, so mutual exclusivity is enforced
//! structurally everywhere past this module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_shared::{Attachment, Author, Message, MessageId};

/// Author as stored on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationRecord {
    pub latitude: f64,
    pub longitude: f64,
}

/// A message record as held by the remote document store.
///
/// `created_at` is the store-native timestamp: milliseconds since the
/// Unix epoch. At most one of `image`, `location`, `audio` should be set;
/// a malformed record with several is resolved by precedence on decode
/// (image, then location, then audio).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: i64,

    pub user: AuthorRecord,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationRecord>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub system: bool,
}

impl MessageRecord {
    /// Build a record from canonical parts at send time.
    pub fn compose(
        text: Option<String>,
        attachment: Option<Attachment>,
        author: Author,
        created_at: DateTime<Utc>,
        system: bool,
    ) -> Self {
        let mut record = Self {
            text,
            created_at: created_at.timestamp_millis(),
            user: AuthorRecord {
                id: author.id,
                name: author.display_name,
            },
            image: None,
            location: None,
            audio: None,
            system,
        };
        match attachment {
            Some(Attachment::Image { url }) => record.image = Some(url),
            Some(Attachment::Location {
                latitude,
                longitude,
            }) => {
                record.location = Some(LocationRecord {
                    latitude,
                    longitude,
                })
            }
            Some(Attachment::Audio { url }) => record.audio = Some(url),
            None => {}
        }
        record
    }

    /// Resolve the optional wire fields into the tagged attachment sum.
    ///
    /// Precedence for malformed multi-attachment records: image, then
    /// location, then audio.
    pub fn attachment(&self) -> Option<Attachment> {
        let set = [
            self.image.is_some(),
            self.location.is_some(),
            self.audio.is_some(),
        ]
        .iter()
        .filter(|&&s| s)
        .count();
        if set > 1 {
            tracing::warn!("record carries multiple attachments, keeping the first by precedence");
        }

        if let Some(url) = &self.image {
            return Some(Attachment::Image { url: url.clone() });
        }
        if let Some(loc) = &self.location {
            return Some(Attachment::Location {
                latitude: loc.latitude,
                longitude: loc.longitude,
            });
        }
        if let Some(url) = &self.audio {
            return Some(Attachment::Audio { url: url.clone() });
        }
        None
    }

    /// Convert into the canonical message under a store-assigned id.
    pub fn into_message(self, id: MessageId) -> Message {
        let attachment = self.attachment();
        Message {
            id,
            text: self.text,
            created_at: DateTime::<Utc>::from_timestamp_millis(self.created_at)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            author: Author {
                id: self.user.id,
                display_name: self.user.name,
            },
            attachment,
            is_system: self.system,
        }
    }
}

/// A record paired with the id the store assigned it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: MessageId,
    pub record: MessageRecord,
}

impl StoredRecord {
    pub fn into_message(self) -> Message {
        self.record.into_message(self.id)
    }
}
