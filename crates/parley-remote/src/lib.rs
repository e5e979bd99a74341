//! # parley-remote
//!
//! The remote collaborators of the Parley client: the document-store
//! contract (ordered live subscription plus single-record insert), the
//! wire record shape and its conversion to the canonical message, the
//! cancellable feed subscriber, and the identity/blob provider traits.
//!
//! The store itself is external; [`MemoryFeed`] is an in-process
//! implementation of the same contract used by tests and local runs.

pub mod auth;
pub mod blob;
pub mod feed;
pub mod record;
pub mod store;

pub use auth::{AnonymousAuth, AuthUser, IdentityProvider};
pub use blob::{blob_reference, BlobRef, BlobStore, MemoryBlobStore};
pub use feed::{FeedSubscriber, SnapshotHandler, Subscription};
pub use record::{AuthorRecord, LocationRecord, MessageRecord, StoredRecord};
pub use store::{DocumentStore, MemoryFeed};
