//! # parley-store
//!
//! Local key-value persistence for the Parley client.
//!
//! Two logical keys exist: the serialized message-list snapshot (read when
//! the session goes offline, overwritten on every remote update) and the
//! welcome-sent marker (the display name last greeted). There is no schema
//! versioning; a value that fails to parse is treated as absent.

pub mod cache;
pub mod kv;
pub mod welcome;

mod error;

pub use cache::MessageCache;
pub use error::StoreError;
pub use kv::{FileKv, KeyValue, MemoryKv};
pub use welcome::WelcomeMarker;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
