//! Error taxonomy for the client core.
//!
//! Only auth and permission failures ever reach the user; transport and
//! cache failures are logged and absorbed so the chat degrades to the
//! offline cached view instead of crashing. Each layer keeps its own
//! enum rather than funnelling through one aggregate, since no call
//! site ever handles more than one of them at a time.

use thiserror::Error;

/// Identity-provider failure. Fatal to session start; surfaced to the
/// user as an alert, never retried.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Anonymous sign-in failed: {0}")]
    SignInFailed(String),

    #[error("Failed to set display name: {0}")]
    ProfileUpdate(String),
}

/// Remote subscription or write failure. Logged, never crashes the
/// session; retry/backoff is the underlying transport's concern.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Remote insert failed: {0}")]
    Insert(String),

    #[error("Subscription channel closed")]
    SubscriptionClosed,

    #[error("Subscription lagged, skipped {0} snapshots")]
    Lagged(u64),
}

/// A capture flow (camera, photo library, location) was denied by the
/// platform. Surfaced as an alert; the operation is aborted.
#[derive(Error, Debug)]
pub enum PermissionError {
    #[error("Permission to access {0} hasn't been granted")]
    Denied(&'static str),
}
