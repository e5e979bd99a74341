//! # parley-shared
//!
//! Domain types shared by every Parley crate: the canonical message shape,
//! session identity, connectivity readings, the error taxonomy, and the
//! fixed keys/identities used by the persistence and welcome layers.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{AuthError, PermissionError, TransportError};
pub use types::*;
