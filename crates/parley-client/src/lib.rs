//! # parley-client
//!
//! The Parley chat client core: the connectivity-driven synchronizer
//! that reconciles the live remote feed with the local snapshot cache,
//! the message composer, and the session lifecycle (anonymous sign-in
//! and the one-time welcome notice).
//!
//! Everything visual (screens, bubbles, pickers) lives in the
//! embedding UI; this crate only owns the state the UI renders.

pub mod composer;
pub mod config;
pub mod connectivity;
pub mod session;
pub mod sync;

pub use composer::Composer;
pub use config::ClientConfig;
pub use connectivity::{connectivity_channel, ConnectivityObserver, ConnectivitySource};
pub use session::{ChatSession, SessionEvent};
pub use sync::Synchronizer;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise tracing for an embedding application.
///
/// Honors `RUST_LOG` when set; otherwise defaults to debug for the
/// client crates and warn for everything else.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("parley_client=debug,parley_remote=debug,parley_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
