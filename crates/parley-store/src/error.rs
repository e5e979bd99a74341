use thiserror::Error;

/// Errors produced by the store layer.
///
/// None of these are surfaced to the user: cache failures are logged and
/// the in-memory message list stays authoritative.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the data directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization failure.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
