//! Error types for persistence

use std::path::PathBuf;

use studio_model::{ChatbotId, ModelError, ValidationReport, VersioningError};

/// Failure talking to the remote durable store
///
/// Every variant is recoverable by a local commit; see
/// [`RemoteError::is_recoverable`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    /// Transport failure, timeout or 5xx response
    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    /// Create attempted for an id the store already knows
    #[error("configuration {0} already exists in the remote store")]
    Conflict(ChatbotId),

    /// Request refused by the store
    #[error("remote store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Response body did not decode into a configuration
    #[error("could not decode remote response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether a local fallback can absorb this failure
    ///
    /// Always true: every remote failure degrades to a local commit.
    #[inline]
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn is_recoverable(&self) -> bool {
        true
    }

    /// Whether the store reported an existing entity
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Failure of the local cache slot
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    /// Filesystem error
    #[error("cache slot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Storage quota would be exceeded by the write
    #[error("cache slot {key} quota exceeded: {needed} bytes, {quota} available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
}

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Configuration failed validation; nothing was written
    #[error("configuration is invalid: {0}")]
    Validation(ValidationReport),

    /// Local cache write failed; the operation did not happen
    #[error("local cache write failed: {0}")]
    LocalWrite(#[source] SlotError),

    /// Local cache read failed
    #[error("local cache read failed: {0}")]
    LocalRead(#[source] SlotError),

    /// Local cache holds something other than a configuration array
    #[error("local cache is corrupt: {0}")]
    LocalParse(#[source] serde_json::Error),

    /// A commit for this id has not resolved yet
    #[error("a save for configuration {0} is already in flight")]
    CommitInFlight(ChatbotId),

    /// No configuration with this id in the local cache
    #[error("configuration {0} not found")]
    NotFound(ChatbotId),

    /// Remote error on an operation with no local fallback
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Version transition refused
    #[error(transparent)]
    Versioning(#[from] VersioningError),

    /// Model error
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl StoreError {
    /// Whether the user's edit could not be kept anywhere
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::LocalWrite(_))
    }
}
