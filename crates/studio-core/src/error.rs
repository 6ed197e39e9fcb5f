//! Error types for the editing session

use studio_model::{ChatbotId, ImportError, ModelError, ValidationReport, VersioningError};
use studio_preview::TransportError;
use studio_store::StoreError;

use crate::config::ConfigError;

/// Studio error type
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Save refused; nothing reached either backend
    #[error("configuration is invalid: {0}")]
    Validation(ValidationReport),

    /// No configuration with this id
    #[error("configuration {0} not found")]
    NotFound(ChatbotId),

    /// Embed requested before the first publish
    #[error("configuration {0} has never been published")]
    NotPublished(ChatbotId),

    /// Imported document rejected
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Version transition refused
    #[error(transparent)]
    Versioning(#[from] VersioningError),

    /// Persistence failure
    #[error(transparent)]
    Store(StoreError),

    /// Model error
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Preview channel failure
    #[error("preview: {0}")]
    Preview(#[from] TransportError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StudioError {
    /// Whether the user's edit was lost for this operation
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_fatal())
    }
}

impl From<StoreError> for StudioError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(report) => Self::Validation(report),
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Versioning(e) => Self::Versioning(e),
            StoreError::Model(e) => Self::Model(e),
            other => Self::Store(other),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, StudioError>;
