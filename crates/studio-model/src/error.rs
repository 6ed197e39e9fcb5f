//! Error types for the configuration model

use crate::ids::ChatbotId;
use crate::validate::ValidationReport;

/// Structural model errors
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A configuration without any version record
    #[error("configuration {0} has no version history")]
    EmptyHistory(ChatbotId),

    /// `current_version` out of step with the newest record
    #[error("configuration {id}: current version {current} does not match latest record {latest}")]
    VersionMismatch {
        id: ChatbotId,
        current: String,
        latest: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Rejection of an imported configuration document
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Document is empty
    #[error("import document is empty")]
    Empty,

    /// Neither valid JSON nor valid YAML
    #[error("import document could not be parsed: {0}")]
    Parse(String),

    /// Parsed, but not a configuration
    #[error("import document is not a configuration: {0}")]
    Shape(String),

    /// A configuration, but one that fails validation
    #[error("imported configuration is invalid: {0}")]
    Invalid(ValidationReport),
}
