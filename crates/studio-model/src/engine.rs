//! Execution backend selection
//!
//! A chatbot talks to exactly one backend kind at a time. Each variant
//! carries only the fields that kind needs, so an inactive kind can never
//! leak stale fields into validation.

use serde::{Deserialize, Serialize};

/// The active execution backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EngineConfig {
    /// Customer-hosted HTTP endpoint
    #[serde(rename_all = "camelCase")]
    CustomEndpoint {
        /// Endpoint URL (`scheme://...`)
        url: String,
        /// How requests authenticate against the endpoint
        #[serde(default)]
        auth: EndpointAuth,
    },
    /// Hosted engine managed by the platform
    #[serde(rename_all = "camelCase")]
    ManagedEngine {
        /// Engine identifier
        engine_id: String,
        /// Engine credential
        #[serde(default)]
        api_key: String,
        /// Behavioral parameters
        #[serde(default)]
        params: BehaviorParams,
    },
    /// Direct model reference
    #[serde(rename_all = "camelCase")]
    ModelReference {
        /// Model identifier
        model_id: String,
        /// Behavioral parameters
        #[serde(default)]
        params: BehaviorParams,
    },
    /// Hosted agent reference
    #[serde(rename_all = "camelCase")]
    AgentReference {
        /// Agent identifier
        agent_id: String,
        /// Credential granting access to the agent
        credential: String,
    },
    /// Hosted workflow reference
    #[serde(rename_all = "camelCase")]
    WorkflowReference {
        /// Workflow identifier
        workflow_id: String,
        /// Credential granting access to the workflow
        credential: String,
    },
}

impl EngineConfig {
    /// Stable wire name of the active kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EngineKind {
        match self {
            Self::CustomEndpoint { .. } => EngineKind::CustomEndpoint,
            Self::ManagedEngine { .. } => EngineKind::ManagedEngine,
            Self::ModelReference { .. } => EngineKind::ModelReference,
            Self::AgentReference { .. } => EngineKind::AgentReference,
            Self::WorkflowReference { .. } => EngineKind::WorkflowReference,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::ModelReference {
            model_id: DEFAULT_MODEL_ID.to_string(),
            params: BehaviorParams::default(),
        }
    }
}

/// Model used by brand-new configurations
pub const DEFAULT_MODEL_ID: &str = "gpt-4o-mini";

/// Backend kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// See [`EngineConfig::CustomEndpoint`]
    CustomEndpoint,
    /// See [`EngineConfig::ManagedEngine`]
    ManagedEngine,
    /// See [`EngineConfig::ModelReference`]
    ModelReference,
    /// See [`EngineConfig::AgentReference`]
    AgentReference,
    /// See [`EngineConfig::WorkflowReference`]
    WorkflowReference,
}

impl EngineKind {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomEndpoint => "custom-endpoint",
            Self::ManagedEngine => "managed-engine",
            Self::ModelReference => "model-reference",
            Self::AgentReference => "agent-reference",
            Self::WorkflowReference => "workflow-reference",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication descriptor for a custom endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EndpointAuth {
    /// No authentication
    #[default]
    None,
    /// `Authorization: Bearer <token>`
    Bearer {
        /// Bearer token
        token: String,
    },
    /// Arbitrary header
    Header {
        /// Header name
        name: String,
        /// Header value
        value: String,
    },
}

/// Behavioral parameters shared by model-backed kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorParams {
    /// System prompt prepended to every conversation
    #[serde(default)]
    pub system_prompt: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum response tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for BehaviorParams {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful assistant.".to_string(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}
