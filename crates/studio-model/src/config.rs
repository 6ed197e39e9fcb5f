//! The chatbot configuration aggregate
//!
//! [`Configuration`] is the mutable aggregate root edited by the studio.
//! Its version history is an append-only list of [`VersionRecord`]s and the
//! `current_version` label always mirrors the newest record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::deployment::Deployment;
use crate::engine::EngineConfig;
use crate::error::ModelError;
use crate::hash::ContentHash;
use crate::ids::ChatbotId;
use crate::presentation::PresentationBlob;
use crate::version::{VersionRecord, INITIAL_VERSION};

/// Author label used when no editor identity is known
pub const DEFAULT_AUTHOR: &str = "editor";

/// Description written on the record created with a configuration
pub const INITIAL_CHANGES: &str = "Initial version";

/// Key of the derived persistence flag in serialized form
const PERSISTENCE_STATE_KEY: &str = "persistenceState";

/// Where the authoritative copy of a configuration lives
///
/// Tracked in the local cache, never sent to the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistenceState {
    /// Has been accepted by the remote store at least once
    CommittedRemote,
    /// Has only ever been written to the local cache
    #[default]
    LocalOnly,
}

impl PersistenceState {
    /// Whether a remote counterpart exists
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::CommittedRemote)
    }
}

/// Chatbot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Identity, immutable once assigned
    pub id: ChatbotId,
    /// Display name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Website the chatbot is deployed on
    #[serde(default)]
    pub website: String,
    /// Active execution backend
    #[serde(rename = "engineConfig")]
    pub engine: EngineConfig,
    /// Opaque presentation payload
    #[serde(default)]
    pub presentation: PresentationBlob,
    /// Deployment surface and placement
    #[serde(default)]
    pub deployment: Deployment,
    /// Label of the newest version record
    pub current_version: String,
    /// Whether a publish record exists
    #[serde(default)]
    pub is_published: bool,
    /// History, oldest first
    #[serde(default)]
    pub versions: Vec<VersionRecord>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Location of the authoritative copy (local bookkeeping only)
    #[serde(default)]
    pub persistence_state: PersistenceState,
}

impl Configuration {
    /// Fully populated configuration with one initial, unpublished record
    #[must_use]
    pub fn create_default(name: impl Into<String>) -> Self {
        Self::create_default_at(name, DEFAULT_AUTHOR, Utc::now())
    }

    /// [`Configuration::create_default`] with explicit author and clock
    #[must_use]
    pub fn create_default_at(
        name: impl Into<String>,
        author: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let mut config = Self {
            id: ChatbotId::generate(),
            name: name.into(),
            description: String::new(),
            website: String::new(),
            engine: EngineConfig::default(),
            presentation: PresentationBlob::default_theme(),
            deployment: Deployment::default(),
            current_version: INITIAL_VERSION.to_string(),
            is_published: false,
            versions: Vec::new(),
            created_at: now,
            updated_at: now,
            persistence_state: PersistenceState::LocalOnly,
        };
        config.reset_history(author, now);
        config
    }

    /// Deep copy under a fresh identity
    ///
    /// The copy is unpublished, local-only and starts a new single-record
    /// history. `new_name` defaults to `"<name> (Copy)"`.
    #[must_use]
    pub fn duplicate(&self, new_name: Option<&str>, author: &str) -> Self {
        let now = Utc::now();
        let mut copy = self.clone();
        copy.id = ChatbotId::generate();
        copy.name = new_name.map_or_else(|| format!("{} (Copy)", self.name), str::to_string);
        copy.is_published = false;
        copy.created_at = now;
        copy.updated_at = now;
        copy.persistence_state = PersistenceState::LocalOnly;
        copy.reset_history(author, now);
        copy
    }

    fn reset_history(&mut self, author: &str, now: DateTime<Utc>) {
        let record = VersionRecord::new(INITIAL_VERSION, author, false, INITIAL_CHANGES, now)
            .with_snapshot(self.snapshot());
        self.current_version = INITIAL_VERSION.to_string();
        self.versions = vec![record];
    }

    /// Content snapshot (everything except identity, history and timestamps)
    #[must_use]
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            name: self.name.clone(),
            description: self.description.clone(),
            website: self.website.clone(),
            engine: self.engine.clone(),
            presentation: self.presentation.clone(),
            deployment: self.deployment.clone(),
        }
    }

    /// Replace content fields from a snapshot; identity and history untouched
    pub fn apply_snapshot(&mut self, snapshot: &ConfigSnapshot) {
        self.name = snapshot.name.clone();
        self.description = snapshot.description.clone();
        self.website = snapshot.website.clone();
        self.engine = snapshot.engine.clone();
        self.presentation = snapshot.presentation.clone();
        self.deployment = snapshot.deployment.clone();
    }

    /// Mark the draft as modified now
    #[inline]
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Newest version record
    #[inline]
    #[must_use]
    pub fn latest_record(&self) -> Option<&VersionRecord> {
        self.versions.last()
    }

    /// Check the history invariants
    ///
    /// # Errors
    /// Returns [`ModelError::EmptyHistory`] or [`ModelError::VersionMismatch`]
    pub fn check_history(&self) -> Result<(), ModelError> {
        let last = self
            .versions
            .last()
            .ok_or_else(|| ModelError::EmptyHistory(self.id.clone()))?;
        if last.version != self.current_version {
            return Err(ModelError::VersionMismatch {
                id: self.id.clone(),
                current: self.current_version.clone(),
                latest: last.version.clone(),
            });
        }
        Ok(())
    }

    /// Wire representation: the full shape minus derived fields
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_wire(&self) -> Result<JsonValue, ModelError> {
        let mut value = serde_json::to_value(self)?;
        if let Some(map) = value.as_object_mut() {
            map.remove(PERSISTENCE_STATE_KEY);
        }
        Ok(value)
    }

    /// Decode a wire representation
    ///
    /// Any `persistenceState` present on the wire is ignored; the caller
    /// decides where the decoded copy lives.
    ///
    /// # Errors
    /// Returns error if the value does not match the configuration shape
    pub fn from_wire(mut value: JsonValue, state: PersistenceState) -> Result<Self, ModelError> {
        if let Some(map) = value.as_object_mut() {
            map.remove(PERSISTENCE_STATE_KEY);
        }
        let mut config: Self = serde_json::from_value(value)?;
        config.persistence_state = state;
        Ok(config)
    }
}

/// Configuration content captured by a version record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    /// Display name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Website
    #[serde(default)]
    pub website: String,
    /// Execution backend
    #[serde(rename = "engineConfig")]
    pub engine: EngineConfig,
    /// Presentation payload
    #[serde(default)]
    pub presentation: PresentationBlob,
    /// Deployment settings
    #[serde(default)]
    pub deployment: Deployment,
}

impl ConfigSnapshot {
    /// Fingerprint of the snapshot content
    ///
    /// Presentation is folded in through its canonical hash so key order in
    /// the opaque payload never changes the result.
    #[must_use]
    pub fn fingerprint(&self) -> ContentHash {
        let engine = serde_json::to_vec(&self.engine).unwrap_or_default();
        let deployment = serde_json::to_vec(&self.deployment).unwrap_or_default();
        ContentHash::builder()
            .text(&self.name)
            .text(&self.description)
            .text(&self.website)
            .field(&engine)
            .nested(&self.presentation.hash())
            .field(&deployment)
            .finish()
    }
}
