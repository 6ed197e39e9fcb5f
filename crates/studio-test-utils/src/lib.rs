//! Testing utilities for the chatbot studio workspace
//!
//! Shared remote store stub, storage stubs and fixtures.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use studio_model::{
    ChatbotId, Configuration, EngineConfig, PersistenceState,
};
use studio_store::{
    LocalRepository, MemorySlot, PersistenceCoordinator, RemoteError, RemoteStore, SlotError,
    SlotStorage, DEFAULT_CACHE_KEY,
};

/// Id used by the legacy fixture
pub const LEGACY_ID: &str = "chatbot-1700000000000";

/// Behaviour of [`InMemoryRemote`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteMode {
    /// Accepts everything; create of a known id conflicts
    #[default]
    Healthy,
    /// Every call fails as if the network were down
    Unavailable,
    /// Every call is refused with 422
    RejectAll,
    /// Every create conflicts; updates are accepted
    ConflictOnCreate,
}

/// One call observed by [`InMemoryRemote`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Create(ChatbotId),
    Update(ChatbotId),
    List,
    Delete(ChatbotId),
}

/// Remote store stub holding wire bodies in memory
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    mode: Mutex<RemoteMode>,
    entities: Mutex<BTreeMap<String, JsonValue>>,
    calls: Mutex<Vec<RemoteCall>>,
}

impl InMemoryRemote {
    pub fn new(mode: RemoteMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            ..Self::default()
        }
    }

    pub fn healthy() -> Arc<Self> {
        Arc::new(Self::new(RemoteMode::Healthy))
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self::new(RemoteMode::Unavailable))
    }

    pub fn reject_all() -> Arc<Self> {
        Arc::new(Self::new(RemoteMode::RejectAll))
    }

    pub fn set_mode(&self, mode: RemoteMode) {
        *self.mode.lock() = mode;
    }

    /// Seed an entity as if another session had created it
    pub fn insert(&self, config: &Configuration) {
        let wire = config.to_wire().unwrap();
        self.entities.lock().insert(config.id.to_string(), wire);
    }

    /// Stored wire body for `id`
    pub fn stored(&self, id: &ChatbotId) -> Option<JsonValue> {
        self.entities.lock().get(id.as_str()).cloned()
    }

    pub fn len(&self) -> usize {
        self.entities.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.lock().is_empty()
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: RemoteCall) -> Result<(), RemoteError> {
        self.calls.lock().push(call);
        match *self.mode.lock() {
            RemoteMode::Unavailable => Err(RemoteError::Unavailable("connection refused".into())),
            RemoteMode::RejectAll => Err(RemoteError::Rejected {
                status: 422,
                message: "rejected by stub".into(),
            }),
            RemoteMode::Healthy | RemoteMode::ConflictOnCreate => Ok(()),
        }
    }

    fn store(&self, config: &Configuration) -> Result<Configuration, RemoteError> {
        let wire = config.to_wire().map_err(|e| RemoteError::Decode(e.to_string()))?;
        self.entities
            .lock()
            .insert(config.id.to_string(), wire.clone());
        Configuration::from_wire(wire, PersistenceState::CommittedRemote)
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn create(&self, config: &Configuration) -> Result<Configuration, RemoteError> {
        self.record(RemoteCall::Create(config.id.clone()))?;
        let exists = self.entities.lock().contains_key(config.id.as_str());
        if exists || *self.mode.lock() == RemoteMode::ConflictOnCreate {
            return Err(RemoteError::Conflict(config.id.clone()));
        }
        self.store(config)
    }

    async fn update(&self, config: &Configuration) -> Result<Configuration, RemoteError> {
        self.record(RemoteCall::Update(config.id.clone()))?;
        self.store(config)
    }

    async fn list(&self) -> Result<Vec<Configuration>, RemoteError> {
        self.record(RemoteCall::List)?;
        self.entities
            .lock()
            .values()
            .cloned()
            .map(|wire| {
                Configuration::from_wire(wire, PersistenceState::CommittedRemote)
                    .map_err(|e| RemoteError::Decode(e.to_string()))
            })
            .collect()
    }

    async fn delete(&self, id: &ChatbotId) -> Result<(), RemoteError> {
        self.record(RemoteCall::Delete(id.clone()))?;
        self.entities.lock().remove(id.as_str());
        Ok(())
    }
}

/// Slot storage that refuses writes larger than a byte quota
#[derive(Debug)]
pub struct QuotaSlot {
    inner: MemorySlot,
    quota: Mutex<usize>,
}

impl QuotaSlot {
    pub fn new(quota: usize) -> Self {
        Self {
            inner: MemorySlot::new(),
            quota: Mutex::new(quota),
        }
    }

    pub fn set_quota(&self, quota: usize) {
        *self.quota.lock() = quota;
    }
}

impl SlotStorage for QuotaSlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let quota = *self.quota.lock();
        if value.len() > quota {
            return Err(SlotError::QuotaExceeded {
                key: key.to_string(),
                needed: value.len(),
                quota,
            });
        }
        self.inner.write(key, value)
    }
}

/// Default configuration that passes validation
pub fn valid_config(name: &str) -> Configuration {
    let mut config = Configuration::create_default(name);
    config.website = "https://support.example.com".to_string();
    config
}

/// Valid configuration backed by a custom endpoint
pub fn endpoint_config(name: &str, url: &str) -> Configuration {
    let mut config = valid_config(name);
    config.engine = EngineConfig::CustomEndpoint {
        url: url.to_string(),
        auth: studio_model::EndpointAuth::None,
    };
    config
}

/// Configuration carrying a pre-canonical, timestamp-derived id
pub fn legacy_config() -> Configuration {
    let created = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
    let mut config = Configuration::create_default_at("Legacy Bot", "editor", created);
    config.id = ChatbotId::from_raw(LEGACY_ID);
    config.website = "https://legacy.example.com".to_string();
    config.persistence_state = PersistenceState::CommittedRemote;
    config
}

/// Serialized cache array, as it would sit in the slot
pub fn cache_json(configs: &[Configuration]) -> String {
    serde_json::to_string(configs).unwrap()
}

/// Repository over a fresh in-memory slot pre-seeded with `configs`
pub fn seeded_repository(configs: &[Configuration]) -> LocalRepository {
    LocalRepository::new(Arc::new(MemorySlot::with_value(
        DEFAULT_CACHE_KEY,
        cache_json(configs),
    )))
}

/// Coordinator over an empty in-memory cache and `remote`
pub fn coordinator_with(remote: Arc<dyn RemoteStore>) -> PersistenceCoordinator {
    PersistenceCoordinator::new(LocalRepository::new(Arc::new(MemorySlot::new())), remote)
}
