//! Remote durable store interface
//!
//! Bodies exchanged with the store are the wire form of a configuration:
//! the full shape minus `persistenceState`. Implementations decode
//! responses with [`Configuration::from_wire`].

use async_trait::async_trait;
use studio_model::{ChatbotId, Configuration};

use crate::error::RemoteError;

/// Remote durable store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// `POST /configurations`
    ///
    /// # Errors
    /// Returns [`RemoteError::Conflict`] if the id is already known
    async fn create(&self, config: &Configuration) -> Result<Configuration, RemoteError>;

    /// `PUT /configurations/{id}`
    ///
    /// # Errors
    /// Returns error if the store did not accept the update
    async fn update(&self, config: &Configuration) -> Result<Configuration, RemoteError>;

    /// `GET /configurations`
    ///
    /// # Errors
    /// Returns error if the listing could not be fetched or decoded
    async fn list(&self) -> Result<Vec<Configuration>, RemoteError>;

    /// `DELETE /configurations/{id}`
    ///
    /// # Errors
    /// Returns error if the store did not confirm the delete
    async fn delete(&self, id: &ChatbotId) -> Result<(), RemoteError>;
}

/// Store used when no remote is configured; every call is unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRemote;

const OFFLINE: &str = "no remote store configured";

#[async_trait]
impl RemoteStore for OfflineRemote {
    async fn create(&self, _config: &Configuration) -> Result<Configuration, RemoteError> {
        Err(RemoteError::Unavailable(OFFLINE.to_string()))
    }

    async fn update(&self, _config: &Configuration) -> Result<Configuration, RemoteError> {
        Err(RemoteError::Unavailable(OFFLINE.to_string()))
    }

    async fn list(&self) -> Result<Vec<Configuration>, RemoteError> {
        Err(RemoteError::Unavailable(OFFLINE.to_string()))
    }

    async fn delete(&self, _id: &ChatbotId) -> Result<(), RemoteError> {
        Err(RemoteError::Unavailable(OFFLINE.to_string()))
    }
}
