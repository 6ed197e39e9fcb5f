//! HTTP client for the remote configuration store

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use studio_model::{ChatbotId, Configuration, PersistenceState};

use crate::error::RemoteError;
use crate::remote::RemoteStore;

/// Error body returned by the store
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(alias = "message")]
    error: String,
}

/// [`RemoteStore`] over a JSON REST API
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemoteStore {
    /// Client for the store at `base_url`
    ///
    /// `timeout` bounds each request; `None` leaves it to the transport.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, RemoteError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RemoteError::Unavailable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Base URL of the store
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/configurations", self.base_url)
    }

    fn entity_url(&self, id: &ChatbotId) -> String {
        format!("{}/configurations/{}", self.base_url, id)
    }

    async fn decode_one(response: Response) -> Result<Configuration, RemoteError> {
        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Configuration::from_wire(body, PersistenceState::CommittedRemote)
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

fn transport_error(err: &reqwest::Error) -> RemoteError {
    RemoteError::Unavailable(err.to_string())
}

/// Map a non-success response onto the error taxonomy
async fn failure(response: Response, id: Option<&ChatbotId>) -> RemoteError {
    let status = response.status();
    if status == StatusCode::CONFLICT {
        if let Some(id) = id {
            return RemoteError::Conflict(id.clone());
        }
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|body| body.error)
        .unwrap_or(text);

    if status.is_server_error() {
        RemoteError::Unavailable(format!("{status}: {message}"))
    } else {
        RemoteError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn create(&self, config: &Configuration) -> Result<Configuration, RemoteError> {
        let body = config.to_wire().map_err(|e| RemoteError::Decode(e.to_string()))?;
        let response = self
            .client
            .post(self.collection_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if response.status().is_success() {
            Self::decode_one(response).await
        } else {
            Err(failure(response, Some(&config.id)).await)
        }
    }

    async fn update(&self, config: &Configuration) -> Result<Configuration, RemoteError> {
        let body = config.to_wire().map_err(|e| RemoteError::Decode(e.to_string()))?;
        let response = self
            .client
            .put(self.entity_url(&config.id))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if response.status().is_success() {
            Self::decode_one(response).await
        } else {
            Err(failure(response, None).await)
        }
    }

    async fn list(&self) -> Result<Vec<Configuration>, RemoteError> {
        let response = self
            .client
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if !response.status().is_success() {
            return Err(failure(response, None).await);
        }

        let items: Vec<JsonValue> = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        items
            .into_iter()
            .map(|item| {
                Configuration::from_wire(item, PersistenceState::CommittedRemote)
                    .map_err(|e| RemoteError::Decode(e.to_string()))
            })
            .collect()
    }

    async fn delete(&self, id: &ChatbotId) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.entity_url(id))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(failure(response, None).await)
        }
    }
}
