//! Editing session
//!
//! [`Studio`] ties the components together along the editor's control
//! flow: mutate a draft, commit it (remote-first, local-fallback), stamp
//! versions, forward every state change to an attached preview, and
//! generate embed snippets from published state.

use std::sync::Arc;

use chrono::Utc;
use studio_model::{
    export_document, import_document, ChatbotId, Configuration, DeploymentDescriptorGenerator,
    PublishState, VersionId, VersionRecord, VersioningEngine,
};
use studio_preview::{preview_url, Envelope, InboundEvent, PreviewSyncChannel};
use studio_store::{
    CommitOutcome, FileSlot, HttpRemoteStore, LocalRepository, OfflineRemote,
    PersistenceCoordinator, PullReport, RemoteStore,
};

use crate::config::StudioConfig;
use crate::error::{Result, StudioError};

/// One editor session over the configuration collection
#[derive(Debug)]
pub struct Studio {
    config: StudioConfig,
    store: PersistenceCoordinator,
    generator: DeploymentDescriptorGenerator,
    preview: Option<PreviewSyncChannel>,
}

impl Studio {
    /// Session backed by the file cache and remote store named in `config`
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be built
    pub fn open(config: StudioConfig) -> Result<Self> {
        config.validate()?;

        let slot = Arc::new(FileSlot::new(config.cache.dir.clone()));
        let repository = LocalRepository::with_key(slot, config.cache.key.clone());
        let remote: Arc<dyn RemoteStore> = match &config.remote.base_url {
            Some(url) => Arc::new(
                HttpRemoteStore::new(url.clone(), config.remote.timeout())
                    .map_err(studio_store::StoreError::from)?,
            ),
            None => Arc::new(OfflineRemote),
        };

        tracing::info!(
            cache = %config.cache.dir.display(),
            remote = config.remote.base_url.as_deref().unwrap_or("none"),
            "opening studio"
        );
        Ok(Self::with_store(
            config,
            PersistenceCoordinator::new(repository, remote),
        ))
    }

    /// Session over an existing coordinator
    ///
    /// The coordinator's versioning engine is replaced by one writing
    /// records as `config.author`.
    #[must_use]
    pub fn with_store(config: StudioConfig, store: PersistenceCoordinator) -> Self {
        let store = store.with_versioning(VersioningEngine::new(config.author.clone()));
        let generator = DeploymentDescriptorGenerator::new(config.embed.origin.clone());
        Self {
            config,
            store,
            generator,
            preview: None,
        }
    }

    /// Settings the session was opened with
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Underlying persistence coordinator
    #[inline]
    #[must_use]
    pub fn store(&self) -> &PersistenceCoordinator {
        &self.store
    }

    /// All configurations, legacy ids migrated
    ///
    /// # Errors
    /// Returns error if the local cache cannot be read
    pub fn list(&self) -> Result<Vec<Configuration>> {
        Ok(self.store.load()?)
    }

    /// Configuration by id
    ///
    /// # Errors
    /// Returns [`StudioError::NotFound`] if no such id is cached
    pub fn get(&self, id: &ChatbotId) -> Result<Configuration> {
        self.list()?
            .into_iter()
            .find(|config| &config.id == id)
            .ok_or_else(|| StudioError::NotFound(id.clone()))
    }

    /// New local-only draft with default values
    ///
    /// # Errors
    /// Returns error if the local cache write fails
    pub fn create(&self, name: &str) -> Result<Configuration> {
        let config = Configuration::create_default_at(name, &self.config.author, Utc::now());
        self.store.stage(&config)?;
        tracing::info!(id = %config.id, name = %config.name, "created configuration");
        Ok(config)
    }

    /// Forward an edited draft to the preview
    ///
    /// Nothing is persisted; call [`Studio::save`] to commit.
    pub fn update_draft(&mut self, config: &Configuration) {
        self.forward(config);
    }

    /// Stamp the next version and commit
    ///
    /// # Errors
    /// Returns error on validation failure, a save already in flight for
    /// this id, or a failed local write
    pub async fn save(&mut self, config: &Configuration, changes: &str) -> Result<CommitOutcome> {
        let outcome = self.store.commit(config, changes).await?;
        self.forward(&outcome.config);
        Ok(outcome)
    }

    /// Mark the current version live and commit
    ///
    /// # Errors
    /// As [`Studio::save`], plus publishing before the first save
    pub async fn publish(&mut self, config: &Configuration) -> Result<CommitOutcome> {
        let outcome = self.store.publish(config).await?;
        self.forward(&outcome.config);
        Ok(outcome)
    }

    /// Restore a recorded version as a new save
    ///
    /// # Errors
    /// Returns error if the id or version is unknown, or the commit fails
    pub async fn rollback(&mut self, id: &ChatbotId, version_id: &VersionId) -> Result<CommitOutcome> {
        let config = self.get(id)?;
        let outcome = self.store.rollback(&config, version_id).await?;
        self.forward(&outcome.config);
        Ok(outcome)
    }

    /// Records of a configuration, newest first
    ///
    /// # Errors
    /// Returns [`StudioError::NotFound`] for an unknown id
    pub fn history(&self, id: &ChatbotId) -> Result<Vec<VersionRecord>> {
        let config = self.get(id)?;
        Ok(VersioningEngine::history(&config).cloned().collect())
    }

    /// Live published record, if any
    ///
    /// # Errors
    /// Returns [`StudioError::NotFound`] for an unknown id
    pub fn latest_published(&self, id: &ChatbotId) -> Result<Option<VersionRecord>> {
        let config = self.get(id)?;
        Ok(VersioningEngine::latest_published(&config).cloned())
    }

    /// Publish status
    ///
    /// # Errors
    /// Returns [`StudioError::NotFound`] for an unknown id
    pub fn state(&self, id: &ChatbotId) -> Result<PublishState> {
        Ok(VersioningEngine::state(&self.get(id)?))
    }

    /// Copy under a fresh id, staged locally
    ///
    /// # Errors
    /// Returns error if the source is unknown or the cache write fails
    pub fn duplicate(&self, id: &ChatbotId, new_name: Option<&str>) -> Result<Configuration> {
        let copy = self.get(id)?.duplicate(new_name, &self.config.author);
        self.store.stage(&copy)?;
        tracing::info!(source = %id, id = %copy.id, "duplicated configuration");
        Ok(copy)
    }

    /// Remove a configuration
    ///
    /// # Errors
    /// Returns error if the id is unknown or the cache write fails
    pub async fn delete(&self, id: &ChatbotId) -> Result<Configuration> {
        Ok(self.store.remove(id).await?)
    }

    /// Import a JSON or YAML document as a local-only configuration
    ///
    /// An id already in the collection is replaced by a fresh one so the
    /// existing entry is never overwritten.
    ///
    /// # Errors
    /// Returns [`StudioError::Import`] if the document is rejected
    pub fn import(&self, text: &str) -> Result<Configuration> {
        let mut config = import_document(text)?;
        let existing = self.list()?;
        if existing.iter().any(|other| other.id == config.id) {
            let fresh = ChatbotId::generate();
            tracing::info!(imported = %config.id, id = %fresh, "import id already present, assigning new id");
            config.id = fresh;
        }
        self.store.stage(&config)?;
        Ok(config)
    }

    /// Document for a configuration, in wire shape
    ///
    /// # Errors
    /// Returns error if the id is unknown or serialization fails
    pub fn export(&self, id: &ChatbotId) -> Result<String> {
        Ok(export_document(&self.get(id)?)?)
    }

    /// Loader snippet serving the live published version
    ///
    /// # Errors
    /// Returns [`StudioError::NotPublished`] if the configuration was never
    /// published
    pub fn embed_code(&self, id: &ChatbotId) -> Result<String> {
        let config = self.get(id)?;
        let record = VersioningEngine::latest_published(&config)
            .ok_or_else(|| StudioError::NotPublished(id.clone()))?;

        let mut live = config.clone();
        if let Some(snapshot) = &record.config_snapshot {
            live.apply_snapshot(snapshot);
        }
        Ok(self.generator.generate(&live))
    }

    /// Address of the render surface for a configuration
    ///
    /// # Errors
    /// Returns [`StudioError::NotFound`] for an unknown id
    pub fn preview_url(&self, id: &ChatbotId) -> Result<String> {
        let config = self.get(id)?;
        Ok(preview_url(
            &self.config.preview.origin,
            &config.id,
            config.deployment.surface,
            Some(self.config.preview.device),
        ))
    }

    /// Attach a preview channel, tearing down any previous one
    pub fn attach_preview(&mut self, channel: PreviewSyncChannel) {
        self.detach_preview();
        tracing::debug!(surface = %channel.target(), "preview attached");
        self.preview = Some(channel);
    }

    /// Tear down the attached preview channel
    pub fn detach_preview(&mut self) {
        if let Some(mut channel) = self.preview.take() {
            channel.teardown();
        }
    }

    /// Attached preview channel, if any
    #[inline]
    #[must_use]
    pub fn preview(&self) -> Option<&PreviewSyncChannel> {
        self.preview.as_ref()
    }

    /// Attached preview channel, mutably
    #[inline]
    pub fn preview_mut(&mut self) -> Option<&mut PreviewSyncChannel> {
        self.preview.as_mut()
    }

    /// Deliver a signal from the render surface
    ///
    /// # Errors
    /// Returns error if a triggered resync could not be delivered
    pub fn handle_preview_signal(&mut self, envelope: &Envelope) -> Result<Option<InboundEvent>> {
        match self.preview.as_mut() {
            Some(channel) => Ok(channel.handle_inbound(envelope)?),
            None => Ok(None),
        }
    }

    /// Mirror the remote store into the local cache
    ///
    /// # Errors
    /// Returns error if the remote listing fails or the cache write fails
    pub async fn pull(&self) -> Result<PullReport> {
        Ok(self.store.pull().await?)
    }

    fn forward(&mut self, config: &Configuration) {
        if let Some(channel) = self.preview.as_mut() {
            if let Err(e) = channel.update_draft(config) {
                tracing::warn!(id = %config.id, error = %e, "preview update not delivered");
            }
        }
    }
}

impl Drop for Studio {
    fn drop(&mut self) {
        self.detach_preview();
    }
}
