//! Remote-first, local-fallback persistence
//!
//! # Commit flow
//!
//! 1. Refuse a second commit for an id whose first commit is unresolved
//! 2. Validate; an invalid configuration never reaches either backend
//! 3. Stamp exactly one version record on a working copy
//! 4. `create` if the entity is local-only, `update` otherwise; a create
//!    conflict falls through to `update`
//! 5. On remote success, cache the returned representation as
//!    committed-remote
//! 6. On remote failure, cache the working copy and report a degraded
//!    success carrying the error message
//!
//! Only a failed local write fails the operation.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashSet;
use serde::Serialize;
use studio_model::{
    validate, ChatbotId, Configuration, IdentityMigrator, PersistenceState, VersionId,
    VersionRecord, VersioningEngine, VersioningError,
};

use crate::error::{RemoteError, StoreError};
use crate::remote::RemoteStore;
use crate::repository::LocalRepository;

/// Backend that holds the newest copy after a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitLocation {
    /// Accepted by the remote store and mirrored locally
    Remote,
    /// Written to the local cache only
    Local,
}

impl fmt::Display for CommitLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Remote => "remote",
            Self::Local => "local",
        })
    }
}

/// Result of a successful commit
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    /// Newest representation, as cached locally
    pub config: Configuration,
    /// Record stamped by this commit
    pub record: VersionRecord,
    /// Where the newest copy lives
    pub location: CommitLocation,
    /// Remote error message when the commit degraded to local
    pub warning: Option<String>,
}

impl CommitOutcome {
    /// Whether the remote store did not take the commit
    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.location == CommitLocation::Local
    }
}

/// Result of [`PersistenceCoordinator::pull`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullReport {
    /// Remote entities written into the cache
    pub updated: usize,
    /// Remote entities skipped because the local copy is newer
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommitTarget {
    Create,
    Update,
}

impl CommitTarget {
    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

/// Per-id in-flight marker, cleared on drop
struct InFlight<'a> {
    ids: &'a DashSet<ChatbotId>,
    id: ChatbotId,
}

impl<'a> InFlight<'a> {
    fn acquire(ids: &'a DashSet<ChatbotId>, id: &ChatbotId) -> Result<Self, StoreError> {
        if ids.insert(id.clone()) {
            Ok(Self { ids, id: id.clone() })
        } else {
            Err(StoreError::CommitInFlight(id.clone()))
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.ids.remove(&self.id);
    }
}

/// Durable storage for configurations
pub struct PersistenceCoordinator {
    repository: LocalRepository,
    remote: Arc<dyn RemoteStore>,
    versioning: VersioningEngine,
    migrator: IdentityMigrator,
    in_flight: DashSet<ChatbotId>,
}

impl fmt::Debug for PersistenceCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceCoordinator")
            .field("repository", &self.repository)
            .field("versioning", &self.versioning)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl PersistenceCoordinator {
    /// Coordinator over a local repository and a remote store
    #[must_use]
    pub fn new(repository: LocalRepository, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            repository,
            remote,
            versioning: VersioningEngine::default(),
            migrator: IdentityMigrator::new(),
            in_flight: DashSet::new(),
        }
    }

    /// Use `versioning` to stamp records
    #[inline]
    #[must_use]
    pub fn with_versioning(mut self, versioning: VersioningEngine) -> Self {
        self.versioning = versioning;
        self
    }

    /// Local repository
    #[inline]
    #[must_use]
    pub fn repository(&self) -> &LocalRepository {
        &self.repository
    }

    /// Versioning engine used for stamps
    #[inline]
    #[must_use]
    pub fn versioning(&self) -> &VersioningEngine {
        &self.versioning
    }

    /// Whether a commit for `id` is unresolved
    #[must_use]
    pub fn is_in_flight(&self, id: &ChatbotId) -> bool {
        self.in_flight.contains(id)
    }

    /// Load the collection, migrating legacy ids first
    ///
    /// Rewritten ids are written back so later loads are stable.
    ///
    /// # Errors
    /// Returns error if the cache cannot be read, parsed or written back
    pub fn load(&self) -> Result<Vec<Configuration>, StoreError> {
        self.repository.modify(|configs| {
            let outcome = self.migrator.migrate(std::mem::take(configs));
            if outcome.changed() {
                tracing::info!(
                    rewritten = outcome.rewrites.len(),
                    "writing migrated ids back to local cache"
                );
            }
            configs.clone_from(&outcome.configs);
            outcome.configs
        })
    }

    /// Write a draft to the local cache only
    ///
    /// No record is stamped and the remote store is not contacted.
    ///
    /// # Errors
    /// Returns [`StoreError::LocalWrite`] if the cache rejects the write
    pub fn stage(&self, config: &Configuration) -> Result<(), StoreError> {
        tracing::debug!(id = %config.id, "staging configuration locally");
        self.repository.upsert(config)
    }

    /// Save: stamp the next version and persist
    ///
    /// # Errors
    /// Returns error on validation failure, a concurrent commit for the same
    /// id, or a failed local write
    pub async fn commit(
        &self,
        config: &Configuration,
        changes: &str,
    ) -> Result<CommitOutcome, StoreError> {
        self.commit_with(config, |engine, working| Ok(engine.save(working, changes)))
            .await
    }

    /// Publish: stamp a publish marker and persist
    ///
    /// # Errors
    /// As [`PersistenceCoordinator::commit`], plus
    /// [`VersioningError::NothingSaved`] before the first save
    pub async fn publish(&self, config: &Configuration) -> Result<CommitOutcome, StoreError> {
        self.commit_with(config, |engine, working| engine.publish(working))
            .await
    }

    /// Restore a recorded snapshot as a new save and persist
    ///
    /// # Errors
    /// As [`PersistenceCoordinator::commit`], plus unknown or
    /// snapshot-less records
    pub async fn rollback(
        &self,
        config: &Configuration,
        version_id: &VersionId,
    ) -> Result<CommitOutcome, StoreError> {
        self.commit_with(config, |engine, working| engine.rollback(working, version_id))
            .await
    }

    async fn commit_with<F>(
        &self,
        config: &Configuration,
        stamp: F,
    ) -> Result<CommitOutcome, StoreError>
    where
        F: FnOnce(&VersioningEngine, &mut Configuration) -> Result<VersionRecord, VersioningError>,
    {
        let _guard = InFlight::acquire(&self.in_flight, &config.id)?;

        let mut working = config.clone();
        let record = stamp(&self.versioning, &mut working)?;

        let report = validate(&working);
        if !report.is_valid() {
            tracing::debug!(id = %working.id, errors = %report, "commit refused by validation");
            return Err(StoreError::Validation(report));
        }

        let target = if working.persistence_state.is_remote() {
            CommitTarget::Update
        } else {
            CommitTarget::Create
        };
        tracing::debug!(
            id = %working.id,
            version = %working.current_version,
            op = target.as_str(),
            "committing configuration"
        );

        match self.send(&mut working, target).await {
            Ok(mut accepted) => {
                accepted.persistence_state = PersistenceState::CommittedRemote;
                self.repository.upsert(&accepted)?;
                tracing::info!(
                    id = %accepted.id,
                    version = %accepted.current_version,
                    "configuration committed to remote store"
                );
                Ok(CommitOutcome {
                    config: accepted,
                    record,
                    location: CommitLocation::Remote,
                    warning: None,
                })
            }
            Err(err) => {
                tracing::warn!(
                    id = %working.id,
                    error = %err,
                    "remote commit failed, keeping local copy"
                );
                self.repository.upsert(&working)?;
                Ok(CommitOutcome {
                    config: working,
                    record,
                    location: CommitLocation::Local,
                    warning: Some(err.to_string()),
                })
            }
        }
    }

    /// Run the remote half of a commit
    ///
    /// A create conflict proves a remote counterpart exists, so the working
    /// copy is marked committed-remote before the update is attempted.
    async fn send(
        &self,
        working: &mut Configuration,
        target: CommitTarget,
    ) -> Result<Configuration, RemoteError> {
        if target == CommitTarget::Update {
            return self.remote.update(working).await;
        }
        match self.remote.create(working).await {
            Err(RemoteError::Conflict(_)) => {
                tracing::debug!(id = %working.id, "create conflicted, retrying as update");
                working.persistence_state = PersistenceState::CommittedRemote;
                self.remote.update(working).await
            }
            other => other,
        }
    }

    /// Remove a configuration from the cache
    ///
    /// The remote copy is deleted best effort; a remote failure is logged
    /// and does not fail the removal.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if the id is not cached, or a local
    /// cache error
    pub async fn remove(&self, id: &ChatbotId) -> Result<Configuration, StoreError> {
        let config = self
            .repository
            .modify(|configs| {
                let index = configs.iter().position(|config| &config.id == id)?;
                Some(configs.remove(index))
            })?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        if config.persistence_state.is_remote() {
            if let Err(err) = self.remote.delete(id).await {
                tracing::warn!(id = %id, error = %err, "remote delete failed");
            }
        }
        tracing::info!(id = %id, "configuration removed");
        Ok(config)
    }

    /// Mirror the remote listing into the local cache
    ///
    /// A cached entity with a newer `updated_at` than its remote counterpart
    /// is kept as is.
    ///
    /// # Errors
    /// Returns [`StoreError::Remote`] if the listing fails, or a local cache
    /// error
    pub async fn pull(&self) -> Result<PullReport, StoreError> {
        let remote = self.remote.list().await?;
        let report = self.repository.modify(|local| {
            let outcome = self.migrator.migrate(std::mem::take(local));
            *local = outcome.configs;

            let mut report = PullReport::default();
            for mut incoming in remote {
                incoming.persistence_state = PersistenceState::CommittedRemote;
                match local.iter_mut().find(|existing| existing.id == incoming.id) {
                    Some(existing) if is_newer(existing.updated_at, incoming.updated_at) => {
                        report.skipped += 1;
                    }
                    Some(existing) => {
                        *existing = incoming;
                        report.updated += 1;
                    }
                    None => {
                        local.push(incoming);
                        report.updated += 1;
                    }
                }
            }
            report
        })?;
        tracing::info!(updated = report.updated, skipped = report.skipped, "pulled remote store");
        Ok(report)
    }
}

fn is_newer(local: DateTime<Utc>, remote: DateTime<Utc>) -> bool {
    local > remote
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::OfflineRemote;
    use crate::slot::MemorySlot;

    fn offline() -> PersistenceCoordinator {
        PersistenceCoordinator::new(
            LocalRepository::new(Arc::new(MemorySlot::new())),
            Arc::new(OfflineRemote),
        )
    }

    fn valid(name: &str) -> Configuration {
        let mut config = Configuration::create_default(name);
        config.website = "https://example.com".to_string();
        config
    }

    #[tokio::test]
    async fn offline_commit_degrades_to_local() {
        let coordinator = offline();
        let config = valid("Support Bot");

        let outcome = coordinator.commit(&config, "first save").await.unwrap();
        assert!(outcome.is_degraded());
        assert_eq!(outcome.location, CommitLocation::Local);
        assert!(outcome.warning.unwrap().contains("no remote store configured"));
        assert_eq!(outcome.config.current_version, "1.1");
        assert_eq!(outcome.config.persistence_state, PersistenceState::LocalOnly);

        let cached = coordinator.repository().get(&config.id).unwrap().unwrap();
        assert_eq!(cached.versions.len(), 2);
    }

    #[tokio::test]
    async fn invalid_configuration_never_written() {
        let coordinator = offline();
        let config = Configuration::create_default("No Website");

        let err = coordinator.commit(&config, "").await.unwrap_err();
        match err {
            StoreError::Validation(report) => assert!(report.has_error("website")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(coordinator.repository().load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn publish_before_save_refused() {
        let coordinator = offline();
        let err = coordinator.publish(&valid("Support Bot")).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Versioning(VersioningError::NothingSaved(_))
        ));
    }

    #[tokio::test]
    async fn in_flight_commit_is_refused() {
        let coordinator = offline();
        let config = valid("Support Bot");

        let guard = InFlight::acquire(&coordinator.in_flight, &config.id).unwrap();
        assert!(coordinator.is_in_flight(&config.id));
        assert!(matches!(
            coordinator.commit(&config, "").await,
            Err(StoreError::CommitInFlight(_))
        ));

        drop(guard);
        assert!(!coordinator.is_in_flight(&config.id));
        assert!(coordinator.commit(&config, "").await.is_ok());
    }

    #[tokio::test]
    async fn guard_released_after_failure() {
        let coordinator = offline();
        let config = Configuration::create_default("No Website");
        assert!(coordinator.commit(&config, "").await.is_err());
        assert!(!coordinator.is_in_flight(&config.id));
    }

    #[tokio::test]
    async fn stage_writes_without_stamping() {
        let coordinator = offline();
        let config = Configuration::create_default("Draft");
        coordinator.stage(&config).unwrap();

        let cached = coordinator.repository().get(&config.id).unwrap().unwrap();
        assert_eq!(cached.versions.len(), 1);
    }

    #[tokio::test]
    async fn remove_missing_is_not_found() {
        let coordinator = offline();
        assert!(matches!(
            coordinator.remove(&ChatbotId::generate()).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn pull_without_remote_fails() {
        assert!(matches!(
            offline().pull().await,
            Err(StoreError::Remote(RemoteError::Unavailable(_)))
        ));
    }
}
