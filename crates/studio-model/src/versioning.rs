//! Draft -> version -> publish state machine
//!
//! # Transitions
//!
//! | From | Action | To |
//! |---|---|---|
//! | Unpublished | save | Unpublished |
//! | Unpublished | publish (after at least one save) | Published |
//! | Published | save | PublishedWithDraft |
//! | PublishedWithDraft | publish | Published |
//! | Published | publish | Published (another marker) |
//!
//! Every transition appends exactly one [`VersionRecord`]; nothing is ever
//! edited or removed from the history.

use chrono::Utc;
use serde::Serialize;

use crate::config::{Configuration, DEFAULT_AUTHOR};
use crate::ids::{ChatbotId, VersionId};
use crate::version::{next_label, VersionRecord};

/// Publish status of a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishState {
    /// Never published
    Unpublished,
    /// The newest record is a publish marker
    Published,
    /// Published, with saves layered on top of the live version
    PublishedWithDraft,
}

/// Versioning errors
#[derive(Debug, thiserror::Error)]
pub enum VersioningError {
    /// Publish attempted before any save
    #[error("configuration {0} has no saved version to publish")]
    NothingSaved(ChatbotId),

    /// Draft differs from the newest save
    #[error("configuration {0} has unsaved changes; save before publishing")]
    UnsavedChanges(ChatbotId),

    /// Referenced record does not exist
    #[error("configuration {id} has no version record {version_id}")]
    UnknownVersion { id: ChatbotId, version_id: VersionId },

    /// Referenced record cannot be restored
    #[error("version record {0} carries no configuration snapshot")]
    MissingSnapshot(VersionId),
}

/// Stamps version records onto configurations
#[derive(Debug, Clone)]
pub struct VersioningEngine {
    author: String,
}

impl VersioningEngine {
    /// Engine writing records as `author`
    #[inline]
    #[must_use]
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
        }
    }

    /// Author label written on new records
    #[inline]
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Append an unpublished record with the next version label
    ///
    /// The entity's `is_published` flag is left as is: saving on top of a
    /// published version produces drift, not an unpublish.
    pub fn save(&self, config: &mut Configuration, changes: &str) -> VersionRecord {
        let label = next_label(&config.current_version);
        self.append(config, label, false, changes)
    }

    /// Append a publish marker for the current version label
    ///
    /// Publishing never bumps the label; it marks the newest save as live,
    /// so a draft that differs from that save is refused.
    ///
    /// # Errors
    /// Returns [`VersioningError::NothingSaved`] while only the initial record
    /// exists, and [`VersioningError::UnsavedChanges`] for a drifted draft
    pub fn publish(&self, config: &mut Configuration) -> Result<VersionRecord, VersioningError> {
        if config.versions.len() < 2 {
            return Err(VersioningError::NothingSaved(config.id.clone()));
        }
        let saved = Self::latest_save(config).and_then(|record| record.config_snapshot.as_ref());
        if saved.is_some_and(|snapshot| *snapshot != config.snapshot()) {
            return Err(VersioningError::UnsavedChanges(config.id.clone()));
        }
        let label = config.current_version.clone();
        let changes = format!("Published version {label}");
        let record = self.append(config, label, true, &changes);
        config.is_published = true;
        Ok(record)
    }

    /// Restore a record's snapshot into the draft and save it as a new version
    ///
    /// # Errors
    /// Returns error if the record is unknown or has no snapshot
    pub fn rollback(
        &self,
        config: &mut Configuration,
        version_id: &VersionId,
    ) -> Result<VersionRecord, VersioningError> {
        let target = Self::find(config, version_id).ok_or_else(|| VersioningError::UnknownVersion {
            id: config.id.clone(),
            version_id: version_id.clone(),
        })?;
        let snapshot = target
            .config_snapshot
            .clone()
            .ok_or_else(|| VersioningError::MissingSnapshot(version_id.clone()))?;
        let changes = format!("Rolled back to version {}", target.version);

        config.apply_snapshot(&snapshot);
        Ok(self.save(config, &changes))
    }

    fn append(
        &self,
        config: &mut Configuration,
        label: String,
        is_published: bool,
        changes: &str,
    ) -> VersionRecord {
        let now = Utc::now();
        let record = VersionRecord::new(label.clone(), self.author.as_str(), is_published, changes, now)
            .with_snapshot(config.snapshot());
        config.versions.push(record.clone());
        config.current_version = label;
        config.updated_at = now;
        tracing::debug!(
            id = %config.id,
            version = %config.current_version,
            published = is_published,
            "appended version record"
        );
        record
    }

    /// Most recent publish marker, if the entity was ever published
    #[must_use]
    pub fn latest_published(config: &Configuration) -> Option<&VersionRecord> {
        config.versions.iter().rev().find(|record| record.is_published)
    }

    /// Most recent save record
    #[must_use]
    pub fn latest_save(config: &Configuration) -> Option<&VersionRecord> {
        config.versions.iter().rev().find(|record| !record.is_published)
    }

    /// Current publish status
    #[must_use]
    pub fn state(config: &Configuration) -> PublishState {
        if !config.is_published || Self::latest_published(config).is_none() {
            return PublishState::Unpublished;
        }
        match config.versions.last() {
            Some(last) if last.is_published => PublishState::Published,
            _ => PublishState::PublishedWithDraft,
        }
    }

    /// Records, newest first
    pub fn history(config: &Configuration) -> impl Iterator<Item = &VersionRecord> {
        config.versions.iter().rev()
    }

    /// Look up a record by id
    #[must_use]
    pub fn find<'a>(config: &'a Configuration, version_id: &VersionId) -> Option<&'a VersionRecord> {
        config.versions.iter().find(|record| &record.id == version_id)
    }
}

impl Default for VersioningEngine {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHOR)
    }
}
