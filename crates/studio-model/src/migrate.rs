//! Identity migration for loaded collections
//!
//! Configurations created before ids were canonicalized carry
//! timestamp-derived ids such as `chatbot-1700000000000`. Such an id never
//! matched a remote-store key, so a migrated entity is local-only by
//! construction. Migration must run before anything else reads a loaded
//! collection.

use serde::Serialize;

use crate::config::{Configuration, PersistenceState};
use crate::ids::ChatbotId;

/// One rewritten identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdRewrite {
    /// Legacy id found in the collection
    pub from: ChatbotId,
    /// Canonical id that replaced it
    pub to: ChatbotId,
}

/// Result of migrating a collection
#[derive(Debug, Clone, Default)]
pub struct MigrationOutcome {
    /// The collection, with every id canonical
    pub configs: Vec<Configuration>,
    /// Ids that were rewritten, in collection order
    pub rewrites: Vec<IdRewrite>,
}

impl MigrationOutcome {
    /// Whether anything changed
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.rewrites.is_empty()
    }
}

/// Rewrites non-canonical ids to fresh canonical ones
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMigrator;

impl IdentityMigrator {
    /// Create a migrator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Migrate a whole collection
    ///
    /// Only `id` and `persistence_state` of legacy entries change; all other
    /// fields, including `updated_at`, are preserved. Running the migrator on
    /// its own output is a no-op.
    #[must_use]
    pub fn migrate(&self, configs: Vec<Configuration>) -> MigrationOutcome {
        let mut rewrites = Vec::new();
        let configs = configs
            .into_iter()
            .map(|mut config| {
                if let Some(rewrite) = self.migrate_one(&mut config) {
                    rewrites.push(rewrite);
                }
                config
            })
            .collect();

        MigrationOutcome { configs, rewrites }
    }

    /// Migrate a single configuration in place
    pub fn migrate_one(&self, config: &mut Configuration) -> Option<IdRewrite> {
        if config.id.is_canonical() {
            return None;
        }
        let to = ChatbotId::generate();
        let from = std::mem::replace(&mut config.id, to.clone());
        config.persistence_state = PersistenceState::LocalOnly;
        tracing::info!(legacy_id = %from, id = %to, "migrated legacy configuration id");
        Some(IdRewrite { from, to })
    }
}
