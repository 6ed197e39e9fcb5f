//! Loading the cache and mirroring the remote store

use chrono::Duration;
use pretty_assertions::assert_eq;
use studio_model::PersistenceState;
use studio_store::{PersistenceCoordinator, StoreError};
use studio_test_utils::{
    legacy_config, seeded_repository, valid_config, InMemoryRemote, RemoteCall, RemoteMode,
    LEGACY_ID,
};

#[test]
fn legacy_id_migrated_on_load() {
    let legacy = legacy_config();
    let modern = valid_config("Modern Bot");
    let coordinator = PersistenceCoordinator::new(
        seeded_repository(&[legacy.clone(), modern.clone()]),
        InMemoryRemote::healthy(),
    );

    let loaded = coordinator.load().unwrap();

    let migrated = &loaded[0];
    assert!(migrated.id.is_canonical());
    assert_ne!(migrated.id.as_str(), LEGACY_ID);
    assert_eq!(migrated.persistence_state, PersistenceState::LocalOnly);

    let mut expected = legacy;
    expected.id = migrated.id.clone();
    expected.persistence_state = PersistenceState::LocalOnly;
    assert_eq!(migrated, &expected);
    assert_eq!(loaded[1], modern);
}

#[test]
fn migrated_ids_are_written_back() {
    let coordinator = PersistenceCoordinator::new(
        seeded_repository(&[legacy_config()]),
        InMemoryRemote::healthy(),
    );

    let first = coordinator.load().unwrap();
    let second = coordinator.load().unwrap();

    assert_eq!(first, second);
    assert_eq!(coordinator.repository().load().unwrap(), first);
}

#[tokio::test]
async fn remove_deletes_remote_copy_best_effort() {
    let remote = InMemoryRemote::healthy();
    let coordinator = PersistenceCoordinator::new(seeded_repository(&[]), remote.clone());
    let committed = coordinator
        .commit(&valid_config("Support Bot"), "")
        .await
        .unwrap()
        .config;

    remote.set_mode(RemoteMode::Unavailable);
    let removed = coordinator.remove(&committed.id).await.unwrap();

    assert_eq!(removed.id, committed.id);
    assert!(coordinator.repository().load().unwrap().is_empty());
    assert_eq!(
        remote.calls().last(),
        Some(&RemoteCall::Delete(committed.id.clone()))
    );
}

#[tokio::test]
async fn local_only_remove_skips_remote() {
    let remote = InMemoryRemote::healthy();
    let config = valid_config("Draft");
    let coordinator = PersistenceCoordinator::new(seeded_repository(&[config.clone()]), remote.clone());

    coordinator.remove(&config.id).await.unwrap();
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn pull_upserts_unless_local_is_newer() {
    let remote = InMemoryRemote::healthy();

    let mut stale_local = valid_config("Shared Bot");
    stale_local.updated_at -= Duration::hours(1);
    let mut fresh_remote = stale_local.clone();
    fresh_remote.name = "Shared Bot (remote)".to_string();
    fresh_remote.updated_at += Duration::minutes(30);

    let mut newer_local = valid_config("Local Edits");
    let older_remote = newer_local.clone();
    newer_local.updated_at += Duration::minutes(5);

    let remote_only = valid_config("Remote Only");

    remote.insert(&fresh_remote);
    remote.insert(&older_remote);
    remote.insert(&remote_only);

    let coordinator = PersistenceCoordinator::new(
        seeded_repository(&[stale_local.clone(), newer_local.clone()]),
        remote,
    );
    let report = coordinator.pull().await.unwrap();

    assert_eq!(report.updated, 2);
    assert_eq!(report.skipped, 1);

    let cache = coordinator.repository();
    let pulled = cache.get(&stale_local.id).unwrap().unwrap();
    assert_eq!(pulled.name, "Shared Bot (remote)");
    assert_eq!(pulled.persistence_state, PersistenceState::CommittedRemote);
    assert_eq!(cache.get(&newer_local.id).unwrap().unwrap(), newer_local);
    assert!(cache.get(&remote_only.id).unwrap().is_some());
}

#[tokio::test]
async fn pull_fails_when_remote_down() {
    let coordinator =
        PersistenceCoordinator::new(seeded_repository(&[]), InMemoryRemote::unavailable());
    assert!(matches!(coordinator.pull().await, Err(StoreError::Remote(_))));
}
