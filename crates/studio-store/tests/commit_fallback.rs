//! Commit behaviour across remote outcomes

use std::sync::Arc;

use pretty_assertions::assert_eq;
use studio_model::{PersistenceState, VersioningEngine, VersioningError};
use studio_store::{CommitLocation, LocalRepository, PersistenceCoordinator, StoreError};
use studio_test_utils::{
    coordinator_with, valid_config, InMemoryRemote, QuotaSlot, RemoteCall, RemoteMode,
};

#[tokio::test]
async fn rejecting_remote_falls_back_to_local() {
    let remote = InMemoryRemote::reject_all();
    let coordinator = coordinator_with(remote.clone());
    let config = valid_config("Support Bot");

    let outcome = coordinator.commit(&config, "first save").await.unwrap();

    assert_eq!(outcome.location, CommitLocation::Local);
    assert!(outcome.warning.as_deref().unwrap().contains("rejected by stub"));
    assert_eq!(remote.calls(), vec![RemoteCall::Create(config.id.clone())]);

    let cached = coordinator.repository().get(&config.id).unwrap().unwrap();
    assert_eq!(cached.versions.len(), config.versions.len() + 1);
    assert_eq!(cached.current_version, "1.1");
    assert_eq!(cached.persistence_state, PersistenceState::LocalOnly);
}

#[tokio::test]
async fn healthy_remote_commits_and_mirrors() {
    let remote = InMemoryRemote::healthy();
    let coordinator = coordinator_with(remote.clone());
    let config = valid_config("Support Bot");

    let outcome = coordinator.commit(&config, "first save").await.unwrap();

    assert_eq!(outcome.location, CommitLocation::Remote);
    assert!(outcome.warning.is_none());
    assert_eq!(outcome.config.persistence_state, PersistenceState::CommittedRemote);
    assert!(remote.stored(&config.id).is_some());

    let cached = coordinator.repository().get(&config.id).unwrap().unwrap();
    assert_eq!(cached, outcome.config);
}

#[tokio::test]
async fn committed_entity_uses_update() {
    let remote = InMemoryRemote::healthy();
    let coordinator = coordinator_with(remote.clone());

    let first = coordinator
        .commit(&valid_config("Support Bot"), "one")
        .await
        .unwrap();
    let second = coordinator.commit(&first.config, "two").await.unwrap();

    assert_eq!(second.config.current_version, "1.2");
    assert_eq!(
        remote.calls(),
        vec![
            RemoteCall::Create(first.config.id.clone()),
            RemoteCall::Update(first.config.id.clone()),
        ]
    );
}

#[tokio::test]
async fn create_conflict_falls_through_to_update() {
    let remote = Arc::new(InMemoryRemote::new(RemoteMode::ConflictOnCreate));
    let coordinator = coordinator_with(remote.clone());
    let config = valid_config("Support Bot");

    let outcome = coordinator.commit(&config, "first save").await.unwrap();

    assert_eq!(outcome.location, CommitLocation::Remote);
    assert_eq!(
        remote.calls(),
        vec![
            RemoteCall::Create(config.id.clone()),
            RemoteCall::Update(config.id.clone()),
        ]
    );
}

#[tokio::test]
async fn failed_update_keeps_remote_counterpart_and_newest_copy() {
    let remote = InMemoryRemote::healthy();
    let coordinator = coordinator_with(remote.clone());
    let committed = coordinator
        .commit(&valid_config("Support Bot"), "one")
        .await
        .unwrap()
        .config;

    remote.set_mode(RemoteMode::Unavailable);
    let mut edited = committed.clone();
    edited.description = "Answers billing questions".to_string();
    let outcome = coordinator.commit(&edited, "two").await.unwrap();

    assert_eq!(outcome.location, CommitLocation::Local);
    assert_eq!(outcome.config.persistence_state, PersistenceState::CommittedRemote);

    let cached = coordinator.repository().get(&committed.id).unwrap().unwrap();
    assert_eq!(cached.current_version, "1.2");
    assert_eq!(cached.description, "Answers billing questions");

    remote.set_mode(RemoteMode::Healthy);
    let retried = coordinator.commit(&cached, "three").await.unwrap();
    assert_eq!(retried.location, CommitLocation::Remote);
    assert_eq!(
        remote.calls().last(),
        Some(&RemoteCall::Update(committed.id.clone()))
    );
}

#[tokio::test]
async fn publish_is_stamped_once() {
    let remote = InMemoryRemote::healthy();
    let coordinator = coordinator_with(remote);
    let saved = coordinator
        .commit(&valid_config("Support Bot"), "ready")
        .await
        .unwrap()
        .config;

    let published = coordinator.publish(&saved).await.unwrap();
    assert_eq!(published.config.versions.len(), saved.versions.len() + 1);
    assert!(published.config.is_published);
    assert_eq!(
        VersioningEngine::latest_published(&published.config).unwrap().version,
        "1.1"
    );
}

#[tokio::test]
async fn publish_of_unsaved_draft_is_refused() {
    let remote = InMemoryRemote::healthy();
    let coordinator = coordinator_with(remote.clone());
    let saved = coordinator
        .commit(&valid_config("Support Bot"), "ready")
        .await
        .unwrap()
        .config;
    let calls_after_save = remote.calls().len();

    let mut draft = saved.clone();
    draft.name = "Never Saved".to_string();
    let err = coordinator.publish(&draft).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Versioning(VersioningError::UnsavedChanges(_))
    ));
    assert_eq!(remote.calls().len(), calls_after_save);

    let cached = coordinator.repository().get(&saved.id).unwrap().unwrap();
    assert_eq!(cached.name, "Support Bot");
    assert!(VersioningEngine::latest_published(&cached).is_none());
}

#[tokio::test]
async fn local_write_failure_is_fatal() {
    let slot = Arc::new(QuotaSlot::new(16));
    let coordinator = PersistenceCoordinator::new(
        LocalRepository::new(slot),
        InMemoryRemote::unavailable(),
    );

    let err = coordinator
        .commit(&valid_config("Support Bot"), "too big")
        .await
        .unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(err, StoreError::LocalWrite(_)));
}

#[tokio::test]
async fn caller_copy_untouched_by_failed_commit() {
    let coordinator = PersistenceCoordinator::new(
        LocalRepository::new(Arc::new(QuotaSlot::new(0))),
        InMemoryRemote::unavailable(),
    );
    let config = valid_config("Support Bot");
    let before = config.clone();

    assert!(coordinator.commit(&config, "").await.is_err());
    assert_eq!(config, before);
}
