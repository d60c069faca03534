use std::sync::Arc;

use fleetdrill_core::api::ProcessState;
use fleetdrill_core::asg::{FileStateStore, StateRecord, StateStore};

/// Many writers hammering the same key must serialize cleanly: the
/// history ends up with every capture and the newest one is active.
#[tokio::test]
async fn concurrent_same_key_puts_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStateStore::new(dir.path()));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .put(StateRecord::capture("asg-hot", ProcessState::Active))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let active = store.get("asg-hot").await.unwrap();
    assert!(active.is_some());

    // Every record made it into the file, none were torn or lost.
    let raw = std::fs::read_to_string(dir.path().join("asg-hot.json")).unwrap();
    let history: Vec<StateRecord> = serde_json::from_str(&raw).unwrap();
    assert_eq!(history.len(), 16);
}

/// The record written before a mutation must outlive a process crash.
/// A crash is modeled by dropping the store and opening a fresh one
/// over the same directory.
#[tokio::test]
async fn active_record_survives_restart_and_consume_state_too() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = FileStateStore::new(dir.path());
        store
            .put(StateRecord::capture("asg-prod", ProcessState::Active))
            .await
            .unwrap();
    }

    {
        let store = FileStateStore::new(dir.path());
        let record = store.get("asg-prod").await.unwrap().unwrap();
        assert_eq!(record.process_state, ProcessState::Active);
        store.consume("asg-prod").await.unwrap();
    }

    // Third lifetime: the consume mark is durable as well.
    let store = FileStateStore::new(dir.path());
    assert!(store.get("asg-prod").await.unwrap().is_none());
}

#[tokio::test]
async fn keys_map_to_disjoint_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStateStore::new(dir.path());

    store
        .put(StateRecord::capture("asg-blue", ProcessState::Active))
        .await
        .unwrap();
    store
        .put(StateRecord::capture("asg-green", ProcessState::Suspended))
        .await
        .unwrap();
    store.consume("asg-blue").await.unwrap();

    // Consuming blue leaves green untouched.
    assert!(store.get("asg-blue").await.unwrap().is_none());
    let green = store.get("asg-green").await.unwrap().unwrap();
    assert_eq!(green.process_state, ProcessState::Suspended);

    assert!(dir.path().join("asg-blue.json").exists());
    assert!(dir.path().join("asg-green.json").exists());
}
