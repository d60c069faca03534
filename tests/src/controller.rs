use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use fleetdrill_common::error::{ApiError, GroupOpError};
use fleetdrill_core::api::{ProcessState, RetryPolicy, ScalingApi};
use fleetdrill_core::asg::{FileStateStore, ProcessController, ResumeMode};
use fleetdrill_core::fakes::{FailingStateStore, MemoryScalingApi};

fn controller(
    api: Arc<MemoryScalingApi>,
    store: Arc<FileStateStore>,
) -> ProcessController {
    // Tiny backoff keeps retry-heavy scenarios fast.
    ProcessController::new(api, store).with_retry_policy(RetryPolicy {
        max_attempts: 4,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    })
}

/// The drill scenario end to end: suspend, "crash" (drop every
/// handle), then a fresh process resumes from the surviving record.
#[tokio::test]
async fn suspend_crash_resume_restores_from_disk() {
    let dir = tempfile::tempdir().unwrap();

    {
        let api = Arc::new(MemoryScalingApi::new().with_group("asg-prod", ProcessState::Active));
        let store = Arc::new(FileStateStore::new(dir.path()));
        controller(Arc::clone(&api), store)
            .suspend("asg-prod")
            .await
            .unwrap();
        assert_eq!(api.state_of("asg-prod"), Some(ProcessState::Suspended));
    }

    // New process, new controller, same state directory. The group is
    // still suspended on the provider side.
    let api = Arc::new(MemoryScalingApi::new().with_group("asg-prod", ProcessState::Suspended));
    let store = Arc::new(FileStateStore::new(dir.path()));
    let mode = controller(Arc::clone(&api), store)
        .resume("asg-prod")
        .await
        .unwrap();

    assert_eq!(mode, ResumeMode::Restored(ProcessState::Active));
    assert_eq!(api.state_of("asg-prod"), Some(ProcessState::Active));
}

/// The record is written before the mutating call, so a suspend whose
/// API call fails still leaves a restorable record behind.
#[tokio::test]
async fn failed_suspend_call_still_leaves_a_usable_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStateStore::new(dir.path()));

    let api = Arc::new(
        MemoryScalingApi::new()
            .with_group("asg-a", ProcessState::Active)
            .rejecting_suspends(),
    );
    let err = controller(Arc::clone(&api), Arc::clone(&store))
        .suspend("asg-a")
        .await
        .unwrap_err();
    assert!(matches!(err, GroupOpError::Api(ApiError::Fatal(_))));

    // The capture survived; a resume can still use it.
    let healthy_api = Arc::new(MemoryScalingApi::new().with_group("asg-a", ProcessState::Active));
    let mode = controller(healthy_api, store)
        .resume("asg-a")
        .await
        .unwrap();
    assert_eq!(mode, ResumeMode::Restored(ProcessState::Active));
}

#[tokio::test]
async fn second_suspend_is_refused_while_a_record_is_pending() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(MemoryScalingApi::new().with_group("asg-a", ProcessState::Active));
    let store = Arc::new(FileStateStore::new(dir.path()));
    let controller = controller(Arc::clone(&api), store);

    controller.suspend("asg-a").await.unwrap();
    let describe_calls_after_first = api.describe_calls.load(Ordering::SeqCst);

    let err = controller.suspend("asg-a").await.unwrap_err();
    assert!(matches!(err, GroupOpError::PendingRecord { .. }));

    // Refused before touching the API at all.
    assert_eq!(api.describe_calls.load(Ordering::SeqCst), describe_calls_after_first);
    assert_eq!(api.suspend_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn second_resume_runs_degraded_because_the_record_was_consumed() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(MemoryScalingApi::new().with_group("asg-a", ProcessState::Active));
    let store = Arc::new(FileStateStore::new(dir.path()));
    let controller = controller(api, store);

    controller.suspend("asg-a").await.unwrap();

    let first = controller.resume("asg-a").await.unwrap();
    assert_eq!(first, ResumeMode::Restored(ProcessState::Active));

    let second = controller.resume("asg-a").await.unwrap();
    assert_eq!(second, ResumeMode::Degraded);
}

/// When the record cannot be persisted, the group must not be touched.
#[tokio::test]
async fn store_failure_aborts_suspend_before_any_mutation() {
    let api = Arc::new(MemoryScalingApi::new().with_group("asg-a", ProcessState::Active));
    let controller = ProcessController::new(
        Arc::clone(&api) as Arc<dyn ScalingApi>,
        Arc::new(FailingStateStore),
    );

    let err = controller.suspend("asg-a").await.unwrap_err();
    assert!(matches!(err, GroupOpError::Store(_)));

    assert_eq!(api.suspend_calls.load(Ordering::SeqCst), 0);
    assert_eq!(api.state_of("asg-a"), Some(ProcessState::Active));
}

#[tokio::test]
async fn transient_api_failures_are_retried_through() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(
        MemoryScalingApi::new()
            .with_group("asg-a", ProcessState::Active)
            .failing_transiently(2),
    );
    let store = Arc::new(FileStateStore::new(dir.path()));

    controller(Arc::clone(&api), store)
        .suspend("asg-a")
        .await
        .unwrap();

    assert_eq!(api.state_of("asg-a"), Some(ProcessState::Suspended));
    // Two throttled describes before the one that stuck.
    assert_eq!(api.describe_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn transient_failures_beyond_the_budget_surface_as_exhaustion() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(
        MemoryScalingApi::new()
            .with_group("asg-a", ProcessState::Active)
            .failing_transiently(100),
    );
    let store = Arc::new(FileStateStore::new(dir.path()));

    let err = controller(api, store).suspend("asg-a").await.unwrap_err();
    assert!(matches!(
        err,
        GroupOpError::Api(ApiError::RetriesExhausted { attempts: 4, .. })
    ));
}

/// Distinct groups proceed concurrently; the same group serializes.
#[tokio::test]
async fn concurrent_suspends_of_distinct_groups_both_complete() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(
        MemoryScalingApi::new()
            .with_group("asg-a", ProcessState::Active)
            .with_group("asg-b", ProcessState::Active),
    );
    let store = Arc::new(FileStateStore::new(dir.path()));
    let controller = Arc::new(controller(Arc::clone(&api), store));

    let a = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.suspend("asg-a").await })
    };
    let b = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.suspend("asg-b").await })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(api.state_of("asg-a"), Some(ProcessState::Suspended));
    assert_eq!(api.state_of("asg-b"), Some(ProcessState::Suspended));
}

#[tokio::test]
async fn racing_suspends_of_the_same_group_let_exactly_one_through() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(MemoryScalingApi::new().with_group("asg-a", ProcessState::Active));
    let store = Arc::new(FileStateStore::new(dir.path()));
    let controller = Arc::new(controller(Arc::clone(&api), store));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let controller = Arc::clone(&controller);
        handles.push(tokio::spawn(async move { controller.suspend("asg-a").await }));
    }

    let mut succeeded = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => succeeded += 1,
            Err(GroupOpError::PendingRecord { .. }) => refused += 1,
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(refused, 3);
    assert_eq!(api.suspend_calls.load(Ordering::SeqCst), 1);
}
