//! # Process Controller
//!
//! Per-group state machine over {Active, Suspending, Suspended,
//! Resuming}. The transient states exist only inside the two methods
//! here; what persists is the state record.
//!
//! Ordering rule for `suspend`: capture, persist, *then* mutate. A
//! crash between capture and the API call leaves a valid record and
//! an untouched group; a crash between the API call and `consume`
//! leaves a suspended group with its record intact, which the next
//! resume will find and use. There is no window in which the system
//! has mutated the group without knowing what to restore to.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use tracing::debug;

use fleetdrill_common::error::GroupOpError;
use fleetdrill_common::{success, warn};

use crate::api::{RetryPolicy, ScalingApi, with_retry};
use crate::asg::store::{StateRecord, StateStore};

/// How a resume found its prior state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResumeMode {
    /// A record existed; the group was restored and the record
    /// consumed. Carries the captured state for reporting.
    Restored(crate::api::ProcessState),
    /// No usable record: resumed against the live API with nothing
    /// to roll back to. Reported distinctly so operators notice.
    Degraded,
}

/// Suspend/resume orchestration for scaling groups.
pub struct ProcessController {
    api: Arc<dyn ScalingApi>,
    store: Arc<dyn StateStore>,
    retry: RetryPolicy,
    /// Same-group operations must never interleave their record
    /// read/write; distinct groups proceed concurrently.
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProcessController {
    pub fn new(api: Arc<dyn ScalingApi>, store: Arc<dyn StateStore>) -> Self {
        Self {
            api,
            store,
            retry: RetryPolicy::default(),
            locks: StdMutex::new(HashMap::new()),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn lock_for(&self, group: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("lock map poisoned");
        locks.entry(group.to_string()).or_default().clone()
    }

    /// Suspends a group's automated processes.
    ///
    /// Refuses when an unconsumed record exists from a prior
    /// incomplete suspend: overwriting it would lose the state we
    /// still owe a restore for. An API failure *after* the record is
    /// written is reported but leaves the record valid for a future
    /// resume.
    pub async fn suspend(&self, group: &str) -> Result<(), GroupOpError> {
        let lock = self.lock_for(group);
        let _guard = lock.lock().await;

        if self.store.get(group).await?.is_some() {
            return Err(GroupOpError::PendingRecord {
                group: group.to_string(),
            });
        }

        debug!("suspending '{group}': capturing live process state");
        let state = with_retry(&self.retry, || self.api.describe_process_state(group)).await?;

        // The safety barrier: nothing mutates until this write lands.
        self.store.put(StateRecord::capture(group, state)).await?;

        with_retry(&self.retry, || self.api.suspend_processes(group)).await?;

        success!("suspended processes for '{group}' (was {state})");
        Ok(())
    }

    /// Resumes a group's automated processes.
    ///
    /// With a record: resume, then mark the record consumed so a later
    /// resume cannot treat the stale capture as authoritative. Without
    /// one: degraded mode, resume against the live API and say so.
    pub async fn resume(&self, group: &str) -> Result<ResumeMode, GroupOpError> {
        let lock = self.lock_for(group);
        let _guard = lock.lock().await;

        let record = self.store.get(group).await?;

        with_retry(&self.retry, || self.api.resume_processes(group)).await?;

        match record {
            Some(record) => {
                // Resume already took effect; losing the consume mark
                // here is safe because resuming twice is idempotent at
                // the provider level.
                self.store.consume(group).await?;
                success!(
                    "resumed processes for '{group}' (captured state was {})",
                    record.process_state
                );
                Ok(ResumeMode::Restored(record.process_state))
            }
            None => {
                warn!("no state record for '{group}'; resumed in degraded mode");
                Ok(ResumeMode::Degraded)
            }
        }
    }
}
