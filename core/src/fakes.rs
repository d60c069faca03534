//! In-memory fakes for the collaborator traits (testing only).
//!
//! Each fake records call counts so tests can make instrumentation
//! assertions ("the validator was never invoked for an unreachable
//! target") without touching a network or a cloud account.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use fleetdrill_common::error::{ApiError, ShellError, StoreError};
use fleetdrill_common::fleet::Target;

use crate::api::{ProcessState, ScalingApi};
use crate::asg::store::{StateRecord, StateStore};
use crate::inventory::InventoryProvider;
use crate::shell::ShellValidator;

// ---------------------------------------------------------------------------
// ScriptedValidator
// ---------------------------------------------------------------------------

/// Shell validator with per-target scripted results and a call counter.
#[derive(Default)]
pub struct ScriptedValidator {
    outcomes: Mutex<HashMap<String, Result<String, ShellError>>>,
    calls: AtomicUsize,
    /// Added before answering, to simulate slow sessions.
    pub delay: Option<Duration>,
}

impl ScriptedValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeeds_for(self, id: &str, response: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(id.to_string(), Ok(response.to_string()));
        self
    }

    pub fn rejects_auth_for(self, id: &str) -> Self {
        self.outcomes.lock().unwrap().insert(
            id.to_string(),
            Err(ShellError::Authentication("scripted rejection".into())),
        );
        self
    }

    pub fn fails_command_for(self, id: &str, detail: &str) -> Self {
        self.outcomes.lock().unwrap().insert(
            id.to_string(),
            Err(ShellError::Command {
                detail: detail.to_string(),
            }),
        );
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShellValidator for ScriptedValidator {
    async fn validate(&self, target: &Target, _addr: SocketAddr) -> Result<String, ShellError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcomes = self.outcomes.lock().unwrap();
        match outcomes.get(&target.id) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(ShellError::Authentication(msg))) => {
                Err(ShellError::Authentication(msg.clone()))
            }
            Some(Err(ShellError::Command { detail })) => Err(ShellError::Command {
                detail: detail.clone(),
            }),
            Some(Err(ShellError::Session(msg))) => Err(ShellError::Session(msg.clone())),
            // Unscripted targets validate cleanly.
            None => Ok("ok".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryScalingApi
// ---------------------------------------------------------------------------

/// Scaling API over an in-memory group table, with failure injection.
#[derive(Default)]
pub struct MemoryScalingApi {
    states: Mutex<HashMap<String, ProcessState>>,
    pub describe_calls: AtomicUsize,
    pub suspend_calls: AtomicUsize,
    pub resume_calls: AtomicUsize,
    /// Leading mutating calls that fail transiently before the fake
    /// starts succeeding.
    transient_failures: AtomicU32,
    /// When set, every suspend call fails fatally.
    reject_suspends: Mutex<bool>,
}

impl MemoryScalingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(self, group: &str, state: ProcessState) -> Self {
        self.states.lock().unwrap().insert(group.to_string(), state);
        self
    }

    pub fn failing_transiently(self, times: u32) -> Self {
        self.transient_failures.store(times, Ordering::SeqCst);
        self
    }

    pub fn rejecting_suspends(self) -> Self {
        *self.reject_suspends.lock().unwrap() = true;
        self
    }

    pub fn state_of(&self, group: &str) -> Option<ProcessState> {
        self.states.lock().unwrap().get(group).copied()
    }

    fn maybe_fail_transiently(&self) -> Result<(), ApiError> {
        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ApiError::Transient("injected throttle".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ScalingApi for MemoryScalingApi {
    async fn describe_process_state(&self, group: &str) -> Result<ProcessState, ApiError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_fail_transiently()?;
        self.states
            .lock()
            .unwrap()
            .get(group)
            .copied()
            .ok_or_else(|| ApiError::Fatal(format!("no such scaling group: {group}")))
    }

    async fn suspend_processes(&self, group: &str) -> Result<(), ApiError> {
        self.suspend_calls.fetch_add(1, Ordering::SeqCst);
        if *self.reject_suspends.lock().unwrap() {
            return Err(ApiError::Fatal("injected suspend rejection".into()));
        }
        self.maybe_fail_transiently()?;

        let mut states = self.states.lock().unwrap();
        match states.get_mut(group) {
            Some(state) => {
                *state = ProcessState::Suspended;
                Ok(())
            }
            None => Err(ApiError::Fatal(format!("no such scaling group: {group}"))),
        }
    }

    async fn resume_processes(&self, group: &str) -> Result<(), ApiError> {
        self.resume_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_fail_transiently()?;

        let mut states = self.states.lock().unwrap();
        match states.get_mut(group) {
            Some(state) => {
                *state = ProcessState::Active;
                Ok(())
            }
            None => Err(ApiError::Fatal(format!("no such scaling group: {group}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStateStore / FailingStateStore
// ---------------------------------------------------------------------------

/// State store over a plain map, same visible semantics as the file
/// store but with nothing durable.
#[derive(Default)]
pub struct MemoryStateStore {
    histories: Mutex<HashMap<String, Vec<StateRecord>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history_len(&self, group: &str) -> usize {
        self.histories
            .lock()
            .unwrap()
            .get(group)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn put(&self, record: StateRecord) -> Result<(), StoreError> {
        let mut histories = self.histories.lock().unwrap();
        histories.entry(record.group.clone()).or_default().push(record);
        Ok(())
    }

    async fn get(&self, group: &str) -> Result<Option<StateRecord>, StoreError> {
        let histories = self.histories.lock().unwrap();
        Ok(histories
            .get(group)
            .and_then(|h| h.last())
            .filter(|r| !r.is_consumed())
            .cloned())
    }

    async fn consume(&self, group: &str) -> Result<(), StoreError> {
        let mut histories = self.histories.lock().unwrap();
        if let Some(record) = histories.get_mut(group).and_then(|h| h.last_mut()) {
            if !record.is_consumed() {
                record.consumed_at = Some(chrono::Utc::now());
            }
        }
        Ok(())
    }
}

/// A store whose writes always fail, for exercising the
/// abort-suspend-on-store-failure path.
#[derive(Default)]
pub struct FailingStateStore;

#[async_trait]
impl StateStore for FailingStateStore {
    async fn put(&self, record: StateRecord) -> Result<(), StoreError> {
        Err(StoreError::Write {
            group: record.group,
            source: std::io::Error::other("injected write failure"),
        })
    }

    async fn get(&self, _group: &str) -> Result<Option<StateRecord>, StoreError> {
        Ok(None)
    }

    async fn consume(&self, group: &str) -> Result<(), StoreError> {
        Err(StoreError::Write {
            group: group.to_string(),
            source: std::io::Error::other("injected write failure"),
        })
    }
}

// ---------------------------------------------------------------------------
// StaticInventory
// ---------------------------------------------------------------------------

/// Inventory provider that hands back a fixed target list.
pub struct StaticInventory {
    targets: Vec<Target>,
}

impl StaticInventory {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }
}

#[async_trait]
impl InventoryProvider for StaticInventory {
    async fn targets(&self) -> anyhow::Result<Vec<Target>> {
        Ok(self.targets.clone())
    }
}
