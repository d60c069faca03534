//! # Durable State Store
//!
//! One JSON history file per group under a state directory. The
//! newest entry is the *active* record iff it has not been consumed;
//! older entries stay on disk so an operator can audit what was
//! captured even after a restore.
//!
//! Writes go through a temp file and an atomic rename, so a crash
//! mid-write can never leave a torn record; at worst the previous
//! file survives intact. Same-key operations serialize behind a
//! per-group async lock; distinct keys touch distinct files and only
//! ever contend on the lock-map lookup.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use fleetdrill_common::error::StoreError;

use crate::api::ProcessState;

/// Snapshot of a group's process state, captured immediately before a
/// suspend call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub group: String,
    /// The state to restore to.
    pub process_state: ProcessState,
    pub captured_at: DateTime<Utc>,
    /// Set once a resume has used this record; a consumed record is
    /// never authoritative again.
    #[serde(default)]
    pub consumed_at: Option<DateTime<Utc>>,
}

impl StateRecord {
    pub fn capture(group: impl Into<String>, process_state: ProcessState) -> Self {
        Self {
            group: group.into(),
            process_state,
            captured_at: Utc::now(),
            consumed_at: None,
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }
}

/// Durable key-value store of state records, keyed by group name.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Makes `record` the active record for its group. Last write
    /// wins per key; prior records become history.
    async fn put(&self, record: StateRecord) -> Result<(), StoreError>;

    /// Returns the active (newest, unconsumed) record, if any.
    async fn get(&self, group: &str) -> Result<Option<StateRecord>, StoreError>;

    /// Marks the active record as used. History is retained. No-op
    /// when nothing is active.
    async fn consume(&self, group: &str) -> Result<(), StoreError>;
}

/// File-backed production store.
pub struct FileStateStore {
    dir: PathBuf,
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Per-group lock; the map itself is only held long enough to
    /// clone the Arc, so distinct groups never wait on each other.
    fn lock_for(&self, group: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("lock map poisoned");
        locks.entry(group.to_string()).or_default().clone()
    }

    fn file_path(&self, group: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize(group)))
    }

    fn read_history(&self, group: &str) -> Result<Vec<StateRecord>, StoreError> {
        let path = self.file_path(group);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Read {
                    group: group.to_string(),
                    source: e,
                });
            }
        };

        serde_json::from_slice(&raw).map_err(|e| StoreError::Corrupt {
            group: group.to_string(),
            detail: e.to_string(),
        })
    }

    fn write_history(&self, group: &str, history: &[StateRecord]) -> Result<(), StoreError> {
        let to_write_err = |e: std::io::Error| StoreError::Write {
            group: group.to_string(),
            source: e,
        };

        std::fs::create_dir_all(&self.dir).map_err(to_write_err)?;

        let serialized = serde_json::to_vec_pretty(history).map_err(|e| StoreError::Write {
            group: group.to_string(),
            source: std::io::Error::other(e),
        })?;

        // Temp file in the same directory so the rename is atomic.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(to_write_err)?;
        tmp.write_all(&serialized).map_err(to_write_err)?;
        tmp.as_file().sync_all().map_err(to_write_err)?;
        tmp.persist(self.file_path(group))
            .map_err(|e| to_write_err(e.error))?;

        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn put(&self, record: StateRecord) -> Result<(), StoreError> {
        let lock = self.lock_for(&record.group);
        let _guard = lock.lock().await;

        let group = record.group.clone();
        let mut history = self.read_history(&group)?;
        history.push(record);
        self.write_history(&group, &history)?;

        debug!("persisted state record for '{group}' ({} total)", history.len());
        Ok(())
    }

    async fn get(&self, group: &str) -> Result<Option<StateRecord>, StoreError> {
        let lock = self.lock_for(group);
        let _guard = lock.lock().await;

        let history = self.read_history(group)?;
        Ok(history.last().filter(|r| !r.is_consumed()).cloned())
    }

    async fn consume(&self, group: &str) -> Result<(), StoreError> {
        let lock = self.lock_for(group);
        let _guard = lock.lock().await;

        let mut history = self.read_history(group)?;
        match history.last_mut() {
            Some(record) if !record.is_consumed() => {
                record.consumed_at = Some(Utc::now());
                self.write_history(group, &history)?;
                debug!("consumed state record for '{group}'");
            }
            _ => debug!("consume on '{group}' found no active record"),
        }
        Ok(())
    }
}

/// Group names become file names; anything outside a conservative
/// character set is flattened.
fn sanitize(group: &str) -> String {
    group
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
