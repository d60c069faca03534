//! # Scaling-Group Process Orchestration
//!
//! The suspend/resume half of the system: a per-group state machine
//! ([`controller`]) over a durable last-write-wins store ([`store`]).
//!
//! The one invariant everything here serves: the pre-suspension state
//! is persisted *before* any mutation is issued, so a crash at any
//! point leaves enough on disk to restore from.

pub mod controller;
pub mod store;

pub use controller::{ProcessController, ResumeMode};
pub use store::{FileStateStore, StateRecord, StateStore};
