//! # Fleet Domain Model
//!
//! Targets, per-target probe outcomes, and the aggregated run report.
//! All of it is owned by a single run and discarded at run end; the
//! only cross-run state in the system lives in the ASG state store.

pub mod outcome;
pub mod report;
pub mod target;

pub use outcome::{OutcomeKind, ProbeOutcome};
pub use report::{ReportEntry, RunReport};
pub use target::Target;
