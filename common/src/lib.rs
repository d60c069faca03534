//! Shared domain types for the fleetdrill workspace.
//!
//! Everything in here is plain data and error definitions: run
//! configuration, probe targets and outcomes, the run report, and the
//! error taxonomy. No I/O happens in this crate.

pub mod config;
pub mod error;
pub mod fleet;
mod macros;
