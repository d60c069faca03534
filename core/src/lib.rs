//! Core engine of the fleetdrill workspace.
//!
//! Two independent pieces live here:
//! * the connectivity side: [`probe`], [`shell`], and the
//!   [`orchestrator`] that fans both out across a fleet under a
//!   bounded concurrency limit, and
//! * the process-state side: the [`asg`] controller and its durable
//!   state store, which suspend and resume a scaling group's
//!   automated processes crash-safely.
//!
//! External collaborators (inventory, cloud API, credentials) enter
//! only through the traits in [`inventory`] and [`api`]; the in-memory
//! implementations in [`fakes`] satisfy those contracts for tests.

pub mod api;
pub mod asg;
pub mod fakes;
pub mod inventory;
pub mod orchestrator;
pub mod probe;
pub mod shell;
