//! # Error Taxonomy
//!
//! Three families of failure, with different blast radii:
//! * [`ShellError`]: per-target, becomes a probe outcome, never aborts a run.
//! * [`StoreError`]: fatal to the single suspend/resume that needed the
//!   record; the operation must stop rather than proceed without its
//!   safety state.
//! * [`ApiError`]: transient variants are retried with backoff; after
//!   exhaustion the failure is fatal to that one group, not to the run.

use thiserror::Error;

/// Failure modes of one remote shell validation.
///
/// Authentication and command failures are deliberately distinct
/// variants; callers must not collapse them.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("remote authentication rejected: {0}")]
    Authentication(String),

    #[error("remote command failed: {detail}")]
    Command { detail: String },

    #[error("session fault: {0}")]
    Session(String),
}

/// Failure modes of the durable state store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to persist state record for '{group}': {source}")]
    Write {
        group: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read state record for '{group}': {source}")]
    Read {
        group: String,
        #[source]
        source: std::io::Error,
    },

    #[error("state record for '{group}' is corrupt: {detail}")]
    Corrupt { group: String, detail: String },
}

/// Failure modes of a cloud API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Worth retrying: throttling, timeouts, 5xx-class conditions.
    #[error("transient API failure: {0}")]
    Transient(String),

    /// Not worth retrying: bad input, missing group, permission denied.
    #[error("API call rejected: {0}")]
    Fatal(String),

    /// Backoff budget spent without a success.
    #[error("API call failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

impl ApiError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transient(_))
    }
}

/// Failure of one suspend/resume operation on one group.
///
/// Never escalates past the group it names; the caller records it and
/// moves on to the next group.
#[derive(Debug, Error)]
pub enum GroupOpError {
    /// A prior suspend left an unconsumed record behind; suspending
    /// again would overwrite the state we still owe a restore for.
    #[error("unconsumed state record already exists for '{group}'; resume it first")]
    PendingRecord { group: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
