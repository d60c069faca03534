//! Per-target probe results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ShellError;

/// The result of probing one target. Write-once; exactly one per
/// target per run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ProbeOutcome {
    /// Port accepted, session authenticated, diagnostic command ran.
    Success { response: String },
    /// Administrative port closed, timed out, or unresolvable.
    Unreachable,
    /// The remote side rejected our credentials.
    AuthenticationFailed,
    /// Session established but the diagnostic command (or the session
    /// itself) failed.
    CommandFailed { detail: String },
    /// The target was never probed: missing address, or the run
    /// deadline elapsed first.
    Skipped { reason: String },
}

impl ProbeOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ProbeOutcome::Success { .. } => OutcomeKind::Success,
            ProbeOutcome::Unreachable => OutcomeKind::Unreachable,
            ProbeOutcome::AuthenticationFailed => OutcomeKind::AuthenticationFailed,
            ProbeOutcome::CommandFailed { .. } => OutcomeKind::CommandFailed,
            ProbeOutcome::Skipped { .. } => OutcomeKind::Skipped,
        }
    }

    /// Human-readable detail for report rendering, where one exists.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ProbeOutcome::Success { response } => Some(response),
            ProbeOutcome::CommandFailed { detail } => Some(detail),
            ProbeOutcome::Skipped { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }
}

impl From<ShellError> for ProbeOutcome {
    fn from(err: ShellError) -> Self {
        match err {
            ShellError::Authentication(_) => ProbeOutcome::AuthenticationFailed,
            ShellError::Command { detail } => ProbeOutcome::CommandFailed { detail },
            // A session-level fault still carries its diagnostic.
            ShellError::Session(detail) => ProbeOutcome::CommandFailed { detail },
        }
    }
}

/// Closed enumeration of outcome kinds, for counting and rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    Success,
    Unreachable,
    AuthenticationFailed,
    CommandFailed,
    Skipped,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 5] = [
        OutcomeKind::Success,
        OutcomeKind::Unreachable,
        OutcomeKind::AuthenticationFailed,
        OutcomeKind::CommandFailed,
        OutcomeKind::Skipped,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Unreachable => "unreachable",
            OutcomeKind::AuthenticationFailed => "auth-failed",
            OutcomeKind::CommandFailed => "command-failed",
            OutcomeKind::Skipped => "skipped",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
