//! # Run Report
//!
//! Aggregation of per-target outcomes into a single sealed document.
//!
//! The orchestrator records outcomes in completion order (which is
//! arbitrary); sealing sorts by target id and freezes the counts. A
//! report must account for every submitted target exactly once;
//! silent omission is a defect, so the collector fills gaps with
//! skips before sealing.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::outcome::{OutcomeKind, ProbeOutcome};
use super::target::Target;

/// One (target, outcome) pair.
#[derive(Clone, Debug, Serialize)]
pub struct ReportEntry {
    pub target: Target,
    pub outcome: ProbeOutcome,
}

/// Per-kind outcome tallies.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct OutcomeCounts {
    pub success: usize,
    pub unreachable: usize,
    pub auth_failed: usize,
    pub command_failed: usize,
    pub skipped: usize,
}

impl OutcomeCounts {
    fn bump(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Success => self.success += 1,
            OutcomeKind::Unreachable => self.unreachable += 1,
            OutcomeKind::AuthenticationFailed => self.auth_failed += 1,
            OutcomeKind::CommandFailed => self.command_failed += 1,
            OutcomeKind::Skipped => self.skipped += 1,
        }
    }

    pub fn of(&self, kind: OutcomeKind) -> usize {
        match kind {
            OutcomeKind::Success => self.success,
            OutcomeKind::Unreachable => self.unreachable,
            OutcomeKind::AuthenticationFailed => self.auth_failed,
            OutcomeKind::CommandFailed => self.command_failed,
            OutcomeKind::Skipped => self.skipped,
        }
    }

    pub fn total(&self) -> usize {
        OutcomeKind::ALL.iter().map(|k| self.of(*k)).sum()
    }
}

/// The aggregated result of one probe run, consumed once by the
/// report sink.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub concurrency_limit: usize,
    pub duration: Duration,
    counts: OutcomeCounts,
    entries: Vec<ReportEntry>,
}

impl RunReport {
    /// Opens a report for incremental assembly.
    pub fn begin(concurrency_limit: usize) -> Self {
        Self {
            started_at: Utc::now(),
            concurrency_limit,
            duration: Duration::ZERO,
            counts: OutcomeCounts::default(),
            entries: Vec::new(),
        }
    }

    /// Records one outcome. Call exactly once per target.
    pub fn record(&mut self, target: Target, outcome: ProbeOutcome) {
        self.counts.bump(outcome.kind());
        self.entries.push(ReportEntry { target, outcome });
    }

    /// Freezes the report: entries ordered by target id, duration set.
    pub fn seal(mut self, duration: Duration) -> Self {
        self.entries.sort_by(|a, b| a.target.id.cmp(&b.target.id));
        self.duration = duration;
        self
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn counts(&self) -> OutcomeCounts {
        self.counts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
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
