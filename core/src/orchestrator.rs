//! # Probe Orchestrator
//!
//! Fans the probe pipeline out across a target set: one tokio task
//! per target, gated by a semaphore, with every completion flowing
//! through a channel into a single collector. The collector is the
//! sole writer of the report, so concurrent completions can never
//! interleave partial records.
//!
//! Accounting rule: the sealed report carries exactly one outcome per
//! submitted target, even when the deadline fires with work still in
//! flight. Tasks that never finished are recorded as skipped, not
//! dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::time::Instant;
use tracing::debug;

use fleetdrill_common::config::DrillConfig;
use fleetdrill_common::fleet::{ProbeOutcome, RunReport, Target};
use fleetdrill_common::warn;

use crate::probe::{self, Reachability};
use crate::shell::ShellValidator;

const DEADLINE_SKIP_REASON: &str = "deadline exceeded";
const NO_ADDRESS_SKIP_REASON: &str = "no usable address";

/// Effectively "no deadline" when none is configured.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

type ProgressFn = Arc<dyn Fn(usize) + Send + Sync>;

/// Runs the probe pipeline over a target set under a bounded
/// concurrency limit.
pub struct ProbeOrchestrator {
    validator: Arc<dyn ShellValidator>,
    config: DrillConfig,
    on_outcome: Option<ProgressFn>,
}

impl ProbeOrchestrator {
    pub fn new(validator: Arc<dyn ShellValidator>, config: DrillConfig) -> Self {
        Self {
            validator,
            config,
            on_outcome: None,
        }
    }

    /// Registers a callback invoked with the running completion count
    /// after each outcome lands. Used by the CLI progress bar.
    pub fn with_progress(mut self, on_outcome: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_outcome = Some(Arc::new(on_outcome));
        self
    }

    /// Probes every target and seals a complete run report.
    pub async fn run(&self, targets: Vec<Target>) -> RunReport {
        let total = targets.len();
        let limit = self.config.concurrency_limit.max(1);
        let started = Instant::now();
        debug!("starting probe run: {total} targets, concurrency {limit}");

        let semaphore = Arc::new(Semaphore::new(limit));
        let (tx, mut rx) = mpsc::channel::<(usize, ProbeOutcome)>(total.max(1));

        let mut handles = Vec::with_capacity(total);
        for (idx, target) in targets.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let validator = Arc::clone(&self.validator);
            let config = self.config.clone();
            let tx = tx.clone();

            handles.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let outcome = probe_one(&target, validator.as_ref(), &config).await;
                let _ = tx.send((idx, outcome)).await;
            }));
        }
        drop(tx);

        let deadline = tokio::time::sleep(self.config.run_deadline.unwrap_or(FAR_FUTURE));
        tokio::pin!(deadline);

        let mut outcomes: Vec<Option<ProbeOutcome>> = vec![None; total];
        let mut received = 0usize;

        while received < total {
            tokio::select! {
                completion = rx.recv() => match completion {
                    Some((idx, outcome)) => {
                        if outcomes[idx].replace(outcome).is_none() {
                            received += 1;
                        }
                        if let Some(on_outcome) = &self.on_outcome {
                            on_outcome(received);
                        }
                    }
                    // All senders gone; the fill-in pass below covers
                    // any task that died without reporting.
                    None => break,
                },
                _ = &mut deadline => {
                    for handle in &handles {
                        handle.abort();
                    }
                    // Keep completions that were already buffered.
                    while let Ok((idx, outcome)) = rx.try_recv() {
                        if outcomes[idx].replace(outcome).is_none() {
                            received += 1;
                        }
                    }
                    warn!("run deadline elapsed with {} probes outstanding", total - received);
                    break;
                }
            }
        }

        let mut report = RunReport::begin(limit);
        for (idx, target) in targets.into_iter().enumerate() {
            let outcome = outcomes[idx].take().unwrap_or(ProbeOutcome::Skipped {
                reason: DEADLINE_SKIP_REASON.to_string(),
            });
            report.record(target, outcome);
        }

        report.seal(started.elapsed())
    }
}

/// The per-target pipeline: address check, reachability, then shell
/// validation. Unreachable targets never reach the validator.
async fn probe_one(
    target: &Target,
    validator: &dyn ShellValidator,
    config: &DrillConfig,
) -> ProbeOutcome {
    let Some(addr) = target.socket_addr(config.admin_port) else {
        return ProbeOutcome::Skipped {
            reason: NO_ADDRESS_SKIP_REASON.to_string(),
        };
    };

    match probe::probe(addr, config.connect_timeout).await {
        Reachability::Unreachable => ProbeOutcome::Unreachable,
        Reachability::Reachable => match validator.validate(target, addr).await {
            Ok(response) => ProbeOutcome::Success { response },
            Err(err) => err.into(),
        },
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
