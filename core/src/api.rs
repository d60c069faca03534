//! # Scaling-Group API Seam
//!
//! The controller talks to the cloud through [`ScalingApi`] and
//! nothing else. The production implementation shells out to the
//! `aws` CLI so credential acquisition (profiles, role assumption)
//! stays where it already lives; tests use the in-memory fake from
//! [`crate::fakes`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use fleetdrill_common::config::AwsContext;
use fleetdrill_common::error::ApiError;

/// Live automation status of a scaling group's processes.
///
/// Derived from the API on demand; the only place it is stored is
/// inside a state record, as the state to restore to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessState {
    Active,
    Suspended,
    Unknown,
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ProcessState::Active => "active",
            ProcessState::Suspended => "suspended",
            ProcessState::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// The three calls this system makes against a scaling group.
#[async_trait]
pub trait ScalingApi: Send + Sync {
    async fn describe_process_state(&self, group: &str) -> Result<ProcessState, ApiError>;
    async fn suspend_processes(&self, group: &str) -> Result<(), ApiError>;
    async fn resume_processes(&self, group: &str) -> Result<(), ApiError>;
}

/// Bounded exponential backoff for transient API failures.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Backoff for a (1-based) attempt that just failed, with jitter.
    fn backoff(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(1 << (attempt - 1).min(16));
        let capped = exp.min(self.max_delay);
        capped.mul_f64(rand::rng().random_range(0.5..1.5))
    }
}

/// Runs `call` until it succeeds, a non-transient error surfaces, or
/// the attempt budget is spent.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut call: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.backoff(attempt);
                warn!("transient API failure (attempt {attempt}), retrying in {delay:?}: {err}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) if err.is_transient() => {
                return Err(ApiError::RetriesExhausted {
                    attempts: policy.max_attempts,
                    last: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }
}

/// Production API backed by the `aws` command-line tool.
///
/// Credentials are resolved by the CLI itself from the profile/region
/// in the [`AwsContext`]; this type never touches key material.
pub struct AwsCliApi {
    ctx: AwsContext,
}

impl AwsCliApi {
    pub fn new(ctx: AwsContext) -> Self {
        Self { ctx }
    }

    async fn run(&self, args: &[&str]) -> Result<Vec<u8>, ApiError> {
        let mut cmd = tokio::process::Command::new("aws");
        cmd.arg("autoscaling").args(args).args(["--output", "json"]);
        if let Some(profile) = &self.ctx.profile {
            cmd.args(["--profile", profile]);
        }
        if let Some(region) = &self.ctx.region {
            cmd.args(["--region", region]);
        }

        debug!("aws autoscaling {}", args.join(" "));
        let output = cmd
            .output()
            .await
            .map_err(|e| ApiError::Transient(format!("failed to launch aws cli: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(classify_cli_failure(stderr));
        }

        Ok(output.stdout)
    }
}

/// Throttling and timeouts are worth retrying; everything else the
/// CLI rejects is treated as permanent.
fn classify_cli_failure(stderr: String) -> ApiError {
    const TRANSIENT_MARKERS: [&str; 4] =
        ["Throttling", "RequestLimitExceeded", "timed out", "ServiceUnavailable"];

    if TRANSIENT_MARKERS.iter().any(|m| stderr.contains(m)) {
        ApiError::Transient(stderr)
    } else {
        ApiError::Fatal(stderr)
    }
}

#[derive(Deserialize)]
struct DescribeResponse {
    #[serde(rename = "AutoScalingGroups")]
    groups: Vec<GroupView>,
}

#[derive(Deserialize)]
struct GroupView {
    #[serde(rename = "SuspendedProcesses", default)]
    suspended_processes: Vec<serde_json::Value>,
}

#[async_trait]
impl ScalingApi for AwsCliApi {
    async fn describe_process_state(&self, group: &str) -> Result<ProcessState, ApiError> {
        let raw = self
            .run(&[
                "describe-auto-scaling-groups",
                "--auto-scaling-group-names",
                group,
                "--max-records",
                "1",
            ])
            .await?;

        let parsed: DescribeResponse = serde_json::from_slice(&raw)
            .map_err(|e| ApiError::Fatal(format!("unparseable describe response: {e}")))?;

        match parsed.groups.first() {
            None => Err(ApiError::Fatal(format!("no such scaling group: {group}"))),
            Some(view) if view.suspended_processes.is_empty() => Ok(ProcessState::Active),
            Some(_) => Ok(ProcessState::Suspended),
        }
    }

    async fn suspend_processes(&self, group: &str) -> Result<(), ApiError> {
        self.run(&["suspend-processes", "--auto-scaling-group-name", group])
            .await
            .map(|_| ())
    }

    async fn resume_processes(&self, group: &str) -> Result<(), ApiError> {
        self.run(&["resume-processes", "--auto-scaling-group-name", group])
            .await
            .map(|_| ())
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
