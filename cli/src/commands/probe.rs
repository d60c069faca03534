use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use fleetdrill_common::config::DrillConfig;
use fleetdrill_common::{success, warn};
use fleetdrill_core::inventory::{FileInventory, InventoryProvider};
use fleetdrill_core::orchestrator::ProbeOrchestrator;
use fleetdrill_core::shell::SshValidator;

use crate::report;
use crate::terminal::{print, progress};

#[derive(Args)]
pub struct ProbeArgs {
    /// JSON file with the target list (inventory provider output)
    pub targets: PathBuf,

    /// Administrative port assumed for targets without an explicit one
    #[arg(long, default_value_t = 22)]
    pub port: u16,

    /// Maximum probes in flight at once
    #[arg(long, default_value_t = 32)]
    pub concurrency: usize,

    /// TCP connect timeout in milliseconds
    #[arg(long, default_value_t = 3_000)]
    pub connect_timeout_ms: u64,

    /// Session + command budget in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub command_timeout_ms: u64,

    /// Wall-clock budget for the whole run, in seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Remote login user
    #[arg(long, default_value = "ec2-user")]
    pub user: String,

    /// Private key for shell validation (falls back to the SSH agent)
    #[arg(long)]
    pub identity: Option<PathBuf>,

    /// Write the report as CSV to this path
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl ProbeArgs {
    fn drill_config(&self, quiet: u8) -> DrillConfig {
        DrillConfig {
            concurrency_limit: self.concurrency,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            command_timeout: Duration::from_millis(self.command_timeout_ms),
            run_deadline: self.deadline_secs.map(Duration::from_secs),
            admin_port: self.port,
            ssh_user: self.user.clone(),
            identity_file: self.identity.clone(),
            quiet,
        }
    }
}

pub async fn probe(args: ProbeArgs, quiet: u8) -> anyhow::Result<()> {
    let targets = FileInventory::new(&args.targets).targets().await?;
    if targets.is_empty() {
        warn!("target list {} is empty; nothing to probe", args.targets.display());
        return Ok(());
    }

    let cfg = args.drill_config(quiet);
    success!(
        "probing {} targets (concurrency {}, port {})",
        targets.len(),
        cfg.concurrency_limit,
        cfg.admin_port
    );

    let bar = progress::probe_bar(targets.len(), quiet);
    let bar_for_updates = bar.clone();

    let validator = Arc::new(SshValidator::from_config(&cfg));
    let orchestrator = ProbeOrchestrator::new(validator, cfg)
        .with_progress(move |done| bar_for_updates.set_position(done as u64));

    let run_report = orchestrator.run(targets).await;
    bar.finish_and_clear();

    print::report_summary(&run_report, quiet);

    if let Some(path) = &args.output {
        report::write_csv(&run_report, path)?;
        success!("report written to {}", path.display());
    }

    Ok(())
}
