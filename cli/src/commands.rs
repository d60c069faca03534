pub mod probe;
pub mod resume;
pub mod suspend;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fleetdrill")]
#[command(about = "Disaster-recovery drill tooling for cloud fleets.")]
pub struct CommandLine {
    /// Trim terminal output. Repeat to trim more.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe fleet hosts for TCP reachability and shell access
    #[command(alias = "p")]
    Probe(probe::ProbeArgs),
    /// Suspend scaling-group automation, capturing state first
    Suspend(GroupArgs),
    /// Resume scaling-group automation from captured state
    Resume(GroupArgs),
}

/// Shared arguments for the suspend/resume commands.
#[derive(Args)]
pub struct GroupArgs {
    /// Scaling group names to operate on
    #[arg(required = true)]
    pub groups: Vec<String>,

    /// Directory holding the durable state records
    #[arg(long, default_value = "fleetdrill-state")]
    pub state_dir: PathBuf,

    /// AWS CLI profile to authenticate with
    #[arg(long)]
    pub profile: Option<String>,

    /// AWS region override
    #[arg(long)]
    pub region: Option<String>,
}

impl GroupArgs {
    pub fn aws_context(&self) -> fleetdrill_common::config::AwsContext {
        fleetdrill_common::config::AwsContext {
            profile: self.profile.clone(),
            region: self.region.clone(),
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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
