use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for one drill invocation.
///
/// Assembled by the CLI and handed to each component at construction.
/// Components never read ambient global state.
#[derive(Clone, Debug)]
pub struct DrillConfig {
    /// Maximum number of probe tasks in flight at once.
    pub concurrency_limit: usize,
    /// Per-target TCP connect timeout.
    pub connect_timeout: Duration,
    /// Budget for one authenticated session, command execution included.
    pub command_timeout: Duration,
    /// Wall-clock budget for the whole run.
    ///
    /// When it elapses, outstanding probes are cancelled and recorded
    /// as skipped; nothing is dropped from the report.
    pub run_deadline: Option<Duration>,
    /// Administrative port assumed when a target address carries no port.
    pub admin_port: u16,
    /// Remote login user for shell validation.
    pub ssh_user: String,
    /// Private key used for shell validation.
    pub identity_file: Option<PathBuf>,
    /// Output verbosity. 0 prints everything, higher values trim output.
    pub quiet: u8,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 32,
            connect_timeout: Duration::from_secs(3),
            command_timeout: Duration::from_secs(10),
            run_deadline: None,
            admin_port: 22,
            ssh_user: "ec2-user".to_string(),
            identity_file: None,
            quiet: 0,
        }
    }
}

/// Where cloud API calls should authenticate.
///
/// Passed through verbatim to the credential-owning collaborator; this
/// crate attaches no semantics to the values.
#[derive(Clone, Debug, Default)]
pub struct AwsContext {
    pub profile: Option<String>,
    pub region: Option<String>,
}
