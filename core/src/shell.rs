//! # Remote Shell Validation
//!
//! Second stage of the probe pipeline: given a target whose
//! administrative port already answered, open an authenticated SSH
//! session and run one fixed diagnostic command.
//!
//! Callers compose this behind the [`ShellValidator`] trait so the
//! orchestrator (and every test) never depends on a live sshd.
//! Reachability is a precondition here, not re-checked.

use std::io::Read;
use std::net::{SocketAddr, TcpStream};
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use ssh2::Session;
use tracing::debug;

use fleetdrill_common::config::DrillConfig;
use fleetdrill_common::error::ShellError;
use fleetdrill_common::fleet::Target;

/// The one command every validated host must answer.
const DIAGNOSTIC_COMMAND: &str = "uptime";

/// Validates that a reachable target accepts our credentials and can
/// execute a command.
#[async_trait]
pub trait ShellValidator: Send + Sync {
    /// Runs the diagnostic command on `addr`, returning its output.
    ///
    /// Every exit path (success, auth rejection, command failure,
    /// unexpected fault) must release the session; no leaked handles.
    async fn validate(&self, target: &Target, addr: SocketAddr) -> Result<String, ShellError>;
}

/// Production validator backed by `ssh2`.
///
/// libssh2 is a blocking library, so each validation runs on the
/// blocking thread pool with socket-level timeouts; the async caller
/// only awaits the join handle.
pub struct SshValidator {
    user: String,
    identity_file: Option<PathBuf>,
    command_timeout: Duration,
}

impl SshValidator {
    pub fn new(user: impl Into<String>, identity_file: Option<PathBuf>, command_timeout: Duration) -> Self {
        Self {
            user: user.into(),
            identity_file,
            command_timeout,
        }
    }

    pub fn from_config(cfg: &DrillConfig) -> Self {
        Self::new(cfg.ssh_user.clone(), cfg.identity_file.clone(), cfg.command_timeout)
    }
}

#[async_trait]
impl ShellValidator for SshValidator {
    async fn validate(&self, target: &Target, addr: SocketAddr) -> Result<String, ShellError> {
        debug!("validating shell access on {} ({addr})", target.id);

        let user = self.user.clone();
        let identity = self.identity_file.clone();
        let timeout = self.command_timeout;

        tokio::task::spawn_blocking(move || exec_diagnostic(addr, &user, identity.as_deref(), timeout))
            .await
            .map_err(|join_err| ShellError::Session(format!("validation task failed: {join_err}")))?
    }
}

/// Blocking session lifecycle. The session and channel are owned by
/// this frame, so every return path drops (and thereby closes) them.
fn exec_diagnostic(
    addr: SocketAddr,
    user: &str,
    identity: Option<&std::path::Path>,
    timeout: Duration,
) -> Result<String, ShellError> {
    let tcp = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|e| ShellError::Session(format!("connect: {e}")))?;
    tcp.set_read_timeout(Some(timeout)).ok();
    tcp.set_write_timeout(Some(timeout)).ok();

    let mut session =
        Session::new().map_err(|e| ShellError::Session(format!("session init: {e}")))?;
    // Caps every blocking libssh2 call, command execution included.
    session.set_timeout(timeout.as_millis().min(u32::MAX as u128) as u32);
    session.set_tcp_stream(tcp);
    session
        .handshake()
        .map_err(|e| ShellError::Session(format!("handshake: {e}")))?;

    authenticate(&session, user, identity)?;

    let mut channel = session
        .channel_session()
        .map_err(|e| ShellError::Session(format!("channel open: {e}")))?;

    channel.exec(DIAGNOSTIC_COMMAND).map_err(|e| ShellError::Command {
        detail: format!("exec: {e}"),
    })?;

    let mut stdout = String::new();
    channel.read_to_string(&mut stdout).map_err(|e| ShellError::Command {
        detail: format!("read: {e}"),
    })?;

    let mut stderr = String::new();
    let _ = channel.stderr().read_to_string(&mut stderr);

    let _ = channel.wait_close();
    let exit_status = channel.exit_status().unwrap_or(-1);
    if exit_status != 0 {
        return Err(ShellError::Command {
            detail: format!("'{DIAGNOSTIC_COMMAND}' exited {exit_status}: {}", stderr.trim()),
        });
    }

    Ok(stdout.trim().to_string())
}

fn authenticate(
    session: &Session,
    user: &str,
    identity: Option<&std::path::Path>,
) -> Result<(), ShellError> {
    let auth_result = match identity {
        Some(key) => session.userauth_pubkey_file(user, None, key, None),
        // No explicit identity: fall back to the running agent.
        None => session.userauth_agent(user),
    };

    auth_result.map_err(|e| ShellError::Authentication(e.to_string()))?;

    if !session.authenticated() {
        return Err(ShellError::Authentication(format!(
            "server rejected credentials for '{user}'"
        )));
    }

    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// A listener that accepts TCP but speaks no SSH: the handshake
    /// must fail as a session fault, not hang and not panic.
    #[tokio::test]
    async fn non_ssh_listener_is_a_session_fault() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            // Accept and immediately hang up.
            if let Ok((stream, _)) = listener.accept().await {
                drop(stream);
            }
        });

        let validator = SshValidator::new("nobody", None, Duration::from_millis(750));
        let target = Target::new("i-test");
        let result = validator.validate(&target, addr).await;

        assert!(matches!(result, Err(ShellError::Session(_))), "got {result:?}");
    }

    #[tokio::test]
    #[ignore]
    async fn live_sshd_round_trip() {
        // Requires a local sshd with agent credentials for $USER.
        let addr: SocketAddr = "127.0.0.1:22".parse().unwrap();
        let user = std::env::var("USER").unwrap_or_else(|_| "root".into());
        let validator = SshValidator::new(user, None, Duration::from_secs(5));
        let output = validator.validate(&Target::new("local"), addr).await.unwrap();
        assert!(!output.is_empty());
    }
}
