//! TCP reachability probe.
//!
//! The cheapest check in the pipeline: does the target's administrative
//! port accept a connection within the timeout? Nothing is sent on the
//! socket; it is dropped as soon as the handshake settles.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

/// Result of a single reachability probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

/// Probes one socket address.
///
/// Never returns an error for network conditions: refusal, timeout,
/// and unroutable addresses all collapse into `Unreachable`. The only
/// side effect is the transient socket.
pub async fn probe(addr: SocketAddr, connect_timeout: Duration) -> Reachability {
    match timeout(connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => Reachability::Reachable,
        Ok(Err(_refused)) => Reachability::Unreachable,
        Err(_elapsed) => Reachability::Unreachable,
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
