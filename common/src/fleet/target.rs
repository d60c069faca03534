//! # Probe Target Model
//!
//! One host to be probed, as handed over by the inventory provider.
//!
//! The address is kept in its raw textual form because inventory output
//! is not trusted: a target with a missing or unparseable address still
//! has to appear in the run report (as skipped), so parsing is deferred
//! to [`Target::socket_addr`] instead of failing at construction.

use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

/// A single host to probe. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Stable identifier, e.g. an instance id.
    pub id: String,
    /// Network address as reported by inventory: `ip` or `ip:port`.
    #[serde(default)]
    pub addr: Option<String>,
    /// Report-grouping metadata only; never used for probing.
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl Target {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            addr: None,
            zone: None,
            account: None,
            region: None,
        }
    }

    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Resolves the raw address into a socket address.
    ///
    /// Accepts a bare IP (the default administrative port is appended)
    /// or an explicit `ip:port`. Returns `None` when the address is
    /// missing or unparseable; the caller records a skip in that case.
    pub fn socket_addr(&self, default_port: u16) -> Option<SocketAddr> {
        let raw = self.addr.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(addr) = raw.parse::<SocketAddr>() {
            return Some(addr);
        }

        raw.parse::<IpAddr>()
            .ok()
            .map(|ip| SocketAddr::new(ip, default_port))
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
