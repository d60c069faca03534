//! Status macros used across the workspace.
//!
//! Thin wrappers over `tracing` with dedicated targets so the CLI
//! formatter can pick symbols and colors per message class without the
//! libraries knowing anything about terminals.

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        tracing::info!(target: "fleetdrill::status", $($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        tracing::info!(target: "fleetdrill::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "fleetdrill::status", $($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        tracing::error!(target: "fleetdrill::status", $($arg)*)
    };
}
