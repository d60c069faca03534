//! CSV export of a probe run.

use std::fs;
use std::path::Path;

use anyhow::Context;

use fleetdrill_common::fleet::RunReport;

fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// One row per target, in target-id order. Details get quoted so SSH
/// error text with commas survives the format.
pub fn write_csv(report: &RunReport, path: &Path) -> anyhow::Result<()> {
    let mut out = String::from("instance_id,outcome,detail\n");
    for entry in report.entries() {
        out.push_str(&csv_field(&entry.target.id));
        out.push(',');
        out.push_str(entry.outcome.kind().label());
        out.push(',');
        out.push_str(&csv_field(entry.outcome.detail().unwrap_or("")));
        out.push('\n');
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
    }
    fs::write(path, out).with_context(|| format!("writing report to {}", path.display()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
