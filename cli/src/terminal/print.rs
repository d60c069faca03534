//! Report-oriented terminal output.
//!
//! Everything funnels through [`line`], which emits on the raw
//! report target so the formatter prints it without a symbol prefix.

use colored::*;
use tracing::info;

use fleetdrill_common::fleet::{OutcomeKind, RunReport};

pub const TOTAL_WIDTH: usize = 64;

pub fn line(msg: &str) {
    info!(target: "fleetdrill::report", "{msg}");
}

pub fn header(msg: &str, quiet: u8) {
    if quiet > 0 {
        return;
    }

    let tagged = format!("[ {} ]", msg.to_uppercase());
    let dash_count = TOTAL_WIDTH.saturating_sub(console::measure_text_width(&tagged));
    let left = dash_count / 2;
    let right = dash_count - left;

    let rendered = format!(
        "{}{}{}",
        "─".repeat(left).bright_black(),
        tagged.bright_green(),
        "─".repeat(right).bright_black()
    );
    line(&rendered);
}

pub fn separator() {
    line(&format!("{}", "─".repeat(TOTAL_WIDTH).bright_black()));
}

fn colored_kind(kind: OutcomeKind) -> ColoredString {
    match kind {
        OutcomeKind::Success => kind.label().green(),
        OutcomeKind::Unreachable => kind.label().red(),
        OutcomeKind::AuthenticationFailed => kind.label().red().bold(),
        OutcomeKind::CommandFailed => kind.label().yellow(),
        OutcomeKind::Skipped => kind.label().bright_black(),
    }
}

/// Per-target lines plus the per-kind tally.
pub fn report_summary(report: &RunReport, quiet: u8) {
    if quiet < 2 {
        header("probe results", quiet);
        for entry in report.entries() {
            let kind = colored_kind(entry.outcome.kind());
            let detail = entry.outcome.detail().unwrap_or("");
            if detail.is_empty() {
                line(&format!("  {} {}", entry.target.id.cyan(), kind));
            } else {
                line(&format!(
                    "  {} {} {}",
                    entry.target.id.cyan(),
                    kind,
                    detail.bright_black()
                ));
            }
        }
        separator();
    }

    let counts = report.counts();
    let tally: Vec<String> = OutcomeKind::ALL
        .iter()
        .filter(|kind| counts.of(**kind) > 0)
        .map(|kind| format!("{} {}", counts.of(*kind), colored_kind(*kind)))
        .collect();

    line(&format!(
        "{} targets in {:.2}s: {}",
        counts.total().to_string().bold(),
        report.duration.as_secs_f64(),
        tally.join(", ")
    ));
}
