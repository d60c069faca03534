//! Terminal log formatting.
//!
//! One custom `FormatEvent` implementation maps message classes to
//! symbols: the status macros in `fleetdrill-common` tag events with
//! dedicated targets, and report lines pass through without any
//! prefix at all.

use colored::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

const SUCCESS_TARGET: &str = "fleetdrill::success";
const REPORT_TARGET: &str = "fleetdrill::report";

pub struct DrillFormatter;

impl<S, N> FormatEvent<S, N> for DrillFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        // Report lines are pre-formatted; no symbol, no decoration.
        if meta.target() == REPORT_TARGET {
            ctx.field_format().format_fields(writer.by_ref(), event)?;
            return writeln!(writer);
        }

        let symbol: ColoredString = if meta.target() == SUCCESS_TARGET {
            "[+]".green().bold()
        } else {
            match *meta.level() {
                Level::TRACE => "[ ]".dimmed(),
                Level::DEBUG => "[?]".cyan(),
                Level::INFO => "[>]".blue(),
                Level::WARN => "[!]".yellow().bold(),
                Level::ERROR => "[-]".red().bold(),
            }
        };

        write!(writer, "{} ", symbol)?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the subscriber. `RUST_LOG` still wins when set; the quiet
/// level otherwise decides how chatty the default is.
pub fn init(quiet: u8) {
    let default_directive = match quiet {
        0 => "info",
        1 => "warn",
        _ => "error",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(DrillFormatter)
        .init();
}
