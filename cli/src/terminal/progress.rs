use indicatif::{ProgressBar, ProgressStyle};

/// Bar tracking completed probes. Hidden entirely in quiet mode so
/// scripted runs get clean output.
pub fn probe_bar(total: usize, quiet: u8) -> ProgressBar {
    if quiet > 0 {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} probed ({elapsed})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    bar
}
