//! Shared helper functions for CLI commands.

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress bar drawn on stdout. Hidden when stdout is not a terminal.
pub fn progress_bar(len: usize, message: &'static str) -> ProgressBar {
    let progress = ProgressBar::with_draw_target(Some(len as u64), ProgressDrawTarget::stdout());
    if let Ok(bar_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
    {
        progress.set_style(bar_style.progress_chars("█▓░"));
    }
    progress.set_message(message);
    progress
}

/// `✓ <yes>` in green or `✗ <no>` in red.
pub fn availability(available: bool, yes: &str, no: &str) -> String {
    if available {
        style(format!("✓ {}", yes)).green().to_string()
    } else {
        style(format!("✗ {}", no)).red().to_string()
    }
}
