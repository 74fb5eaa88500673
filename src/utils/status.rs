//! Per-step status lines shown to the user.

use std::fmt::Display;

use console::style;

/// Status prefix for a printed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Info,
    Warn,
    DryRun,
}

impl Status {
    pub fn tag(&self) -> &'static str {
        match self {
            Status::Ok => "[OK]",
            Status::Info => "[INFO]",
            Status::Warn => "[WARN]",
            Status::DryRun => "[DRY-RUN]",
        }
    }
}

/// Print a status line to stdout, e.g. `[OK] Wrote report: tmp/pdfs/report.json`.
pub fn print_status(status: Status, message: impl Display) {
    let tag = match status {
        Status::Ok => style(status.tag()).green(),
        Status::Info => style(status.tag()).cyan(),
        Status::Warn => style(status.tag()).yellow(),
        Status::DryRun => style(status.tag()).magenta(),
    };
    println!("{} {}", tag, message);
}
