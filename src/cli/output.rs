use std::sync::OnceLock;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

static QUIET: OnceLock<bool> = OnceLock::new();

/// Silence everything except errors. Only the first call has an effect.
pub fn set_quiet(quiet: bool) {
    let _ = QUIET.set(quiet);
}

fn quiet() -> bool {
    QUIET.get().copied().unwrap_or(false)
}

/// Print a success message.
pub fn success(msg: &str) {
    if !quiet() {
        println!("  {} {}", "✓".green(), msg);
    }
}

/// Print an unchanged / informational line.
pub fn unchanged(msg: &str) {
    if !quiet() {
        println!("  {} {}", "·".dimmed(), msg);
    }
}

/// Print a warning message.
pub fn warning(msg: &str) {
    if !quiet() {
        println!("  {} {}", "⚠".yellow(), msg);
    }
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a header line.
pub fn header(msg: &str) {
    if !quiet() {
        println!("\n{}", msg.bold());
    }
}

/// Print an indented detail line.
pub fn detail(msg: &str) {
    if !quiet() {
        println!("    {}", msg.dimmed());
    }
}

/// Start a spinner on stderr. Hidden in quiet mode.
pub fn spinner(msg: &str) -> ProgressBar {
    if quiet() {
        return ProgressBar::hidden();
    }
    let sp = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
        sp.set_style(style);
    }
    sp.set_message(msg.to_string());
    sp.enable_steady_tick(Duration::from_millis(80));
    sp
}

/// Clear a spinner without printing anything in its place.
pub fn clear_spinner(sp: ProgressBar) {
    sp.finish_and_clear();
}
