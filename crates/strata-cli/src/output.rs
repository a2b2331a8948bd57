// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal styling for CLI output.
//!
//! Honors NO_COLOR and FORCE_COLOR; colors are dropped when output is piped.

use colored::{ColoredString, Colorize};

/// Apply color overrides from the environment. Call once at startup.
pub fn init() {
    if std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    } else if std::env::var_os("FORCE_COLOR").is_some() {
        colored::control::set_override(true);
    }
}

pub fn banner_ok(what: &str) -> String {
    format!("{} {} {}", "===".dimmed(), format!("{what} OK").green().bold(), "===".dimmed())
}

pub fn banner_fail(phase: &str) -> String {
    format!(
        "{} {} {}",
        "===".dimmed(),
        format!("{phase} FAILED").red().bold(),
        "===".dimmed()
    )
}

pub fn heading(text: &str) -> String {
    format!("{} {} {}", "===".dimmed(), text, "===".dimmed())
}

pub fn file_path(path: &str) -> ColoredString {
    path.underline()
}

pub fn status_pass() -> ColoredString {
    "✓".green()
}
