//! CLI command definitions and user-facing output.
//!
//! Uses clap derive macros for ergonomic argument definitions.

pub mod args;

use colored::Colorize;

use codesentinel::orchestrator::ReviewSummary;

/// Print the result of a review run to stderr.
pub fn print_summary(summary: &ReviewSummary) {
    let title = summary.review.title().unwrap_or("review");
    eprintln!(
        "  {} {} {}",
        "✔".green().bold(),
        title.bold(),
        format!("({} file(s))", summary.files.len()).dimmed(),
    );
    eprintln!("    {} {}", "saved:".cyan(), summary.path.display());

    for name in &summary.notified {
        eprintln!("    {} {name}", "sent:".cyan());
    }
    for (name, reason) in &summary.notify_failures {
        eprintln!(
            "    {} {}",
            "✖".yellow().bold(),
            format!("{name} notification failed: {reason}").yellow(),
        );
    }
}
