//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::path::Path;

use colored::Colorize;

use crate::application::services::RecordFailure;
use crate::application::ApplicationError;
use crate::infrastructure::traits::FetchOutcome;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status indented (green checkmark with leading spaces)
pub fn success_detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print failure status (red X, indented)
pub fn failure(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Print one skipped record (red X, indented) with its identifier when known
pub fn record_failure(skipped: &RecordFailure) {
    failure(&format!(
        "record {} (pmid {}): {}",
        skipped.index,
        skipped.pmid.as_deref().unwrap_or("?"),
        skipped.error
    ));
}

/// Print one input file that was skipped as a whole
pub fn file_failure(path: &Path, error: &ApplicationError) {
    header(&path.display());
    failure(&format!("skipped: {}", error));
}

/// Print one retrieval outcome
pub fn fetch_outcome(outcome: &FetchOutcome) {
    match &outcome.result {
        Ok(path) => success_detail(&format!("{} -> {}", outcome.source, path.display())),
        Err(e) => failure(&format!("{}: {}", outcome.source, e)),
    }
}
