//! CLI output formatting utilities.
//!
//! Colored status messages with Unicode symbols. Headless mode silences
//! everything printed here. Printing an error sets a process-wide flag that
//! decides the exit status.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::{OwoColorize, Stream};

use ndm_lib::commands::{BatchReport, Outcome};

static HEADLESS: AtomicBool = AtomicBool::new(false);
static ERROR_LOGGED: AtomicBool = AtomicBool::new(false);

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

pub fn set_headless(headless: bool) {
  HEADLESS.store(headless, Ordering::Relaxed);
}

fn headless() -> bool {
  HEADLESS.load(Ordering::Relaxed)
}

pub fn error_logged() -> bool {
  ERROR_LOGGED.load(Ordering::Relaxed)
}

/// Exit status for the invocation: failure once any error was printed.
pub fn exit_code() -> ExitCode {
  if error_logged() { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

pub fn print_line(message: &str) {
  if !headless() {
    println!("{message}");
  }
}

pub fn print_success(message: &str) {
  if headless() {
    return;
  }
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  ERROR_LOGGED.store(true, Ordering::Relaxed);
  if headless() {
    return;
  }
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  if headless() {
    return;
  }
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  if headless() {
    return;
  }
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  if headless() {
    return;
  }
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

/// One line per entity outcome.
pub fn print_report(report: &BatchReport) {
  for entry in &report.outcomes {
    let line = format!("{} {} {} {}", entry.action, entry.service, symbols::ARROW, entry.script_path.display());
    match &entry.outcome {
      Outcome::Done => print_success(&line),
      Outcome::Skipped(reason) => print_warning(&format!("{}: {reason}", entry.service)),
      Outcome::Failed(message) => print_error(&format!("{line}: {message}")),
    }
  }
}
