//! Implementation of the `ndm generate` command.

use anyhow::{Context, Result};

use ndm_lib::commands::{CommandTable, Outcome};
use ndm_lib::platform::Platform;

use crate::output::{print_line, print_report, print_stat, print_success};

/// Render a wrapper for every selected service.
///
/// `extra` holds the arguments given after `--`; they are appended to each
/// wrapper's argument list.
pub fn cmd_generate<T: CommandTable>(table: &mut T, filter: Option<&str>, extra: &[String]) -> Result<()> {
  print_line("generating service wrappers:");

  let report = super::runtime()?
    .block_on(table.generate(filter, extra))
    .context("Failed to generate service wrappers")?;
  print_report(&report);

  for entry in report.outcomes.iter().filter(|o| o.outcome == Outcome::Done) {
    print_stat(&format!("{} log path", entry.service), &entry.log_file.display().to_string());
  }

  print_run_hint(table.config().platform);
  Ok(())
}

fn print_run_hint(platform: Platform) {
  print_line("");
  print_line("to start all services run: 'ndm start'");
  let manual = match platform {
    Platform::Darwin => "launchctl load <wrapper>",
    Platform::Centos => "initctl start <service>",
    Platform::Ubuntu | Platform::InitD => "service <service> start",
  };
  print_line(&format!("or start a service manually with '{manual}'"));
  print_success("success!");
}
