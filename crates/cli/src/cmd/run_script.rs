//! Implementation of `ndm run-script`.

use anyhow::{Context, Result};

use ndm_lib::commands::CommandTable;

use super::list::print_scripts;
use crate::output::{print_report, print_warning};

/// Run a named script for every service declaring it, with the service's
/// env and args. With no matching service the available scripts are listed.
pub fn cmd_run_script<T: CommandTable>(table: &mut T, script: &str, args: &[String]) -> Result<()> {
  let rt = super::runtime()?;
  let report = rt
    .block_on(table.run_script(script, None, args))
    .context("Failed to load services")?;

  if report.is_empty() {
    print_warning(&format!("no service has a script named '{script}'"));
    let services = rt.block_on(table.list_scripts(None)).context("Failed to load services")?;
    print_scripts(&services);
    return Ok(());
  }

  // Successful runs already streamed their output.
  let failed = ndm_lib::commands::BatchReport {
    outcomes: report.failures().cloned().collect(),
  };
  print_report(&failed);
  Ok(())
}
