//! Implementation of `ndm start`, `stop`, `restart` and `remove`.

use anyhow::{Context, Result};

use ndm_lib::commands::CommandTable;

use crate::output::{print_line, print_report};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
  Start,
  Stop,
  Restart,
  Remove,
}

impl Control {
  fn banner(self) -> &'static str {
    match self {
      Control::Start => "starting services:",
      Control::Stop => "stopping services:",
      Control::Restart => "restarting services:",
      Control::Remove => "removing services:",
    }
  }
}

/// Run one service-manager operation over the selected services.
///
/// Failures are printed per service and do not stop the batch.
pub fn cmd_control<T: CommandTable>(table: &mut T, control: Control, filter: Option<&str>) -> Result<()> {
  print_line(control.banner());

  let rt = super::runtime()?;
  let report = rt
    .block_on(async {
      match control {
        Control::Start => table.start(filter).await,
        Control::Stop => table.stop(filter).await,
        Control::Restart => table.restart(filter).await,
        Control::Remove => table.remove(filter).await,
      }
    })
    .context("Failed to load services")?;

  print_report(&report);
  Ok(())
}
