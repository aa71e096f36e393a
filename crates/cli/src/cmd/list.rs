//! Implementation of `ndm list` and `ndm list-scripts`.

use anyhow::{Context, Result};

use ndm_lib::commands::CommandTable;
use ndm_lib::service::ServiceEntity;

use crate::output::{print_line, print_success};

pub fn cmd_list<T: CommandTable>(table: &mut T, filter: Option<&str>) -> Result<()> {
  let services = super::runtime()?
    .block_on(table.list(filter))
    .context("Failed to load services")?;

  for entity in &services {
    print_line(&format!("{}:\t{}", entity.name, entity.description));
  }
  Ok(())
}

pub fn cmd_list_scripts<T: CommandTable>(table: &mut T, filter: Option<&str>) -> Result<()> {
  let services = super::runtime()?
    .block_on(table.list_scripts(filter))
    .context("Failed to load services")?;

  print_scripts(&services);
  Ok(())
}

/// Each service followed by its script names.
pub(crate) fn print_scripts(services: &[ServiceEntity]) {
  for entity in services {
    print_line(&format!("{}:\t{}", entity.name, entity.description));
    let names: Vec<_> = entity.script_names().map(|name| format!("  {name}")).collect();
    if !names.is_empty() {
      print_success(&format!("\n{}", names.join("\n")));
    }
  }
}
