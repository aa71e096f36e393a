//! Implementation of the `ndm init` and `ndm update` commands.
//!
//! Both seed `service.json` from the dependencies listed in `package.json`.

use anyhow::{Context, Result};

use ndm_lib::config::Configuration;
use ndm_lib::init::{InitOptions, InitResult, init, update};

use crate::output::{print_info, print_line, print_success};

fn options(config: &Configuration) -> InitOptions {
  InitOptions {
    base_working_directory: config.base_working_directory.clone(),
    service_json_path: config.service_json_path.clone(),
  }
}

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if `service.json` already exists, `package.json` is
/// missing or lists no dependencies.
pub fn cmd_init(config: &Configuration) -> Result<()> {
  let result = init(&options(config)).context("Failed to initialize service.json")?;

  print_result(&result);
  if let Some(logs) = &result.logs_dir {
    print_info(&format!("created {}", logs.display()));
  }
  print_next_steps();
  Ok(())
}

/// Execute the update command.
pub fn cmd_update(config: &Configuration) -> Result<()> {
  let result = update(&options(config)).context("Failed to update service.json")?;

  print_result(&result);
  if result.added.is_empty() {
    print_info("no new services found");
  }
  print_next_steps();
  Ok(())
}

fn print_result(result: &InitResult) {
  print_info(&format!("generated {}", result.service_json.display()));
  for name in &result.added {
    print_line(&format!("  + {name}"));
  }
}

fn print_next_steps() {
  print_line("");
  print_line("edit 'service.json' to setup your application's environment.");
  print_line("when you're ready, run 'ndm generate' to generate service wrappers.");
  print_line("add dependencies to 'package.json' and run 'ndm update' to add additional services.");
  print_success("success!");
}
