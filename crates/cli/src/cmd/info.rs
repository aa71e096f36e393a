use ndm_lib::config::Configuration;

use crate::output::{print_stat, print_success};

pub fn cmd_version(config: &Configuration) {
  print_success(&format!("ndm v{}", env!("CARGO_PKG_VERSION")));
  print_stat("Platform", config.platform.as_str());
  print_stat("Services", &config.service_json_path.display().to_string());
  print_stat("Wrappers", &config.daemons_dir().display().to_string());
  print_stat("Logs", &config.logs_directory.display().to_string());
}
