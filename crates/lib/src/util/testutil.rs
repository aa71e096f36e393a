//! Test utilities for ndm-lib.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use crate::execute::{ExecuteError, Executor};
use crate::manifest::ValueMap;
use crate::platform::Platform;
use crate::service::{RuntimeSettings, ServiceEntity, ServiceLayout};

/// Layout rooted at `base`, targeting Ubuntu with wrappers in `base/daemons`.
pub fn layout(base: &Path) -> ServiceLayout {
  ServiceLayout {
    base_working_directory: base.to_path_buf(),
    root_package_name: None,
    daemons_directory: base.join("daemons"),
    daemon_extension: ".conf".to_string(),
    logs_directory: base.join("logs"),
    platform: Platform::Ubuntu,
    global_package: false,
    runtime: RuntimeSettings {
      node_bin: "/usr/bin/node".to_string(),
      uid: None,
      gid: None,
      sudo: false,
      template: None,
    },
  }
}

/// A bare entity with the given scripts object.
pub fn entity(name: &str, scripts: Value) -> ServiceEntity {
  let base = PathBuf::from("/srv/app");
  let layout = layout(&base);
  ServiceEntity {
    name: name.to_string(),
    description: String::new(),
    module: name.to_string(),
    process_index: 0,
    scripts: scripts.as_object().cloned().unwrap_or_default(),
    env: ValueMap::new(),
    args: ValueMap::new(),
    working_directory: layout.working_directory(name),
    log_file: layout.logs_directory.join(format!("{name}.log")),
    script_path: layout.daemons_directory.join(format!("{name}.conf")),
    platform: layout.platform,
    runtime: layout.runtime,
  }
}

/// Write `value` as JSON to `path`, creating parent directories.
pub fn write_json(path: &Path, value: &Value) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Records commands instead of running them. Commands containing any of the
/// `failing` needles return an error.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
  pub commands: Mutex<Vec<(String, PathBuf)>>,
  pub failing: Vec<String>,
}

impl RecordingExecutor {
  pub fn failing_on(needle: &str) -> Self {
    Self {
      failing: vec![needle.to_string()],
      ..Self::default()
    }
  }

  pub fn commands(&self) -> Vec<String> {
    self.commands.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
  }

  pub fn dirs(&self) -> Vec<PathBuf> {
    self.commands.lock().unwrap().iter().map(|(_, d)| d.clone()).collect()
  }
}

impl Executor for RecordingExecutor {
  async fn exec(&self, cmd: &str, cwd: &Path) -> Result<(), ExecuteError> {
    self.commands.lock().unwrap().push((cmd.to_string(), cwd.to_path_buf()));
    if self.failing.iter().any(|needle| cmd.contains(needle.as_str())) {
      return Err(ExecuteError::CmdFailed {
        cmd: cmd.to_string(),
        code: Some(1),
      });
    }
    Ok(())
  }
}
