//! Service entities: one per process instance of a declared service.
//!
//! An entity carries everything needed to render its daemon wrapper and to
//! drive the platform service manager. Entities are produced by [`expand`]
//! from a loaded manifest and a [`ServiceLayout`].

mod control;
mod expand;
mod script;

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::Configuration;
use crate::consts::{NODE_MODULES, PACKAGE_JSON, RUNTIME_TOKEN};
use crate::execute::ExecuteError;
use crate::manifest::{ValueMap, read_object, value_to_string};
use crate::platform::{Platform, PlatformError, paths::fix_path};

pub use expand::expand;

/// Errors from acting on a single service.
#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("{0} does not have start script")]
  NotRunnable(String),

  #[error("{service} has no script named {script}")]
  UnknownScript { service: String, script: String },

  #[error("failed to read template {}: {source}", path.display())]
  Template {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to render wrapper for {service}: {source}")]
  Render {
    service: String,
    #[source]
    source: minijinja::Error,
  },

  #[error("failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to remove {}: {source}", path.display())]
  Remove {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Platform(#[from] PlatformError),

  #[error(transparent)]
  Execute(#[from] ExecuteError),
}

/// Settings shared by every wrapper on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
  pub node_bin: String,
  pub uid: Option<String>,
  pub gid: Option<String>,
  /// Prefix platform commands with `sudo`.
  pub sudo: bool,
  /// Custom wrapper template replacing the platform's built-in one.
  pub template: Option<PathBuf>,
}

/// Where entities live on disk, derived from a [`Configuration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLayout {
  pub base_working_directory: PathBuf,
  /// Name from the root `package.json`, if there is one.
  pub root_package_name: Option<String>,
  pub daemons_directory: PathBuf,
  pub daemon_extension: String,
  pub logs_directory: PathBuf,
  pub platform: Platform,
  /// Serving a single globally installed package. Filters are not applied.
  pub global_package: bool,
  pub runtime: RuntimeSettings,
}

impl ServiceLayout {
  pub fn from_config(config: &Configuration) -> Self {
    let package_path = config.base_working_directory.join(PACKAGE_JSON);
    let root_package_name = match read_object(&package_path) {
      Ok(package) => package.get("name").and_then(Value::as_str).map(str::to_string),
      Err(e) => {
        debug!(error = %e, "no root package name");
        None
      }
    };

    Self {
      base_working_directory: config.base_working_directory.clone(),
      root_package_name,
      daemons_directory: config.daemons_dir(),
      daemon_extension: config.daemon_extension.clone(),
      logs_directory: config.logs_directory.clone(),
      platform: config.platform,
      global_package: config.global_package,
      runtime: RuntimeSettings {
        node_bin: config.node_bin.clone(),
        uid: config.uid.clone(),
        gid: config.gid.clone(),
        sudo: config.needs_sudo(),
        template: config.template.clone(),
      },
    }
  }

  /// Module directory: the base itself when the root package is the module,
  /// otherwise its installed copy under `node_modules`.
  pub fn working_directory(&self, module: &str) -> PathBuf {
    if self.root_package_name.as_deref() == Some(module) {
      self.base_working_directory.clone()
    } else {
      self.base_working_directory.join(NODE_MODULES).join(module)
    }
  }
}

/// One runnable (or script-only) process instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEntity {
  /// Unique name. Instances after the first get a `-<index>` suffix.
  pub name: String,
  pub description: String,
  pub module: String,
  pub process_index: u32,
  pub scripts: ValueMap,
  pub env: ValueMap,
  pub args: ValueMap,
  pub working_directory: PathBuf,
  pub log_file: PathBuf,
  pub script_path: PathBuf,
  pub platform: Platform,
  pub runtime: RuntimeSettings,
}

impl ServiceEntity {
  fn script(&self, name: &str) -> Option<&str> {
    self.scripts.get(name).and_then(Value::as_str)
  }

  /// Has a non-empty start script.
  pub fn runnable(&self) -> bool {
    self.script("start").is_some_and(|s| !s.trim().is_empty())
  }

  pub fn has_script(&self, name: &str) -> bool {
    self.scripts.contains_key(name)
  }

  pub fn script_names(&self) -> impl Iterator<Item = &str> {
    self.scripts.keys().map(String::as_str)
  }

  /// Declared args as a flat `key, value` list. Empty values stay in
  /// place so every key keeps its value position.
  pub fn flat_args(&self) -> Vec<String> {
    let mut flat = Vec::with_capacity(self.args.len() * 2);
    for (key, value) in &self.args {
      flat.push(key.clone());
      flat.push(value_to_string(value));
    }
    flat
  }

  /// The script the wrapper invokes and its full argument list.
  ///
  /// A leading runtime token is dropped from the start command, which is then
  /// split on spaces and `=`. The first token is the script. The remaining
  /// tokens come first in the argument list, followed by the declared args
  /// and then `extra`.
  pub fn start_invocation(&self, extra: &[String]) -> Option<(String, Vec<String>)> {
    let start = strip_runtime(self.script("start")?.trim());
    let mut tokens = start.split([' ', '=']).filter(|t| !t.is_empty());
    let script = tokens.next()?.to_string();

    let mut args: Vec<String> = tokens.map(str::to_string).collect();
    args.extend(self.flat_args());
    args.extend(extra.iter().cloned());
    Some((script, args))
  }

  fn with_sudo(&self, command: String) -> String {
    if self.runtime.sudo { format!("sudo {command}") } else { command }
  }

  pub fn start_command(&self) -> String {
    self.with_sudo(self.platform.start_command(&self.name, &self.script_path))
  }

  pub fn stop_command(&self) -> String {
    self.with_sudo(self.platform.stop_command(&self.name, &self.script_path))
  }

  /// Native restart command.
  ///
  /// # Errors
  ///
  /// [`PlatformError::Unimplemented`] when the platform has no restart.
  pub fn restart_command(&self) -> Result<String, PlatformError> {
    Ok(self.with_sudo(self.platform.restart_command(&self.name, &self.script_path)?))
  }

  /// Shell command line for a named script.
  ///
  /// Env assignments come first, then the script body, then each declared
  /// arg as `key value`, then `trailing`. Paths starting with `./` or `~/` in
  /// arg values and trailing tokens are expanded against `cwd`.
  pub fn script_command(&self, script: &str, trailing: &[String], cwd: &Path) -> Option<String> {
    let body = self.script(script)?;

    let mut cmd = String::new();
    for (key, value) in &self.env {
      cmd.push_str(&format!("{key}=\"{}\" ", value_to_string(value)));
    }
    cmd.push_str(body);

    for (key, value) in &self.args {
      cmd.push(' ');
      cmd.push_str(key);
      let value = value_to_string(value);
      if !value.is_empty() {
        cmd.push(' ');
        cmd.push_str(&fix_path(&value, cwd));
      }
    }
    for token in trailing {
      cmd.push(' ');
      cmd.push_str(&fix_path(token, cwd));
    }

    Some(cmd)
  }
}

fn strip_runtime(command: &str) -> &str {
  match command.strip_prefix(RUNTIME_TOKEN) {
    Some(rest) if rest.starts_with(' ') => rest.trim_start_matches(' '),
    _ => command,
  }
}
