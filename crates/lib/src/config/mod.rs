//! Configuration resolution.
//!
//! A [`Configuration`] is assembled from five sources, lowest precedence
//! first:
//!
//! 1. hard defaults derived from the base working directory
//! 2. defaults of the selected [`Platform`]
//! 3. `NDM_*` environment variables
//! 4. the project override file (`.ndmrc.json` in the base directory)
//! 5. explicit overrides from the caller (CLI flags or API options)
//!
//! The result is always fully populated. It is an ordinary value: callers
//! own it and pass it down, and [`Configuration::merge`] layers further
//! overrides onto an existing instance.

mod overrides;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::{OVERRIDE_FILE, SERVICE_JSON};
use crate::platform::os::Os;
use crate::platform::paths::{expand_home, resolve};
use crate::platform::{self, Platform, ReleaseProbe};

pub use overrides::ConfigOverrides;

/// Errors that can occur while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid value for {key}: {value}")]
  InvalidValue { key: String, value: String },

  #[error("failed to read {}: {source}", path.display())]
  ReadOverrideFile { path: PathBuf, source: io::Error },

  #[error("invalid json in {}, check file for errors: {source}", path.display())]
  ParseOverrideFile { path: PathBuf, source: serde_json::Error },

  #[error("failed to determine current directory: {0}")]
  CurrentDir(#[source] io::Error),
}

/// Inputs to [`Configuration::resolve`].
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
  /// Directory relative paths are resolved against
  pub cwd: PathBuf,
  /// Environment snapshot, only `NDM_*` entries are consulted
  pub env: Vec<(String, String)>,
  /// Explicit caller overrides, highest precedence
  pub overrides: ConfigOverrides,
}

impl ResolveOptions {
  /// Options for the running process: its working directory and environment.
  ///
  /// # Errors
  ///
  /// Returns an error if the current directory cannot be determined.
  pub fn from_process(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
    Ok(Self {
      cwd: std::env::current_dir().map_err(ConfigError::CurrentDir)?,
      env: std::env::vars().collect(),
      overrides,
    })
  }
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
  /// Project root, holding `package.json` and `node_modules`
  pub base_working_directory: PathBuf,
  /// Manifest to load (`service.json` or a `package.json`)
  pub service_json_path: PathBuf,
  pub platform: Platform,
  /// Where daemon wrappers are written, may start with `~/`
  pub daemons_directory: String,
  pub daemon_extension: String,
  pub logs_directory: PathBuf,
  /// Conventional log location of the platform
  pub os_logs_directory: PathBuf,
  pub node_bin: String,
  pub uid: Option<String>,
  pub gid: Option<String>,
  pub sudo: bool,
  /// Replaces the platform's built-in template when set
  pub template: Option<PathBuf>,
  /// Global install prefix, e.g. `/usr/local`
  pub module_prefix: Option<PathBuf>,
  /// The manifest describes one globally managed service
  pub global_package: bool,
  pub filter: Option<String>,
  pub app_name: Option<String>,
  pub headless: bool,
  pub release_info_file: Option<PathBuf>,
  logs_directory_pinned: bool,
}

impl Configuration {
  /// Hard defaults plus platform defaults, with no other sources applied.
  ///
  /// Useful wherever an isolated configuration is needed, tests included.
  pub fn defaults(base_working_directory: &Path, platform: Platform) -> Self {
    let os = platform.defaults();
    Self {
      base_working_directory: base_working_directory.to_path_buf(),
      service_json_path: base_working_directory.join(SERVICE_JSON),
      platform,
      daemons_directory: os.daemons_directory.to_string(),
      daemon_extension: os.daemon_extension.to_string(),
      logs_directory: base_working_directory.join("logs"),
      os_logs_directory: expand_home(os.os_logs_directory),
      node_bin: os.node_bin.to_string(),
      uid: os.uid.map(str::to_string),
      gid: None,
      sudo: os.sudo,
      template: None,
      module_prefix: None,
      global_package: false,
      filter: None,
      app_name: None,
      headless: false,
      release_info_file: None,
      logs_directory_pinned: false,
    }
  }

  /// Build a fresh configuration from every source.
  ///
  /// # Errors
  ///
  /// Returns an error if an environment value is invalid or the override
  /// file exists but cannot be read or parsed.
  pub fn resolve(options: ResolveOptions) -> Result<Self, ConfigError> {
    let env = ConfigOverrides::from_env(options.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

    // The override file lives in the base directory, which itself may be
    // overridden by the environment or the caller.
    let base = options
      .overrides
      .base_working_directory
      .clone()
      .or_else(|| env.base_working_directory.clone())
      .map(|p| absolutize(&options.cwd, &p))
      .unwrap_or_else(|| options.cwd.clone());

    let file = load_override_file(&base.join(OVERRIDE_FILE))?;
    let combined = env.layer(file).layer(options.overrides);

    let platform = match (&combined.platform, &combined.release_info_file) {
      (Some(id), _) => Platform::from_id(id),
      (None, Some(release_info)) => {
        let probe = ReleaseProbe {
          redhat_release: absolutize(&options.cwd, release_info),
          ..ReleaseProbe::default()
        };
        Platform::detect_with(&probe, Os::current())
      }
      (None, None) => Platform::detect(),
    };

    let mut config = Self::defaults(&base, platform);
    config.apply(&combined, &options.cwd);
    debug!(platform = %config.platform, base = %config.base_working_directory.display(), "resolved configuration");
    Ok(config)
  }

  /// Layer more overrides onto this configuration.
  ///
  /// Keys absent from `overrides` keep their current value. Relative paths
  /// resolve against the base working directory.
  pub fn merge(&mut self, overrides: &ConfigOverrides) {
    let cwd = self.base_working_directory.clone();
    self.apply(overrides, &cwd);
  }

  fn apply(&mut self, o: &ConfigOverrides, cwd: &Path) {
    if let Some(base) = &o.base_working_directory {
      self.base_working_directory = absolutize(cwd, base);
    }
    if let Some(path) = &o.service_json_path {
      self.service_json_path = absolutize(cwd, path);
    }
    if let Some(id) = &o.platform {
      self.platform = Platform::from_id(id);
    }
    if let Some(dir) = &o.daemons_directory {
      self.daemons_directory = dir.clone();
    }
    if let Some(ext) = &o.daemon_extension {
      self.daemon_extension = ext.clone();
    }
    if let Some(dir) = &o.logs_directory {
      self.logs_directory = absolutize(cwd, dir);
      self.logs_directory_pinned = true;
    }
    if let Some(dir) = &o.os_logs_directory {
      self.os_logs_directory = absolutize(cwd, dir);
    }
    if let Some(bin) = &o.node_bin {
      self.node_bin = bin.clone();
    }
    if let Some(uid) = &o.uid {
      self.uid = non_empty(uid);
    }
    if let Some(gid) = &o.gid {
      self.gid = non_empty(gid);
    }
    if let Some(sudo) = o.sudo {
      self.sudo = sudo;
    }
    if let Some(template) = &o.template {
      self.template = Some(absolutize(cwd, template));
    }
    if let Some(prefix) = &o.module_prefix {
      self.module_prefix = Some(absolutize(cwd, prefix));
    }
    if let Some(global) = o.global_package {
      self.global_package = global;
    }
    if let Some(filter) = &o.filter {
      self.filter = non_empty(filter);
    }
    if let Some(app_name) = &o.app_name {
      self.app_name = non_empty(app_name);
    }
    if let Some(headless) = o.headless {
      self.headless = headless;
    }
    if let Some(release_info) = &o.release_info_file {
      self.release_info_file = Some(absolutize(cwd, release_info));
    }
  }

  /// Switch logging to the platform's conventional directory, unless the
  /// caller pinned a custom one.
  pub fn use_os_logs_directory(&mut self) {
    if !self.logs_directory_pinned {
      self.logs_directory = self.os_logs_directory.clone();
    }
  }

  /// Daemon directory with `~/` expanded.
  pub fn daemons_dir(&self) -> PathBuf {
    resolve(&self.base_working_directory, &self.daemons_directory)
  }

  /// Should platform commands be prefixed with `sudo`?
  pub fn needs_sudo(&self) -> bool {
    self.sudo && !platform::is_elevated()
  }
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
  resolve(cwd, &path.to_string_lossy())
}

fn non_empty(value: &str) -> Option<String> {
  if value.is_empty() { None } else { Some(value.to_string()) }
}

fn load_override_file(path: &Path) -> Result<ConfigOverrides, ConfigError> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ConfigOverrides::default()),
    Err(e) => {
      return Err(ConfigError::ReadOverrideFile {
        path: path.to_path_buf(),
        source: e,
      });
    }
  };

  debug!(path = %path.display(), "loading override file");
  serde_json::from_str(&content).map_err(|e| ConfigError::ParseOverrideFile {
    path: path.to_path_buf(),
    source: e,
  })
}
