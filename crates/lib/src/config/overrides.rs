//! Partial configuration layers.
//!
//! Every configuration source (environment, override file, CLI flags, API
//! options) is expressed as a [`ConfigOverrides`] value. Layers are combined
//! with [`ConfigOverrides::layer`], later layers winning key by key.

use std::path::PathBuf;

use heck::ToLowerCamelCase;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ConfigError;
use crate::consts::ENV_PREFIX;

/// A set of optional configuration values, keyed in camelCase on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverrides {
  pub base_working_directory: Option<PathBuf>,
  pub service_json_path: Option<PathBuf>,
  pub platform: Option<String>,
  pub daemons_directory: Option<String>,
  pub daemon_extension: Option<String>,
  pub logs_directory: Option<PathBuf>,
  pub os_logs_directory: Option<PathBuf>,
  pub node_bin: Option<String>,
  pub uid: Option<String>,
  pub gid: Option<String>,
  pub sudo: Option<bool>,
  pub template: Option<PathBuf>,
  pub module_prefix: Option<PathBuf>,
  pub global_package: Option<bool>,
  pub filter: Option<String>,
  pub app_name: Option<String>,
  pub headless: Option<bool>,
  pub release_info_file: Option<PathBuf>,
}

macro_rules! layer_fields {
  ($base:ident, $top:ident, $($field:ident),+ $(,)?) => {
    ConfigOverrides {
      $($field: $top.$field.or($base.$field),)+
    }
  };
}

impl ConfigOverrides {
  /// Collect overrides from `NDM_*` environment variables.
  ///
  /// `NDM_BASE_WORKING_DIRECTORY` becomes `baseWorkingDirectory`. Variables
  /// that name no configuration key are ignored.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::InvalidValue`] if a boolean key holds something
  /// other than a recognised boolean.
  pub fn from_env<I, K, V>(vars: I) -> Result<Self, ConfigError>
  where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
  {
    let mut overrides = Self::default();
    for (key, value) in vars {
      let Some(stripped) = key.as_ref().strip_prefix(ENV_PREFIX) else {
        continue;
      };
      let camel = stripped.to_lowercase().to_lower_camel_case();
      if !overrides.set(&camel, value.as_ref())? {
        debug!(variable = %key.as_ref(), key = %camel, "ignoring unknown configuration variable");
      }
    }
    Ok(overrides)
  }

  /// Set a single key from its string form.
  ///
  /// Returns `Ok(false)` when `key` is not a configuration key.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::InvalidValue`] for unparseable booleans.
  pub fn set(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
    match key {
      "baseWorkingDirectory" => self.base_working_directory = Some(value.into()),
      "serviceJsonPath" => self.service_json_path = Some(value.into()),
      "platform" => self.platform = Some(value.to_string()),
      "daemonsDirectory" => self.daemons_directory = Some(value.to_string()),
      "daemonExtension" => self.daemon_extension = Some(value.to_string()),
      "logsDirectory" => self.logs_directory = Some(value.into()),
      "osLogsDirectory" => self.os_logs_directory = Some(value.into()),
      "nodeBin" => self.node_bin = Some(value.to_string()),
      "uid" => self.uid = Some(value.to_string()),
      "gid" => self.gid = Some(value.to_string()),
      "sudo" => self.sudo = Some(parse_bool(key, value)?),
      "template" => self.template = Some(value.into()),
      "modulePrefix" => self.module_prefix = Some(value.into()),
      "globalPackage" => self.global_package = Some(parse_bool(key, value)?),
      "filter" => self.filter = Some(value.to_string()),
      "appName" => self.app_name = Some(value.to_string()),
      "headless" => self.headless = Some(parse_bool(key, value)?),
      "releaseInfoFile" => self.release_info_file = Some(value.into()),
      _ => return Ok(false),
    }
    Ok(true)
  }

  /// Put `top` over `self`: every key set in `top` wins.
  pub fn layer(self, top: ConfigOverrides) -> ConfigOverrides {
    let base = self;
    layer_fields!(
      base,
      top,
      base_working_directory,
      service_json_path,
      platform,
      daemons_directory,
      daemon_extension,
      logs_directory,
      os_logs_directory,
      node_bin,
      uid,
      gid,
      sudo,
      template,
      module_prefix,
      global_package,
      filter,
      app_name,
      headless,
      release_info_file,
    )
  }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.trim().to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" | "on" => Ok(true),
    "false" | "0" | "no" | "off" | "" => Ok(false),
    _ => Err(ConfigError::InvalidValue {
      key: key.to_string(),
      value: value.to_string(),
    }),
  }
}
