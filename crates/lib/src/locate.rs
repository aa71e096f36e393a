//! Finding the manifest that governs a service filter.
//!
//! With no filter the configured manifest is used as-is. With a filter, the
//! configured manifest wins if it exists; otherwise a set of search roots is
//! probed for a directory named after the filter. A hit relocates the
//! configuration onto that directory and switches it into single global
//! package mode.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Configuration;
use crate::consts::{NODE_MODULES, PACKAGE_JSON, SERVICE_JSON};

/// The manifest chosen for an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
  pub path: PathBuf,
  /// The search moved the configuration to another directory.
  pub relocated: bool,
}

/// Directories probed for `<root>/<filter>`, in order.
pub fn search_roots(config: &Configuration) -> Vec<PathBuf> {
  let base = &config.base_working_directory;
  let mut roots = Vec::with_capacity(5);

  if let Some(prefix) = &config.module_prefix {
    roots.push(prefix.join("lib").join(NODE_MODULES));
    roots.push(prefix.join(NODE_MODULES));
  }
  roots.push(base.join(NODE_MODULES));
  roots.push(base.clone());
  if let Some(parent) = base.parent() {
    roots.push(parent.to_path_buf());
  }

  roots
}

/// Manifest inside a package directory: its deployment manifest if present,
/// else its package manifest.
fn manifest_in(dir: &Path) -> PathBuf {
  let deployment = dir.join(SERVICE_JSON);
  if deployment.is_file() {
    deployment
  } else {
    dir.join(PACKAGE_JSON)
  }
}

/// Resolve the manifest path for `filter`, updating `config` when the
/// search relocates.
///
/// When nothing matches, the configured path is returned unchanged even if
/// it does not exist; loading it then reports a missing manifest.
pub fn locate(config: &mut Configuration, filter: Option<&str>) -> Located {
  let configured = Located {
    path: config.service_json_path.clone(),
    relocated: false,
  };

  let Some(filter) = filter else {
    return configured;
  };

  if config.service_json_path.is_file() {
    debug!(path = %config.service_json_path.display(), "using configured manifest");
    return configured;
  }

  for root in search_roots(config) {
    let candidate = root.join(filter);
    debug!(candidate = %candidate.display(), "probing for package");
    if !candidate.is_dir() {
      continue;
    }

    let dir = dunce::canonicalize(&candidate).unwrap_or(candidate);
    let path = manifest_in(&dir);
    info!(package = %filter, path = %path.display(), "found package");

    config.base_working_directory = dir;
    config.service_json_path = path.clone();
    config.global_package = true;
    config.use_os_logs_directory();

    return Located { path, relocated: true };
  }

  debug!(filter = %filter, "no package found, using configured manifest");
  configured
}
