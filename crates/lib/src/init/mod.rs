//! Seed a deployment manifest from a project's dependencies.
//!
//! This module provides the core logic for `ndm init` and `ndm update`. Both
//! walk the `dependencies` of the project's `package.json` and describe each
//! installed dependency as a service, using its own `package.json`:
//! description, `bin` and `scripts`, and the `env`/`args` of its `service`
//! stanza.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{NODE_MODULES, PACKAGE_JSON};
use crate::manifest::{
  Manifest, ManifestError, ValueMap, definition_from_package, load_manifest, read_object, unscoped_name,
  write_manifest,
};

/// Errors that can occur while seeding a manifest.
#[derive(Debug, Error)]
pub enum InitError {
  #[error("{} did not exist.\nadd your dependencies to package.json, and run npm install.", path.display())]
  PackageJsonMissing { path: PathBuf },

  #[error("no services found, add dependencies to package.json.")]
  MissingDependencies,

  #[error("{} already exists.", path.display())]
  ManifestExists { path: PathBuf },

  #[error("{} does not exist. run ndm init.", path.display())]
  ManifestMissing { path: PathBuf },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error(transparent)]
  Manifest(#[from] ManifestError),
}

/// Options for seeding a manifest.
#[derive(Debug, Clone)]
pub struct InitOptions {
  /// Project directory holding `package.json` and `node_modules`
  pub base_working_directory: PathBuf,
  /// Deployment manifest to create or update
  pub service_json_path: PathBuf,
}

/// Result of a successful `init` or `update`.
#[derive(Debug)]
pub struct InitResult {
  pub service_json: PathBuf,
  /// Log directory created by `init`
  pub logs_dir: Option<PathBuf>,
  /// Services added, in dependency order
  pub added: Vec<String>,
}

/// Create a new deployment manifest and the project log directory.
///
/// # Errors
///
/// Returns an error if:
/// - the manifest already exists
/// - `package.json` of the project or of a dependency is missing
/// - the project declares no dependencies
pub fn init(options: &InitOptions) -> Result<InitResult, InitError> {
  if options.service_json_path.exists() {
    return Err(InitError::ManifestExists {
      path: options.service_json_path.clone(),
    });
  }

  let mut manifest = Manifest::default();
  let added = seed(&options.base_working_directory, &mut manifest)?;
  write_manifest(&options.service_json_path, &manifest)?;
  info!(path = %options.service_json_path.display(), "generated manifest");

  let logs_dir = options.base_working_directory.join("logs");
  fs::create_dir_all(&logs_dir).map_err(|e| InitError::CreateDir {
    path: logs_dir.clone(),
    source: e,
  })?;

  Ok(InitResult {
    service_json: options.service_json_path.clone(),
    logs_dir: Some(logs_dir),
    added,
  })
}

/// Add services for dependencies not yet in an existing manifest.
///
/// Entries already present are left exactly as they are.
pub fn update(options: &InitOptions) -> Result<InitResult, InitError> {
  if !options.service_json_path.exists() {
    return Err(InitError::ManifestMissing {
      path: options.service_json_path.clone(),
    });
  }

  let mut manifest = load_manifest(&options.service_json_path)?;
  let added = seed(&options.base_working_directory, &mut manifest)?;
  write_manifest(&options.service_json_path, &manifest)?;
  info!(path = %options.service_json_path.display(), added = added.len(), "updated manifest");

  Ok(InitResult {
    service_json: options.service_json_path.clone(),
    logs_dir: None,
    added,
  })
}

fn read_package(dir: &Path) -> Result<ValueMap, InitError> {
  let path = dir.join(PACKAGE_JSON);
  if !path.exists() {
    return Err(InitError::PackageJsonMissing { path });
  }
  Ok(read_object(&path)?)
}

fn seed(base: &Path, manifest: &mut Manifest) -> Result<Vec<String>, InitError> {
  let package = read_package(base)?;
  let dependencies = match package.get("dependencies") {
    Some(Value::Object(deps)) => deps,
    _ => return Err(InitError::MissingDependencies),
  };

  let mut added = Vec::new();
  for module in dependencies.keys() {
    let name = unscoped_name(module);
    if manifest.contains(name) {
      debug!(service = %name, "already in manifest");
      continue;
    }

    let module_package = read_package(&base.join(NODE_MODULES).join(module))?;
    let mut definition = definition_from_package(name, &module_package);
    if name != module {
      definition.module = Some(module.clone());
    }

    manifest.insert(name.to_string(), definition);
    added.push(name.to_string());
  }

  Ok(added)
}
