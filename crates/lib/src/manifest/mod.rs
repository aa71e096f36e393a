//! The deployment manifest (`service.json`).
//!
//! A manifest is a JSON object whose top-level keys are either the reserved
//! `env`/`args` defaults or service names. Every other key maps to a
//! [`ServiceDefinition`]. A plain `package.json` can stand in for a manifest;
//! it is synthesized into a single-service manifest on load.
//!
//! Key order is preserved throughout so that writing a manifest back after
//! `update` keeps the author's layout.

mod normalize;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, trace};

use crate::consts::PACKAGE_JSON;

pub use normalize::{args_to_map, flatten_map, flatten_question, merge_layers, value_to_string};

/// An ordered JSON object.
pub type ValueMap = Map<String, Value>;

/// Errors raised while reading or writing a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("could not load {}, run `ndm init` to create a service.json from your package.json.", path.display())]
  NotFound {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid json in {}, check file for errors.", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("{} must contain a JSON object", path.display())]
  NotAnObject { path: PathBuf },

  #[error("failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Arguments as authored: either a map of flag to value or a flat list of
/// alternating keys and values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgsSpec {
  Map(ValueMap),
  List(Vec<Value>),
}

impl ArgsSpec {
  /// The argument set as an ordered map. Lists are paired up with
  /// [`args_to_map`].
  pub fn to_map(&self) -> ValueMap {
    match self {
      ArgsSpec::Map(map) => map.clone(),
      ArgsSpec::List(list) => args_to_map(list),
    }
  }
}

impl Default for ArgsSpec {
  fn default() -> Self {
    ArgsSpec::Map(ValueMap::new())
  }
}

/// One service as declared in a manifest.
///
/// Fields this tool does not understand are kept in `extra` and written back
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,

  /// Installed module providing the service. Defaults to the service name.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub module: Option<String>,

  /// Number of process instances to run.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub processes: Option<u32>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub scripts: Option<ValueMap>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub env: Option<ValueMap>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub args: Option<ArgsSpec>,

  #[serde(flatten)]
  pub extra: ValueMap,
}

/// A parsed deployment manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
  /// Defaults applied to every service.
  pub env: Option<ValueMap>,
  pub args: Option<ArgsSpec>,
  /// Services in declaration order.
  pub services: Vec<(String, ServiceDefinition)>,
}

impl Manifest {
  /// Interpret a JSON object as a deployment manifest.
  pub fn from_object(object: ValueMap) -> Result<Self, serde_json::Error> {
    let mut manifest = Manifest::default();

    for (key, value) in object {
      match key.as_str() {
        "env" => manifest.env = Some(serde_json::from_value(value)?),
        "args" => manifest.args = Some(serde_json::from_value(value)?),
        _ => {
          let definition: ServiceDefinition = serde_json::from_value(value)?;
          manifest.services.push((key, definition));
        }
      }
    }

    Ok(manifest)
  }

  /// Synthesize a single-service manifest from a package manifest.
  ///
  /// The service is named after the package. Its scripts are the package's
  /// `bin` entries overlaid with its `scripts`, and its env/args come from
  /// the package's `service` stanza.
  pub fn from_package(package: &ValueMap) -> Self {
    let Some((name, definition)) = service_from_package(package) else {
      return Manifest::default();
    };

    Manifest {
      env: None,
      args: None,
      services: vec![(name, definition)],
    }
  }

  pub fn service(&self, name: &str) -> Option<&ServiceDefinition> {
    self.services.iter().find(|(n, _)| n == name).map(|(_, d)| d)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.service(name).is_some()
  }

  /// Append a service unless one with the same name is already declared.
  /// Returns whether it was added.
  pub fn insert(&mut self, name: String, definition: ServiceDefinition) -> bool {
    if self.contains(&name) {
      return false;
    }
    self.services.push((name, definition));
    true
  }

  pub fn to_object(&self) -> ValueMap {
    let mut object = ValueMap::new();
    if let Some(env) = &self.env {
      object.insert("env".to_string(), Value::Object(env.clone()));
    }
    if let Some(args) = &self.args {
      object.insert("args".to_string(), serde_json::to_value(args).unwrap_or(Value::Null));
    }
    for (name, definition) in &self.services {
      let value = serde_json::to_value(definition).unwrap_or_else(|_| Value::Object(ValueMap::new()));
      object.insert(name.clone(), value);
    }
    object
  }
}

/// Package name without its `@scope/` prefix.
pub fn unscoped_name(module: &str) -> &str {
  match module.rsplit_once('/') {
    Some((_, short)) if module.starts_with('@') => short,
    _ => module,
  }
}

/// Build the service entry describing a package, keyed by the package's
/// unscoped name. Scoped packages (`@scope/name`) get an explicit `module`.
pub fn service_from_package(package: &ValueMap) -> Option<(String, ServiceDefinition)> {
  let module = package.get("name")?.as_str()?;
  let name = unscoped_name(module).to_string();

  let mut definition = definition_from_package(&name, package);
  if name != module {
    definition.module = Some(module.to_string());
  }

  Some((name, definition))
}

/// Service definition from a package's metadata. `name` keys a string `bin`.
pub fn definition_from_package(name: &str, package: &ValueMap) -> ServiceDefinition {
  let mut scripts = ValueMap::new();
  match package.get("bin") {
    Some(Value::String(path)) => {
      scripts.insert(name.to_string(), Value::String(path.clone()));
    }
    Some(Value::Object(bins)) => scripts.extend(bins.clone()),
    _ => {}
  }
  if let Some(Value::Object(declared)) = package.get("scripts") {
    scripts.extend(declared.clone());
  }

  let stanza = package.get("service").and_then(Value::as_object);
  let env = stanza.and_then(|s| s.get("env")).and_then(Value::as_object).cloned();
  let args = stanza
    .and_then(|s| s.get("args"))
    .and_then(|a| serde_json::from_value::<ArgsSpec>(a.clone()).ok());

  ServiceDefinition {
    description: package.get("description").and_then(Value::as_str).map(str::to_string),
    module: None,
    processes: None,
    scripts: Some(scripts),
    env: Some(env.unwrap_or_default()),
    args: Some(args.unwrap_or_default()),
    extra: ValueMap::new(),
  }
}

fn is_package_manifest(path: &Path) -> bool {
  path.file_name().is_some_and(|name| name == PACKAGE_JSON)
}

/// Read a JSON object from disk.
pub fn read_object(path: &Path) -> Result<ValueMap, ManifestError> {
  let text = fs::read_to_string(path).map_err(|source| ManifestError::NotFound {
    path: path.to_path_buf(),
    source,
  })?;

  let value: Value = serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
    path: path.to_path_buf(),
    source,
  })?;

  match value {
    Value::Object(object) => Ok(object),
    _ => Err(ManifestError::NotAnObject {
      path: path.to_path_buf(),
    }),
  }
}

/// Load the manifest at `path`. A `package.json` is synthesized into a
/// single-service manifest.
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
  debug!(path = %path.display(), "loading manifest");
  let object = read_object(path)?;

  if is_package_manifest(path) {
    trace!("synthesizing manifest from package");
    return Ok(Manifest::from_package(&object));
  }

  Manifest::from_object(object).map_err(|source| ManifestError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

/// Write a manifest as pretty-printed JSON with two-space indentation.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
  let write_err = |source| ManifestError::Write {
    path: path.to_path_buf(),
    source,
  };

  let mut text = serde_json::to_string_pretty(&Value::Object(manifest.to_object()))
    .map_err(|e| write_err(std::io::Error::other(e)))?;
  text.push('\n');

  fs::write(path, text).map_err(write_err)?;
  debug!(path = %path.display(), services = manifest.services.len(), "wrote manifest");
  Ok(())
}
