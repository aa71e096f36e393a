//! Daemon wrapper generation and removal.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::{debug, info};

use super::{ServiceEntity, ServiceError};
use crate::manifest::value_to_string;
use crate::template;

impl ServiceEntity {
  /// Render and write this entity's wrapper.
  ///
  /// `extra` args are appended after the declared ones. The file is written
  /// atomically with mode `0755`, so regenerating with the same inputs
  /// leaves identical content.
  ///
  /// # Errors
  ///
  /// [`ServiceError::NotRunnable`] if there is no start script; otherwise
  /// template, render and write failures.
  pub fn generate_script(&self, extra: &[String]) -> Result<PathBuf, ServiceError> {
    let (start_script, flat_args) = self
      .start_invocation(extra)
      .ok_or_else(|| ServiceError::NotRunnable(self.name.clone()))?;

    let source = match &self.runtime.template {
      Some(path) => fs::read_to_string(path).map_err(|source| ServiceError::Template {
        path: path.clone(),
        source,
      })?,
      None => self.platform.template().to_string(),
    };

    let rendered = template::render(&source, self.template_context(&start_script, &flat_args)).map_err(|source| {
      ServiceError::Render {
        service: self.name.clone(),
        source,
      }
    })?;

    write_atomic(&self.script_path, rendered.as_bytes()).map_err(|source| ServiceError::Write {
      path: self.script_path.clone(),
      source,
    })?;

    info!(service = %self.name, path = %self.script_path.display(), "generated wrapper");
    Ok(self.script_path.clone())
  }

  /// Delete this entity's wrapper.
  ///
  /// Returns `false` when nothing was removed: the entity is not runnable or
  /// no wrapper exists.
  pub fn remove_script(&self) -> Result<bool, ServiceError> {
    if !self.runnable() {
      return Ok(false);
    }

    match fs::remove_file(&self.script_path) {
      Ok(()) => {
        info!(service = %self.name, path = %self.script_path.display(), "removed wrapper");
        Ok(true)
      }
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        debug!(path = %self.script_path.display(), "no wrapper to remove");
        Ok(false)
      }
      Err(source) => Err(ServiceError::Remove {
        path: self.script_path.clone(),
        source,
      }),
    }
  }

  fn template_context(&self, start_script: &str, flat_args: &[String]) -> Value {
    let env: serde_json::Map<String, Value> = self
      .env
      .iter()
      .map(|(k, v)| (k.clone(), Value::String(value_to_string(v))))
      .collect();

    json!({
      "name": self.name,
      "description": self.description,
      "module": self.module,
      "env": env,
      "args": self.args,
      "flatArgs": flat_args,
      "startScript": start_script,
      "nodeBin": self.runtime.node_bin,
      "workingDirectory": self.working_directory,
      "logFile": self.log_file,
      "scriptPath": self.script_path,
      "uid": self.runtime.uid,
      "gid": self.runtime.gid,
      "sudo": self.runtime.sudo,
      "platform": self.platform,
    })
  }
}

/// Write via a temp file in the destination directory, then rename.
fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
  let dir = path.parent().unwrap_or_else(|| Path::new("."));
  fs::create_dir_all(dir)?;

  let mut temp = tempfile::Builder::new().prefix(".ndm-").tempfile_in(dir)?;
  temp.write_all(contents)?;
  temp.as_file().sync_all()?;

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o755))?;
  }

  temp.persist(path).map_err(|e| e.error)?;
  Ok(())
}
