//! Driving the platform service manager and running named scripts.

use std::path::Path;

use tracing::info;

use super::{ServiceEntity, ServiceError};
use crate::execute::Executor;

impl ServiceEntity {
  fn ensure_runnable(&self) -> Result<(), ServiceError> {
    if self.runnable() {
      Ok(())
    } else {
      Err(ServiceError::NotRunnable(self.name.clone()))
    }
  }

  pub async fn start<E: Executor>(&self, executor: &E, cwd: &Path) -> Result<(), ServiceError> {
    self.ensure_runnable()?;
    info!(service = %self.name, "starting");
    executor.exec(&self.start_command(), cwd).await?;
    Ok(())
  }

  pub async fn stop<E: Executor>(&self, executor: &E, cwd: &Path) -> Result<(), ServiceError> {
    self.ensure_runnable()?;
    info!(service = %self.name, "stopping");
    executor.exec(&self.stop_command(), cwd).await?;
    Ok(())
  }

  /// Restart through the platform's native command.
  ///
  /// # Errors
  ///
  /// [`ServiceError::Platform`] when there is no native restart; callers
  /// fall back to stop followed by start.
  pub async fn restart<E: Executor>(&self, executor: &E, cwd: &Path) -> Result<(), ServiceError> {
    self.ensure_runnable()?;
    let command = self.restart_command()?;
    info!(service = %self.name, "restarting");
    executor.exec(&command, cwd).await?;
    Ok(())
  }

  /// Run a named script in the module's working directory.
  ///
  /// Relative paths in args and `trailing` expand against `invocation_dir`.
  pub async fn run_script<E: Executor>(
    &self,
    executor: &E,
    script: &str,
    trailing: &[String],
    invocation_dir: &Path,
  ) -> Result<(), ServiceError> {
    let command = self
      .script_command(script, trailing, invocation_dir)
      .ok_or_else(|| ServiceError::UnknownScript {
        service: self.name.clone(),
        script: script.to_string(),
      })?;

    info!(service = %self.name, script = %script, "running script");
    executor.exec(&command, &self.working_directory).await?;
    Ok(())
  }
}
