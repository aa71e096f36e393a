//! The command table driven by the CLI.
//!
//! [`CommandTable`] is the set of operations the command-line layer calls.
//! [`ServiceCommands`] implements it over a [`Configuration`] and an
//! [`Executor`]. [`SelfInstall`] wraps any table for a package that manages
//! its own service.

mod report;
mod self_install;

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::Configuration;
use crate::execute::Executor;
use crate::locate::locate;
use crate::manifest::{ManifestError, load_manifest};
use crate::service::{ServiceEntity, ServiceError, ServiceLayout, expand};

pub use report::{Action, BatchReport, EntityOutcome, Outcome};
pub use self_install::{NpmPrefix, PrefixSource, SelfInstall};

/// Errors that abort a whole command.
#[derive(Debug, Error)]
pub enum CommandError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),
}

/// Operations exposed to the command-line layer.
///
/// `filter` selects one entity by name; `None` means every service, or the
/// single package when serving a global install.
#[allow(async_fn_in_trait)]
pub trait CommandTable {
  fn config(&self) -> &Configuration;

  fn config_mut(&mut self) -> &mut Configuration;

  /// Locate and expand the manifest for `filter`.
  fn services(&mut self, filter: Option<&str>) -> Result<Vec<ServiceEntity>, CommandError>;

  /// Write wrappers, appending `extra` to each entity's arguments.
  async fn generate(&mut self, filter: Option<&str>, extra: &[String]) -> Result<BatchReport, CommandError>;

  async fn start(&mut self, filter: Option<&str>) -> Result<BatchReport, CommandError>;

  async fn stop(&mut self, filter: Option<&str>) -> Result<BatchReport, CommandError>;

  async fn restart(&mut self, filter: Option<&str>) -> Result<BatchReport, CommandError>;

  /// Stop every selected service, then delete their wrappers.
  async fn remove(&mut self, filter: Option<&str>) -> Result<BatchReport, CommandError>;

  async fn list(&mut self, filter: Option<&str>) -> Result<Vec<ServiceEntity>, CommandError>;

  async fn list_scripts(&mut self, filter: Option<&str>) -> Result<Vec<ServiceEntity>, CommandError>;

  /// Run `script` for every selected entity declaring it. An empty report
  /// means no entity had the script.
  async fn run_script(
    &mut self,
    script: &str,
    filter: Option<&str>,
    trailing: &[String],
  ) -> Result<BatchReport, CommandError>;
}

/// Commands over a resolved configuration.
pub struct ServiceCommands<E> {
  config: Configuration,
  executor: E,
  invocation_dir: PathBuf,
}

impl<E: Executor> ServiceCommands<E> {
  pub fn new(config: Configuration, executor: E) -> Self {
    let invocation_dir = std::env::current_dir().unwrap_or_else(|_| config.base_working_directory.clone());
    Self {
      config,
      executor,
      invocation_dir,
    }
  }

  /// Directory relative script arguments resolve against.
  pub fn with_invocation_dir(mut self, dir: PathBuf) -> Self {
    self.invocation_dir = dir;
    self
  }

  pub fn executor(&self) -> &E {
    &self.executor
  }

  fn filter_or_default(&self, filter: Option<&str>) -> Option<String> {
    filter.or(self.config.filter.as_deref()).map(str::to_string)
  }

  async fn control(&self, entities: &[ServiceEntity], control: Control, report: &mut BatchReport) {
    for entity in entities {
      let result = match control {
        Control::Start => entity.start(&self.executor, &self.invocation_dir).await,
        Control::Stop => entity.stop(&self.executor, &self.invocation_dir).await,
        Control::Restart => entity.restart(&self.executor, &self.invocation_dir).await,
      };

      match result {
        Err(ServiceError::Platform(e)) if control == Control::Restart => {
          info!(service = %entity.name, reason = %e, "restarting with stop then start");
          let stop = entity.stop(&self.executor, &self.invocation_dir).await;
          report.record(entity, Action::Stop, stop);
          let start = entity.start(&self.executor, &self.invocation_dir).await;
          report.record(entity, Action::Start, start);
        }
        result => report.record(entity, control.action(), result),
      }
    }
  }

  async fn control_all(&mut self, filter: Option<&str>, control: Control) -> Result<BatchReport, CommandError> {
    let entities = self.services(filter)?;
    let mut report = BatchReport::default();
    self.control(&entities, control, &mut report).await;
    Ok(report)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
  Start,
  Stop,
  Restart,
}

impl Control {
  fn action(self) -> Action {
    match self {
      Control::Start => Action::Start,
      Control::Stop => Action::Stop,
      Control::Restart => Action::Restart,
    }
  }
}

impl<E: Executor> CommandTable for ServiceCommands<E> {
  fn config(&self) -> &Configuration {
    &self.config
  }

  fn config_mut(&mut self) -> &mut Configuration {
    &mut self.config
  }

  fn services(&mut self, filter: Option<&str>) -> Result<Vec<ServiceEntity>, CommandError> {
    let filter = self.filter_or_default(filter);
    let located = locate(&mut self.config, filter.as_deref());
    let manifest = load_manifest(&located.path)?;
    let layout = ServiceLayout::from_config(&self.config);
    Ok(expand(&manifest, filter.as_deref(), &layout))
  }

  async fn generate(&mut self, filter: Option<&str>, extra: &[String]) -> Result<BatchReport, CommandError> {
    let entities = self.services(filter)?;
    let mut report = BatchReport::default();
    for entity in &entities {
      let result = entity.generate_script(extra).map(|_| ());
      report.record(entity, Action::Generate, result);
    }
    Ok(report)
  }

  async fn start(&mut self, filter: Option<&str>) -> Result<BatchReport, CommandError> {
    self.control_all(filter, Control::Start).await
  }

  async fn stop(&mut self, filter: Option<&str>) -> Result<BatchReport, CommandError> {
    self.control_all(filter, Control::Stop).await
  }

  async fn restart(&mut self, filter: Option<&str>) -> Result<BatchReport, CommandError> {
    self.control_all(filter, Control::Restart).await
  }

  async fn remove(&mut self, filter: Option<&str>) -> Result<BatchReport, CommandError> {
    let entities = self.services(filter)?;
    let mut report = BatchReport::default();
    self.control(&entities, Control::Stop, &mut report).await;

    for entity in &entities {
      if !entity.runnable() {
        report.record(entity, Action::Remove, Err(ServiceError::NotRunnable(entity.name.clone())));
        continue;
      }
      match entity.remove_script() {
        Ok(true) => report.push(entity, Action::Remove, Outcome::Done),
        Ok(false) => report.push(entity, Action::Remove, Outcome::Skipped("no wrapper present".to_string())),
        Err(e) => report.record(entity, Action::Remove, Err(e)),
      }
    }
    Ok(report)
  }

  async fn list(&mut self, filter: Option<&str>) -> Result<Vec<ServiceEntity>, CommandError> {
    self.services(filter)
  }

  async fn list_scripts(&mut self, filter: Option<&str>) -> Result<Vec<ServiceEntity>, CommandError> {
    self.services(filter)
  }

  async fn run_script(
    &mut self,
    script: &str,
    filter: Option<&str>,
    trailing: &[String],
  ) -> Result<BatchReport, CommandError> {
    let entities = self.services(filter)?;
    let mut report = BatchReport::default();

    for entity in entities.iter().filter(|e| e.has_script(script)) {
      let result = entity
        .run_script(&self.executor, script, trailing, &self.invocation_dir)
        .await;
      report.record(entity, Action::RunScript, result);
    }

    if report.is_empty() {
      warn!(script = %script, "no service declares script");
    }
    Ok(report)
  }
}
