//! Command table for a package that installs itself as a service.

use std::path::PathBuf;

use tracing::{debug, warn};

use super::{BatchReport, CommandError, CommandTable};
use crate::config::{ConfigOverrides, Configuration};
use crate::execute::{ExecuteError, capture};
use crate::service::ServiceEntity;

/// Source of the global module prefix.
#[allow(async_fn_in_trait)]
pub trait PrefixSource {
  async fn module_prefix(&self) -> Result<Option<PathBuf>, ExecuteError>;
}

/// Reads the prefix from `npm config get prefix`.
#[derive(Debug, Clone, Default)]
pub struct NpmPrefix;

impl PrefixSource for NpmPrefix {
  async fn module_prefix(&self) -> Result<Option<PathBuf>, ExecuteError> {
    let cwd = std::env::temp_dir();
    let prefix = capture("npm config get prefix", &cwd).await?;
    Ok((!prefix.is_empty()).then(|| PathBuf::from(prefix)))
  }
}

/// Wraps a command table so every operation targets one package.
///
/// The filter and app name are pinned to the package. Before operations
/// that touch installed files the module prefix is loaded from `P`, unless
/// one is already configured.
pub struct SelfInstall<C, P> {
  inner: C,
  prefix: P,
  package: String,
}

impl<C: CommandTable, P: PrefixSource> SelfInstall<C, P> {
  pub fn new(package: impl Into<String>, mut inner: C, prefix: P) -> Self {
    let package = package.into();
    inner.config_mut().merge(&ConfigOverrides {
      filter: Some(package.clone()),
      app_name: Some(package.clone()),
      ..Default::default()
    });
    Self { inner, prefix, package }
  }

  pub fn into_inner(self) -> C {
    self.inner
  }

  async fn ensure_module_prefix(&mut self) {
    if self.inner.config().module_prefix.is_some() {
      return;
    }

    match self.prefix.module_prefix().await {
      Ok(Some(prefix)) => {
        debug!(prefix = %prefix.display(), "loaded module prefix");
        self.inner.config_mut().merge(&ConfigOverrides {
          module_prefix: Some(prefix),
          ..Default::default()
        });
      }
      Ok(None) => debug!("no module prefix available"),
      Err(e) => warn!(error = %e, "could not load module prefix"),
    }
  }
}

impl<C: CommandTable, P: PrefixSource> CommandTable for SelfInstall<C, P> {
  fn config(&self) -> &Configuration {
    self.inner.config()
  }

  fn config_mut(&mut self) -> &mut Configuration {
    self.inner.config_mut()
  }

  fn services(&mut self, filter: Option<&str>) -> Result<Vec<ServiceEntity>, CommandError> {
    self.inner.services(filter)
  }

  async fn generate(&mut self, _filter: Option<&str>, extra: &[String]) -> Result<BatchReport, CommandError> {
    self.ensure_module_prefix().await;
    self.inner.generate(Some(&self.package), extra).await
  }

  async fn start(&mut self, _filter: Option<&str>) -> Result<BatchReport, CommandError> {
    self.ensure_module_prefix().await;
    self.inner.start(Some(&self.package)).await
  }

  async fn stop(&mut self, _filter: Option<&str>) -> Result<BatchReport, CommandError> {
    self.ensure_module_prefix().await;
    self.inner.stop(Some(&self.package)).await
  }

  async fn restart(&mut self, _filter: Option<&str>) -> Result<BatchReport, CommandError> {
    self.ensure_module_prefix().await;
    self.inner.restart(Some(&self.package)).await
  }

  async fn remove(&mut self, _filter: Option<&str>) -> Result<BatchReport, CommandError> {
    self.ensure_module_prefix().await;
    self.inner.remove(Some(&self.package)).await
  }

  async fn list(&mut self, filter: Option<&str>) -> Result<Vec<ServiceEntity>, CommandError> {
    self.inner.list(filter).await
  }

  async fn list_scripts(&mut self, _filter: Option<&str>) -> Result<Vec<ServiceEntity>, CommandError> {
    self.ensure_module_prefix().await;
    self.inner.list_scripts(Some(&self.package)).await
  }

  async fn run_script(
    &mut self,
    script: &str,
    _filter: Option<&str>,
    trailing: &[String],
  ) -> Result<BatchReport, CommandError> {
    self.ensure_module_prefix().await;
    self.inner.run_script(script, Some(&self.package), trailing).await
  }
}
