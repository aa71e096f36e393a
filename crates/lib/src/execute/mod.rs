//! Shell command execution.
//!
//! Service control and script runs go through the [`Executor`] trait so the
//! command layer can be driven by a recording executor in tests.

mod shell;

use std::path::Path;

use thiserror::Error;

pub use shell::{ShellExecutor, capture};

/// Errors from running a shell command.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The shell could not be spawned.
  #[error("failed to spawn `{cmd}`: {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  /// Command exited with a non-zero status.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  /// Command wrote to stderr.
  #[error("{message}")]
  CmdError { cmd: String, message: String },
}

/// Runs a command line in a working directory.
#[allow(async_fn_in_trait)]
pub trait Executor {
  async fn exec(&self, cmd: &str, cwd: &Path) -> Result<(), ExecuteError>;
}

impl<E: Executor> Executor for &E {
  async fn exec(&self, cmd: &str, cwd: &Path) -> Result<(), ExecuteError> {
    (**self).exec(cmd, cwd).await
  }
}
