//! Host shell executor.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use super::{ExecuteError, Executor};

/// Runs commands through the system shell.
///
/// Stdout is inherited so services and scripts can talk to the terminal.
/// Stderr is captured and reported as a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl ShellExecutor {
  pub fn new() -> Self {
    Self
  }
}

impl Executor for ShellExecutor {
  async fn exec(&self, cmd: &str, cwd: &Path) -> Result<(), ExecuteError> {
    info!(cmd = %cmd, "executing command");

    let (shell_cmd, shell_flag) = get_shell();
    debug!(shell = %shell_cmd, working_dir = ?cwd, "spawning process");

    let output = Command::new(shell_cmd)
      .arg(shell_flag)
      .arg(cmd)
      .current_dir(cwd)
      .stdin(Stdio::inherit())
      .stdout(Stdio::inherit())
      .stderr(Stdio::piped())
      .output()
      .await
      .map_err(|source| ExecuteError::Spawn {
        cmd: cmd.to_string(),
        source,
      })?;

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
      if !stderr.is_empty() {
        debug!(stderr = %stderr, "command stderr");
      }
      return Err(ExecuteError::CmdFailed {
        cmd: cmd.to_string(),
        code: output.status.code(),
      });
    }

    if !stderr.is_empty() {
      return Err(ExecuteError::CmdError {
        cmd: cmd.to_string(),
        message: stderr,
      });
    }

    Ok(())
  }
}

/// Run a command and return its trimmed stdout.
pub async fn capture(cmd: &str, cwd: &Path) -> Result<String, ExecuteError> {
  let (shell_cmd, shell_flag) = get_shell();

  let output = Command::new(shell_cmd)
    .arg(shell_flag)
    .arg(cmd)
    .current_dir(cwd)
    .stdin(Stdio::null())
    .output()
    .await
    .map_err(|source| ExecuteError::Spawn {
      cmd: cmd.to_string(),
      source,
    })?;

  if !output.status.success() {
    return Err(ExecuteError::CmdFailed {
      cmd: cmd.to_string(),
      code: output.status.code(),
    });
  }

  Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Shell binary and the flag that passes it a command string.
fn get_shell() -> (&'static str, &'static str) {
  #[cfg(unix)]
  {
    ("/bin/sh", "-c")
  }

  #[cfg(windows)]
  {
    ("cmd.exe", "/C")
  }
}
