mod control;
mod generate;
mod info;
mod init;
mod list;
mod run_script;

pub use control::{Control, cmd_control};
pub use generate::cmd_generate;
pub use info::cmd_version;
pub use init::{cmd_init, cmd_update};
pub use list::{cmd_list, cmd_list_scripts};
pub use run_script::cmd_run_script;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

/// Runtime for the async command table.
pub(crate) fn runtime() -> Result<Runtime> {
  Runtime::new().context("Failed to create async runtime")
}
