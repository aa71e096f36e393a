mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ndm_lib::commands::{CommandTable, NpmPrefix, SelfInstall, ServiceCommands};
use ndm_lib::config::{ConfigOverrides, Configuration, ResolveOptions};
use ndm_lib::execute::ShellExecutor;

use cmd::{
  Control, cmd_control, cmd_generate, cmd_init, cmd_list, cmd_list_scripts, cmd_run_script, cmd_update, cmd_version,
};

/// Deploy service daemons directly from npm packages
#[derive(Parser)]
#[command(name = "ndm")]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(flatten)]
  global: GlobalArgs,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Print nothing; the exit status still reports errors
  #[arg(long, global = true)]
  headless: bool,

  /// Service manager to target (darwin, ubuntu, centos, initd)
  #[arg(long, global = true)]
  platform: Option<String>,

  /// Directory holding package.json and node_modules
  #[arg(long, global = true)]
  base_working_directory: Option<PathBuf>,

  /// Path to the deployment manifest
  #[arg(long, global = true)]
  service_json_path: Option<PathBuf>,

  /// Where generated wrappers are written
  #[arg(long, global = true)]
  daemons_directory: Option<String>,

  /// Where services write their logs
  #[arg(long, global = true)]
  logs_directory: Option<PathBuf>,

  /// Node.js binary used by generated wrappers
  #[arg(long, global = true)]
  node_bin: Option<String>,

  /// User services run as
  #[arg(long, global = true)]
  uid: Option<String>,

  /// Group services run as
  #[arg(long, global = true)]
  gid: Option<String>,

  /// Prefix service manager commands with sudo
  #[arg(long, global = true)]
  sudo: Option<bool>,

  /// Custom wrapper template
  #[arg(long, global = true)]
  template: Option<PathBuf>,

  /// Global npm prefix searched for installed packages
  #[arg(long, global = true)]
  module_prefix: Option<PathBuf>,

  /// Treat the manifest as a single globally installed package
  #[arg(long, global = true)]
  global_package: bool,

  /// Only act on the service with this name
  #[arg(long = "filter", global = true, value_name = "SERVICE")]
  default_filter: Option<String>,

  /// Manage the named package as a self-installing service
  #[arg(long, global = true, value_name = "PACKAGE")]
  self_install: Option<String>,
}

impl GlobalArgs {
  fn overrides(&self) -> ConfigOverrides {
    ConfigOverrides {
      base_working_directory: self.base_working_directory.clone(),
      service_json_path: self.service_json_path.clone(),
      platform: self.platform.clone(),
      daemons_directory: self.daemons_directory.clone(),
      logs_directory: self.logs_directory.clone(),
      node_bin: self.node_bin.clone(),
      uid: self.uid.clone(),
      gid: self.gid.clone(),
      sudo: self.sudo,
      template: self.template.clone(),
      module_prefix: self.module_prefix.clone(),
      global_package: self.global_package.then_some(true),
      filter: self.default_filter.clone(),
      headless: self.headless.then_some(true),
      ..Default::default()
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Create service.json from the dependencies in package.json
  Init,

  /// Add services for new dependencies to service.json
  Update,

  /// Generate OS-specific service wrappers
  Generate {
    /// Only generate this service
    filter: Option<String>,

    /// Extra arguments appended to every wrapper
    #[arg(last = true)]
    extra: Vec<String>,
  },

  /// Start generated services
  Start { filter: Option<String> },

  /// Stop generated services
  Stop { filter: Option<String> },

  /// Restart generated services
  Restart { filter: Option<String> },

  /// Stop services and delete their wrappers
  Remove { filter: Option<String> },

  /// List services
  List { filter: Option<String> },

  /// List the scripts each service provides
  ListScripts { filter: Option<String> },

  /// Run a script with the environment and arguments from service.json
  RunScript {
    script: String,

    /// Extra arguments passed to the script
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
  },

  /// Show version and resolved configuration
  Version,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  init_tracing(cli.global.verbose);
  output::set_headless(cli.global.headless);

  if let Err(e) = run(cli) {
    output::print_error(&format!("{e:#}"));
  }

  output::exit_code()
}

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("ndm=debug,ndm_lib=debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn run(cli: Cli) -> Result<()> {
  let options = ResolveOptions::from_process(cli.global.overrides()).context("Failed to read configuration")?;
  let config = Configuration::resolve(options).context("Failed to resolve configuration")?;
  output::set_headless(config.headless);
  debug!(platform = %config.platform, manifest = %config.service_json_path.display(), "dispatching command");

  let mut commands = ServiceCommands::new(config, ShellExecutor::new());
  match cli.global.self_install {
    Some(package) => dispatch(&mut SelfInstall::new(package, commands, NpmPrefix), cli.command),
    None => dispatch(&mut commands, cli.command),
  }
}

fn dispatch<T: CommandTable>(table: &mut T, command: Commands) -> Result<()> {
  match command {
    Commands::Init => cmd_init(table.config()),
    Commands::Update => cmd_update(table.config()),
    Commands::Generate { filter, extra } => cmd_generate(table, filter.as_deref(), &extra),
    Commands::Start { filter } => cmd_control(table, Control::Start, filter.as_deref()),
    Commands::Stop { filter } => cmd_control(table, Control::Stop, filter.as_deref()),
    Commands::Restart { filter } => cmd_control(table, Control::Restart, filter.as_deref()),
    Commands::Remove { filter } => cmd_control(table, Control::Remove, filter.as_deref()),
    Commands::List { filter } => cmd_list(table, filter.as_deref()),
    Commands::ListScripts { filter } => cmd_list_scripts(table, filter.as_deref()),
    Commands::RunScript { script, args } => cmd_run_script(table, &script, &args),
    Commands::Version => {
      cmd_version(table.config());
      Ok(())
    }
  }
}
