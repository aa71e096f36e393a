//! End-to-end library workflows: seed a manifest, then drive the command
//! table against it with a recording executor.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndm_lib::commands::{Action, CommandTable, Outcome, ServiceCommands};
use ndm_lib::config::Configuration;
use ndm_lib::execute::{ExecuteError, Executor};
use ndm_lib::init::{InitOptions, init};
use ndm_lib::platform::Platform;
use tempfile::TempDir;

#[derive(Default)]
struct Recorder {
  commands: Mutex<Vec<(String, PathBuf)>>,
}

impl Executor for Recorder {
  async fn exec(&self, cmd: &str, cwd: &Path) -> Result<(), ExecuteError> {
    self.commands.lock().unwrap().push((cmd.to_string(), cwd.to_path_buf()));
    Ok(())
  }
}

impl Recorder {
  fn commands(&self) -> Vec<String> {
    self.commands.lock().unwrap().iter().map(|(cmd, _)| cmd.clone()).collect()
  }
}

fn write(root: &Path, rel: &str, content: &str) {
  let path = root.join(rel);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

/// A project depending on one service package and one tool package.
fn project() -> TempDir {
  let temp = TempDir::new().unwrap();
  let root = temp.path();
  write(
    root,
    "package.json",
    r#"{"name": "site", "dependencies": {"api": "^1.0.0", "@acme/tools": "^2.0.0"}}"#,
  );
  write(
    root,
    "node_modules/api/package.json",
    r#"{
      "name": "api",
      "description": "json api",
      "scripts": {"start": "node ./server.js"},
      "service": {"env": {"PORT": "8000"}, "args": {"--workers": "2"}}
    }"#,
  );
  write(
    root,
    "node_modules/@acme/tools/package.json",
    r#"{"name": "@acme/tools", "scripts": {"migrate": "node ./migrate.js"}}"#,
  );
  temp
}

fn config(root: &Path) -> Configuration {
  let mut config = Configuration::defaults(root, Platform::Ubuntu);
  config.daemons_directory = root.join("daemons").display().to_string();
  config.sudo = false;
  config
}

#[tokio::test]
async fn init_then_generate_and_start() {
  let temp = project();
  let root = temp.path();

  let result = init(&InitOptions {
    base_working_directory: root.to_path_buf(),
    service_json_path: root.join("service.json"),
  })
  .unwrap();
  assert_eq!(result.added, vec!["api".to_string(), "tools".to_string()]);

  let mut table = ServiceCommands::new(config(root), Recorder::default()).with_invocation_dir(root.to_path_buf());

  let report = table.generate(None, &[]).await.unwrap();
  let outcomes: Vec<_> = report.outcomes.iter().map(|o| (o.service.as_str(), &o.outcome)).collect();
  assert_eq!(outcomes[0], ("api", &Outcome::Done));
  assert!(matches!(outcomes[1], ("tools", Outcome::Skipped(_))));

  let wrapper = fs::read_to_string(root.join("daemons/api.conf")).unwrap();
  assert!(wrapper.contains("env PORT=\"8000\""));
  assert!(wrapper.contains(&format!("chdir {}", root.join("node_modules/api").display())));
  assert!(wrapper.contains("./server.js \"--workers\" \"2\""));

  let report = table.start(None).await.unwrap();
  assert!(!report.has_failures());
  assert_eq!(table.executor().commands(), vec!["service api start".to_string()]);
}

#[tokio::test]
async fn scripts_run_in_module_directory() {
  let temp = project();
  let root = temp.path();
  write(
    root,
    "service.json",
    r#"{"tools": {"module": "@acme/tools", "scripts": {"migrate": "node ./migrate.js"}, "env": {"DB": "main"}}}"#,
  );

  let mut table = ServiceCommands::new(config(root), Recorder::default()).with_invocation_dir(root.to_path_buf());
  let report = table.run_script("migrate", None, &["--to=./schema".to_string()]).await.unwrap();

  assert_eq!(report.outcomes.len(), 1);
  assert_eq!(report.outcomes[0].action, Action::RunScript);

  let recorded = table.executor().commands.lock().unwrap().clone();
  assert_eq!(
    recorded[0],
    (
      format!("DB=\"main\" node ./migrate.js --to={}", root.join("schema").display()),
      root.join("node_modules/@acme/tools"),
    )
  );
}
