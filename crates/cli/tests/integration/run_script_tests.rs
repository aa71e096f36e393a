//! `ndm run-script` integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[cfg(unix)]
#[test]
fn script_runs_with_service_env_and_args() {
  let env = TestEnv::with_manifest();

  env
    .ndm_cmd()
    .args(["--filter", "ndm-test", "run-script", "hello", "extra", "./rel"])
    .assert()
    .success();

  let output = env.read_file("node_modules/ndm-test/hello.txt");
  assert_eq!(
    output.trim(),
    format!("5000 --name web-0 extra {}", env.path("rel").display())
  );
}

#[cfg(unix)]
#[test]
fn root_package_runs_in_base_directory() {
  let env = TestEnv::empty();
  env.write_file("package.json", r#"{"name": "app"}"#);
  env.write_file(
    "service.json",
    r#"{"app": {"scripts": {"hello": "sh -c 'echo $GREETING > hello.txt'"}, "env": {"GREETING": "hi"}}}"#,
  );

  env.ndm_cmd().args(["run-script", "hello"]).assert().success();

  assert_eq!(env.read_file("hello.txt").trim(), "hi");
}

#[test]
fn unknown_script_lists_available_scripts() {
  let env = TestEnv::with_manifest();

  env
    .ndm_cmd()
    .args(["run-script", "missing"])
    .assert()
    .success()
    .stderr(predicate::str::contains("no service has a script named 'missing'"))
    .stdout(predicate::str::contains("hello"))
    .stdout(predicate::str::contains("lint"));
}

#[cfg(unix)]
#[test]
fn failing_script_sets_exit_status() {
  let env = TestEnv::empty();
  env.write_file("package.json", r#"{"name": "app"}"#);
  env.write_file("service.json", r#"{"app": {"scripts": {"broken": "exit 3"}}}"#);

  env
    .ndm_cmd()
    .args(["run-script", "broken"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("app"));
}
