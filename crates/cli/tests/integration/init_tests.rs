//! `ndm init` and `ndm update` integration tests.

use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

fn manifest(env: &TestEnv) -> Value {
  serde_json::from_str(&env.read_file("service.json")).unwrap()
}

#[test]
fn init_seeds_manifest_from_dependencies() {
  let env = TestEnv::project();

  env
    .ndm_cmd()
    .arg("init")
    .assert()
    .success()
    .stdout(predicate::str::contains("ndm generate"));

  let manifest = manifest(&env);
  let service = &manifest["ndm-test"];
  assert_eq!(service["description"], "ndm test service");
  assert_eq!(service["scripts"]["start"], "node ./test.js");
  assert_eq!(service["scripts"]["ndm-test"], "./bin/ndm-test.js");
  assert_eq!(service["env"]["PORT"]["default"], "5000");
  assert_eq!(service["args"]["--name"], "web");
  assert!(env.path("logs").is_dir());
}

#[test]
fn init_refuses_to_overwrite() {
  let env = TestEnv::with_manifest();

  env
    .ndm_cmd()
    .arg("init")
    .assert()
    .failure()
    .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_without_dependencies_fails() {
  let env = TestEnv::empty();
  env.write_file("package.json", r#"{"name": "empty"}"#);

  env
    .ndm_cmd()
    .arg("init")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no services found"));
}

#[test]
fn init_without_package_json_fails() {
  let env = TestEnv::empty();

  env
    .ndm_cmd()
    .arg("init")
    .assert()
    .failure()
    .stderr(predicate::str::contains("run npm install"));
}

#[test]
fn update_adds_new_dependencies_only() {
  let env = TestEnv::project();
  env.write_file("service.json", r#"{"ndm-test": {"description": "edited by hand"}}"#);
  env.write_file(
    "package.json",
    r#"{"name": "ndm-app", "dependencies": {"ndm-test": "^1.0.0", "@acme/worker": "^1.0.0"}}"#,
  );
  env.write_file(
    "node_modules/@acme/worker/package.json",
    r#"{"name": "@acme/worker", "scripts": {"start": "worker.js"}}"#,
  );

  env.ndm_cmd().arg("update").assert().success();

  let manifest = manifest(&env);
  assert_eq!(manifest["ndm-test"]["description"], "edited by hand");
  assert_eq!(manifest["worker"]["module"], "@acme/worker");
}
