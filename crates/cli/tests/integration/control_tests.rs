//! Service manager operations: start, stop, restart and remove.
//!
//! Darwin commands go through `launchctl`, which is absent on the Linux
//! hosts these tests target, so every platform command fails predictably.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn list_shows_every_entity() {
  let env = TestEnv::with_manifest();

  env
    .ndm_cmd()
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("ndm-test:\tndm test service"))
    .stdout(predicate::str::contains("ndm-test-1:"))
    .stdout(predicate::str::contains("ndm-cli:"));
}

#[test]
fn list_scripts_with_filter() {
  let env = TestEnv::with_manifest();

  env
    .ndm_cmd()
    .args(["list-scripts", "ndm-cli"])
    .assert()
    .success()
    .stdout(predicate::str::contains("lint"))
    .stdout(predicate::str::contains("ndm-test-1").not());
}

#[test]
fn skipped_services_do_not_fail() {
  let env = TestEnv::with_manifest();

  env
    .ndm_cmd()
    .args(["stop", "ndm-cli"])
    .assert()
    .success()
    .stderr(predicate::str::contains("ndm-cli"));
}

#[cfg(target_os = "linux")]
#[test]
fn failed_platform_command_sets_exit_status() {
  let env = TestEnv::with_manifest();

  env
    .ndm_cmd()
    .env("NDM_PLATFORM", "darwin")
    .args(["start", "ndm-test"])
    .assert()
    .failure()
    .stdout(predicate::str::contains("starting services:"))
    .stderr(predicate::str::contains("launchctl load"));
}

#[cfg(target_os = "linux")]
#[test]
fn restart_without_native_support_stops_then_starts() {
  let env = TestEnv::with_manifest();

  env
    .ndm_cmd()
    .env("NDM_PLATFORM", "darwin")
    .args(["restart", "ndm-test"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("launchctl unload"))
    .stderr(predicate::str::contains("launchctl load"));
}

#[cfg(target_os = "linux")]
#[test]
fn remove_deletes_wrappers_even_when_stop_fails() {
  let env = TestEnv::with_manifest();
  let cmd = |env: &TestEnv| {
    let mut cmd = env.ndm_cmd();
    cmd.env("NDM_PLATFORM", "darwin");
    cmd
  };

  cmd(&env).arg("generate").assert().success();
  assert!(env.path("daemons/ndm-test.plist").exists());

  cmd(&env).arg("remove").assert().failure();

  assert!(!env.path("daemons/ndm-test.plist").exists());
  assert!(!env.path("daemons/ndm-test-1.plist").exists());
}

#[test]
fn headless_prints_nothing() {
  let env = TestEnv::with_manifest();

  env
    .ndm_cmd()
    .args(["--headless", "list"])
    .assert()
    .success()
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::is_empty());
}
