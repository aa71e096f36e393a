//! `ndm generate` integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn generates_one_wrapper_per_process() {
  let env = TestEnv::with_manifest();

  env
    .ndm_cmd()
    .arg("generate")
    .assert()
    .success()
    .stdout(predicate::str::contains("ndm start"))
    .stderr(predicate::str::contains("ndm-cli"));

  let first = env.read_file("daemons/ndm-test.conf");
  let second = env.read_file("daemons/ndm-test-1.conf");

  assert!(first.contains("env PORT=\"5000\""));
  assert!(first.contains("env NODE_ENV=\"production\""));
  assert!(second.contains("env PORT=\"5001\""));
  assert!(second.contains("./test.js \"--color\" \"false\" \"--name\" \"web-1\""));
  assert!(!env.path("daemons/ndm-cli.conf").exists());
}

#[test]
fn wrappers_run_from_module_directory() {
  let env = TestEnv::with_manifest();
  env.ndm_cmd().arg("generate").assert().success();

  let wrapper = env.read_file("daemons/ndm-test.conf");
  let module_dir = env.path("node_modules/ndm-test");
  assert!(wrapper.contains(&format!("chdir {}", module_dir.display())));
  assert!(wrapper.contains(&format!(">> {} 2>&1", env.path("logs/ndm-test.log").display())));
}

#[test]
fn filter_selects_one_process() {
  let env = TestEnv::with_manifest();

  env.ndm_cmd().args(["generate", "ndm-test-1"]).assert().success();

  assert!(env.path("daemons/ndm-test-1.conf").exists());
  assert!(!env.path("daemons/ndm-test.conf").exists());
}

#[test]
fn extra_arguments_are_appended() {
  let env = TestEnv::with_manifest();

  env
    .ndm_cmd()
    .args(["generate", "ndm-test", "--", "--inspect", "--max-old-space-size=256"])
    .assert()
    .success();

  let wrapper = env.read_file("daemons/ndm-test.conf");
  assert!(wrapper.contains("\"web-0\" \"--inspect\" \"--max-old-space-size=256\""));
}

#[test]
fn regeneration_is_byte_identical() {
  let env = TestEnv::with_manifest();

  env.ndm_cmd().arg("generate").assert().success();
  let before = env.read_file("daemons/ndm-test.conf");
  env.ndm_cmd().arg("generate").assert().success();

  assert_eq!(before, env.read_file("daemons/ndm-test.conf"));
}

#[test]
fn darwin_writes_plists() {
  let env = TestEnv::with_manifest();

  env
    .ndm_cmd()
    .env("NDM_PLATFORM", "darwin")
    .arg("generate")
    .assert()
    .success()
    .stdout(predicate::str::contains("launchctl"));

  let plist = env.read_file("daemons/ndm-test.plist");
  assert!(plist.contains("<key>Label</key>"));
  assert!(plist.contains("<string>ndm-test</string>"));
}

#[test]
fn flags_override_environment() {
  let env = TestEnv::with_manifest();

  env
    .ndm_cmd()
    .args(["--platform", "centos", "--node-bin", "/opt/node/bin/node", "generate", "ndm-test"])
    .assert()
    .success();

  let wrapper = env.read_file("daemons/ndm-test.conf");
  assert!(wrapper.contains("exec /opt/node/bin/node ./test.js"));
  assert!(wrapper.contains("start on started network"));
}

#[test]
fn custom_template() {
  let env = TestEnv::with_manifest();
  env.write_file("custom.j2", "{{ name }} {{ env.PORT }} {{ flatArgs|join(' ') }}\n");

  env
    .ndm_cmd()
    .args(["--template", "custom.j2", "generate", "ndm-test"])
    .assert()
    .success();

  assert_eq!(
    env.read_file("daemons/ndm-test.conf"),
    "ndm-test 5000 --color false --name web-0\n"
  );
}

#[test]
fn override_file_is_honoured() {
  let env = TestEnv::with_manifest();
  env.write_file(".ndmrc.json", r#"{"nodeBin": "/srv/node"}"#);

  env.ndm_cmd().args(["generate", "ndm-test"]).assert().success();

  assert!(env.read_file("daemons/ndm-test.conf").contains("exec /srv/node ./test.js"));
}

#[test]
fn missing_manifest_suggests_init() {
  let env = TestEnv::project();

  env
    .ndm_cmd()
    .arg("generate")
    .assert()
    .failure()
    .stderr(predicate::str::contains("ndm init"));
}
