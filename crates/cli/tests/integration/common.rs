//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated project directory.
///
/// Each test gets its own temporary directory acting as the project root,
/// with wrappers written to `daemons/` inside it.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create an empty test environment.
  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// A project with `package.json` and the `ndm-test` dependency installed.
  pub fn project() -> Self {
    let env = Self::empty();
    env.write_file("package.json", &fixture_content("package.json"));
    env.write_file(
      "node_modules/ndm-test/package.json",
      &fixture_content("ndm-test.package.json"),
    );
    env
  }

  /// A project that also has the multi-process `service.json`.
  pub fn with_manifest() -> Self {
    let env = Self::project();
    env.write_file("service.json", &fixture_content("service.json"));
    env
  }

  /// Canonical project root.
  pub fn base(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.base().join(relative_path)
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.path(relative_path))
      .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative_path, e))
  }

  /// Get a pre-configured Command for the ndm binary.
  ///
  /// Runs inside the project root and sets, through `NDM_*` variables:
  /// - `NDM_PLATFORM`: ubuntu, so wrappers are upstart jobs
  /// - `NDM_DAEMONS_DIRECTORY`: `<root>/daemons`
  /// - `NDM_SUDO`: false
  pub fn ndm_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("ndm");
    cmd.current_dir(self.base());
    cmd.env("HOME", self.base());
    cmd.env("NDM_PLATFORM", "ubuntu");
    cmd.env("NDM_DAEMONS_DIRECTORY", self.path("daemons"));
    cmd.env("NDM_SUDO", "false");
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
