use std::path::{Path, PathBuf};

/// Returns the invoking user's home directory
#[cfg(windows)]
pub fn home_dir() -> PathBuf {
  std::env::var("USERPROFILE").map(PathBuf::from).unwrap_or_default()
}

/// Returns the invoking user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> PathBuf {
  std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/"))
}

/// Expand a leading `~/` to the home directory.
///
/// Only the leading position is expanded; `~` elsewhere is left alone.
pub fn expand_home(path: &str) -> PathBuf {
  match path.strip_prefix("~/") {
    Some(rest) => home_dir().join(rest),
    None if path == "~" => home_dir(),
    None => PathBuf::from(path),
  }
}

/// Resolve `path` against `base` after home expansion.
///
/// Absolute paths are returned as-is; relative ones are joined onto `base`.
/// No filesystem access happens here, so the result may not exist.
pub fn resolve(base: &Path, path: &str) -> PathBuf {
  let expanded = expand_home(path);
  if expanded.is_absolute() {
    expanded
  } else {
    base.join(expanded)
  }
}

/// Rewrite path-like command-line tokens to absolute paths.
///
/// Handles a leading `./` or `~/`, and the same prefixes after an `=` so
/// that `--config=./app.json` becomes `--config=/abs/app.json`.
pub fn fix_path(token: &str, cwd: &Path) -> String {
  if let Some((key, value)) = token.split_once('=') {
    if let Some(fixed) = fix_leading(value, cwd) {
      return format!("{key}={fixed}");
    }
    return token.to_string();
  }
  fix_leading(token, cwd).unwrap_or_else(|| token.to_string())
}

fn fix_leading(value: &str, cwd: &Path) -> Option<String> {
  if let Some(rest) = value.strip_prefix("~/") {
    Some(home_dir().join(rest).to_string_lossy().into_owned())
  } else {
    value
      .strip_prefix("./")
      .map(|rest| cwd.join(rest).to_string_lossy().into_owned())
  }
}

#[cfg(test)]
#[cfg(not(windows))]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn expand_home_replaces_leading_tilde() {
    temp_env::with_var("HOME", Some("/home/user"), || {
      assert_eq!(
        expand_home("~/Library/LaunchAgents/"),
        PathBuf::from("/home/user/Library/LaunchAgents/")
      );
      assert_eq!(expand_home("/etc/init"), PathBuf::from("/etc/init"));
      assert_eq!(expand_home("a/~/b"), PathBuf::from("a/~/b"));
    });
  }

  #[test]
  #[serial]
  fn resolve_joins_relative_paths_onto_base() {
    temp_env::with_var("HOME", Some("/home/user"), || {
      let base = Path::new("/srv/app");
      assert_eq!(resolve(base, "logs"), PathBuf::from("/srv/app/logs"));
      assert_eq!(resolve(base, "/var/log"), PathBuf::from("/var/log"));
      assert_eq!(resolve(base, "~/logs"), PathBuf::from("/home/user/logs"));
    });
  }

  #[test]
  #[serial]
  fn fix_path_expands_dot_and_tilde_prefixes() {
    temp_env::with_var("HOME", Some("/home/user"), || {
      let cwd = Path::new("/srv/app");
      assert_eq!(fix_path("./foo", cwd), "/srv/app/foo");
      assert_eq!(fix_path("bar=./foo", cwd), "bar=/srv/app/foo");
      assert_eq!(fix_path("~/foo", cwd), "/home/user/foo");
      assert_eq!(fix_path("bar=~/foo", cwd), "bar=/home/user/foo");
      assert_eq!(fix_path("--timeout=8000", cwd), "--timeout=8000");
      assert_eq!(fix_path("plain", cwd), "plain");
    });
  }
}
