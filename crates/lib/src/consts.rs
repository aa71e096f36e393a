//! Names and tokens shared across the crate.

/// Application name, used for the persisted override file and log lines.
pub const APP_NAME: &str = "ndm";

/// Prefix for environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "NDM_";

/// File name of the deployment manifest.
pub const SERVICE_JSON: &str = "service.json";

/// File name of the package manifest.
pub const PACKAGE_JSON: &str = "package.json";

/// Directory holding a project's installed dependencies.
pub const NODE_MODULES: &str = "node_modules";

/// Per-project override file, resolved against the base working directory.
pub const OVERRIDE_FILE: &str = ".ndmrc.json";

/// Token replaced by the zero-based process index during expansion.
pub const PROCESS_INDEX_TOKEN: &str = "%i";

/// Leading runtime invocation stripped from `scripts.start`.
pub const RUNTIME_TOKEN: &str = "node";
