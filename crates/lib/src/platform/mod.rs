//! Platform capability table.
//!
//! Each supported service manager is one variant of [`Platform`]. A variant
//! knows where its daemon wrappers live, which template renders them, how to
//! recognise the host it runs on, and which commands start and stop a
//! service. The set is closed, so dispatch is a plain `match`.

pub mod os;
pub mod paths;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use os::Os;

/// Errors raised by platform operations.
#[derive(Debug, Error)]
pub enum PlatformError {
  #[error("{operation} is not implemented for platform '{platform}'")]
  Unimplemented { platform: Platform, operation: &'static str },
}

/// A supported service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  /// macOS launchd user agents
  Darwin,
  /// Upstart 1.x as shipped by Ubuntu
  Ubuntu,
  /// Upstart 0.6 as shipped by CentOS 6
  Centos,
  /// Legacy SysV init.d scripts
  #[serde(rename = "initd")]
  InitD,
}

/// Configuration defaults contributed by a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDefaults {
  pub daemons_directory: &'static str,
  pub daemon_extension: &'static str,
  pub os_logs_directory: &'static str,
  pub node_bin: &'static str,
  pub sudo: bool,
  pub uid: Option<&'static str>,
}

/// Files inspected when detecting the host distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseProbe {
  /// Contains `CentOS` on CentOS hosts
  pub redhat_release: PathBuf,
  /// Contains `Ubuntu` on Ubuntu hosts
  pub lsb_release: PathBuf,
}

impl Default for ReleaseProbe {
  fn default() -> Self {
    Self {
      redhat_release: PathBuf::from("/etc/redhat-release"),
      lsb_release: PathBuf::from("/etc/lsb-release"),
    }
  }
}

const LAUNCHD_TEMPLATE: &str = include_str!("../../templates/launchd.plist.j2");
const UPSTART_UBUNTU_TEMPLATE: &str = include_str!("../../templates/upstart-ubuntu.conf.j2");
const UPSTART_CENTOS_TEMPLATE: &str = include_str!("../../templates/upstart-centos.conf.j2");
const INIT_D_TEMPLATE: &str = include_str!("../../templates/init-d.sh.j2");

impl Platform {
  /// Every variant, in detection order.
  pub const ALL: [Platform; 4] = [Platform::Centos, Platform::Ubuntu, Platform::Darwin, Platform::InitD];

  /// The variant used when nothing else matches.
  pub const FALLBACK: Platform = Platform::Ubuntu;

  /// Returns the identifier stored in configuration
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Darwin => "darwin",
      Self::Ubuntu => "ubuntu",
      Self::Centos => "centos",
      Self::InitD => "initd",
    }
  }

  /// Parse a platform identifier, accepting common aliases.
  ///
  /// Returns `None` for identifiers that name no known service manager.
  pub fn parse(id: &str) -> Option<Self> {
    match id.trim().to_ascii_lowercase().as_str() {
      "darwin" | "macos" | "osx" => Some(Self::Darwin),
      "ubuntu" | "linux" | "upstart" => Some(Self::Ubuntu),
      "centos" | "redhat" => Some(Self::Centos),
      "initd" | "init.d" | "init-d" | "sysv" => Some(Self::InitD),
      _ => None,
    }
  }

  /// Like [`Platform::parse`], but falls back to the most common variant.
  pub fn from_id(id: &str) -> Self {
    Self::parse(id).unwrap_or_else(|| {
      warn!(platform = %id, fallback = %Self::FALLBACK, "unknown platform, using fallback");
      Self::FALLBACK
    })
  }

  /// Map a host OS family onto a platform.
  pub fn from_host(os: Os) -> Self {
    match os {
      Os::MacOs => Self::Darwin,
      _ => Self::FALLBACK,
    }
  }

  /// Configuration overrides this platform applies over the hard defaults.
  pub fn defaults(&self) -> PlatformDefaults {
    match self {
      Self::Darwin => PlatformDefaults {
        daemons_directory: "~/Library/LaunchAgents/",
        daemon_extension: ".plist",
        os_logs_directory: "~/Library/Logs",
        node_bin: "/usr/local/bin/node",
        sudo: false,
        uid: None,
      },
      Self::Ubuntu => PlatformDefaults {
        daemons_directory: "/etc/init",
        daemon_extension: ".conf",
        os_logs_directory: "/var/log",
        node_bin: "/usr/bin/node",
        sudo: false,
        uid: None,
      },
      Self::Centos => PlatformDefaults {
        daemons_directory: "/etc/init",
        daemon_extension: ".conf",
        os_logs_directory: "/var/log",
        node_bin: "/usr/local/bin/node",
        sudo: false,
        uid: None,
      },
      Self::InitD => PlatformDefaults {
        daemons_directory: "/etc/init.d",
        daemon_extension: "",
        os_logs_directory: "/var/log",
        node_bin: "/usr/bin/node",
        sudo: true,
        uid: Some("root"),
      },
    }
  }

  /// Built-in template source for the daemon wrapper.
  pub fn template(&self) -> &'static str {
    match self {
      Self::Darwin => LAUNCHD_TEMPLATE,
      Self::Ubuntu => UPSTART_UBUNTU_TEMPLATE,
      Self::Centos => UPSTART_CENTOS_TEMPLATE,
      Self::InitD => INIT_D_TEMPLATE,
    }
  }

  /// Does the host look like this platform?
  ///
  /// Unreadable release files count as "no".
  pub fn matches(&self, probe: &ReleaseProbe) -> bool {
    match self {
      Self::Centos => file_contains(&probe.redhat_release, "CentOS"),
      Self::Ubuntu => file_contains(&probe.lsb_release, "Ubuntu"),
      Self::Darwin | Self::InitD => false,
    }
  }

  /// Detect the platform from release files, falling back to the host OS.
  pub fn detect_with(probe: &ReleaseProbe, host: Os) -> Self {
    Self::ALL
      .into_iter()
      .find(|platform| platform.matches(probe))
      .unwrap_or_else(|| Self::from_host(host))
  }

  /// Detect the platform of the running host.
  ///
  /// The result is computed once per process.
  pub fn detect() -> Self {
    static DETECTED: OnceLock<Platform> = OnceLock::new();
    *DETECTED.get_or_init(|| {
      let platform = Self::detect_with(&ReleaseProbe::default(), Os::current());
      debug!(platform = %platform, "detected platform");
      platform
    })
  }

  /// Command that starts a generated service.
  pub fn start_command(&self, name: &str, script_path: &Path) -> String {
    match self {
      Self::Darwin => format!("launchctl load {}", script_path.display()),
      Self::Centos => format!("initctl start {name}"),
      Self::Ubuntu | Self::InitD => format!("service {name} start"),
    }
  }

  /// Command that stops a generated service.
  pub fn stop_command(&self, name: &str, script_path: &Path) -> String {
    match self {
      Self::Darwin => format!("launchctl unload {}", script_path.display()),
      Self::Centos => format!("initctl stop {name}"),
      Self::Ubuntu | Self::InitD => format!("service {name} stop"),
    }
  }

  /// Native restart command, if the service manager has one.
  ///
  /// # Errors
  ///
  /// Returns [`PlatformError::Unimplemented`] when restart has to be
  /// synthesized from stop and start.
  pub fn restart_command(&self, name: &str, _script_path: &Path) -> Result<String, PlatformError> {
    match self {
      Self::Darwin => Err(PlatformError::Unimplemented {
        platform: *self,
        operation: "restart",
      }),
      Self::Centos => Ok(format!("initctl restart {name}")),
      Self::Ubuntu | Self::InitD => Ok(format!("service {name} restart")),
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

fn file_contains(path: &Path, marker: &str) -> bool {
  match fs::read_to_string(path) {
    Ok(content) => content.contains(marker),
    Err(e) => {
      debug!(path = %path.display(), error = %e, "release file not readable");
      false
    }
  }
}

/// Whether the current process already runs with root privileges.
#[cfg(unix)]
pub fn is_elevated() -> bool {
  rustix::process::geteuid().is_root()
}

/// Whether the current process already runs with root privileges.
#[cfg(not(unix))]
pub fn is_elevated() -> bool {
  false
}
