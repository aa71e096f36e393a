use std::fmt;

/// Host operating system family as reported by the standard library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
  Other,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Self {
    Self::from_identifier(std::env::consts::OS)
  }

  /// Map a host identifier (`std::env::consts::OS` style) onto a family
  pub fn from_identifier(id: &str) -> Self {
    match id {
      "linux" => Self::Linux,
      "macos" => Self::MacOs,
      "windows" => Self::Windows,
      _ => Self::Other,
    }
  }

  /// Returns the lowercase string identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
      Self::Windows => "windows",
      Self::Other => "unknown",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
