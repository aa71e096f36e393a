use std::fmt;
use std::path::PathBuf;

use tracing::{error, warn};

use crate::service::{ServiceEntity, ServiceError};

/// What was attempted for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Generate,
  Start,
  Stop,
  Restart,
  Remove,
  RunScript,
}

impl Action {
  pub fn as_str(&self) -> &'static str {
    match self {
      Action::Generate => "generate",
      Action::Start => "start",
      Action::Stop => "stop",
      Action::Restart => "restart",
      Action::Remove => "remove",
      Action::RunScript => "run-script",
    }
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Done,
  /// Not attempted, with the reason.
  Skipped(String),
  /// Attempted and failed, with the error message.
  Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityOutcome {
  pub service: String,
  pub action: Action,
  /// The entity's wrapper path.
  pub script_path: PathBuf,
  pub log_file: PathBuf,
  pub outcome: Outcome,
}

/// Per-entity results of a batch command, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
  pub outcomes: Vec<EntityOutcome>,
}

impl BatchReport {
  pub fn push(&mut self, entity: &ServiceEntity, action: Action, outcome: Outcome) {
    self.outcomes.push(EntityOutcome {
      service: entity.name.clone(),
      action,
      script_path: entity.script_path.clone(),
      log_file: entity.log_file.clone(),
      outcome,
    });
  }

  /// Record an entity result. Non-runnable entities are skipped with a
  /// warning; other errors are failures.
  pub fn record(&mut self, entity: &ServiceEntity, action: Action, result: Result<(), ServiceError>) {
    let outcome = match result {
      Ok(()) => Outcome::Done,
      Err(e @ ServiceError::NotRunnable(_)) => {
        warn!(service = %entity.name, action = %action, "{e}");
        Outcome::Skipped(e.to_string())
      }
      Err(e) => {
        error!(service = %entity.name, action = %action, error = %e, "command failed");
        Outcome::Failed(e.to_string())
      }
    };
    self.push(entity, action, outcome);
  }

  pub fn is_empty(&self) -> bool {
    self.outcomes.is_empty()
  }

  pub fn failures(&self) -> impl Iterator<Item = &EntityOutcome> {
    self.outcomes.iter().filter(|o| matches!(o.outcome, Outcome::Failed(_)))
  }

  pub fn has_failures(&self) -> bool {
    self.failures().next().is_some()
  }
}
