use crate::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum Outcome {
    AlreadyRunning,
    AlreadyStopped,
    Started,
    Stopped,
    Restarted,
    Removed,
    Failed(Error),
}

/// Result of acting on one identifier of a batch.
#[derive(Debug)]
pub struct ServiceOutcome {
    pub service: String,
    pub outcome: Outcome,
}

impl ServiceOutcome {
    pub fn new(service: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            service: service.into(),
            outcome,
        }
    }

    pub fn failed(service: impl Into<String>, error: Error) -> Self {
        Self::new(service, Outcome::Failed(error))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }

    pub fn error(&self) -> Option<&Error> {
        match &self.outcome {
            Outcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::AlreadyRunning => write!(f, "{}: already running", self.service),
            Outcome::AlreadyStopped => write!(f, "{}: already stopped", self.service),
            Outcome::Started => write!(f, "{}: started", self.service),
            Outcome::Stopped => write!(f, "{}: stopped", self.service),
            Outcome::Restarted => write!(f, "{}: restarted", self.service),
            Outcome::Removed => write!(f, "{}: removed", self.service),
            Outcome::Failed(err) => write!(f, "{}: FAILED: {err}", self.service),
        }
    }
}

/// True when any outcome in the batch failed.
pub fn any_failed(outcomes: &[ServiceOutcome]) -> bool {
    outcomes.iter().any(ServiceOutcome::is_failure)
}
