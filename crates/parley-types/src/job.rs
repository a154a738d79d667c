use serde::{Deserialize, Serialize};

/// Lifecycle of an asynchronous job
///
/// Transitions are monotonic: pending -> processing -> ready | failed.
/// Terminal states never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Ready,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    /// Whether moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Ready)
                | (Self::Processing, Self::Failed)
        )
    }
}

/// What a finished job produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum JobOutcome {
    Ready(String),
    Failed(String),
}

impl JobOutcome {
    pub fn status(&self) -> JobStatus {
        match self {
            Self::Ready(_) => JobStatus::Ready,
            Self::Failed(_) => JobStatus::Failed,
        }
    }

    pub fn result(&self) -> Option<&str> {
        match self {
            Self::Ready(text) => Some(text),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Failed(err) => Some(err),
        }
    }
}

impl<E: std::fmt::Display> From<Result<String, E>> for JobOutcome {
    fn from(result: Result<String, E>) -> Self {
        match result {
            Ok(text) => Self::Ready(text),
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}
