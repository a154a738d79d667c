use thiserror::Error;

use crate::ids::{ConversationId, JobId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParleyError {
    /// Missing credential or unusable client configuration. Fatal at startup.
    #[error("Client initialization error: {0}")]
    ClientInit(String),

    /// Text extraction failed for one input; other inputs are unaffected
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Image input sent to a text-only binding
    #[error("Capability error: {0}")]
    Capability(String),

    /// Malformed image payload (bad base64, unreadable image)
    #[error("Decode error: {0}")]
    Decode(String),

    /// The remote model call failed or returned an error
    #[error("Model invocation error: {0}")]
    ModelInvocation(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Session not found: {0}")]
    SessionNotFound(ConversationId),

    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    /// Dispatcher queue is saturated; retry later
    #[error("Job queue is full (capacity {0})")]
    QueueFull(usize),

    #[error("Dispatcher is shut down")]
    DispatcherClosed,
}

impl ParleyError {
    /// Wrap any client-side failure as a model invocation error
    pub fn model(err: impl std::fmt::Display) -> Self {
        Self::ModelInvocation(err.to_string())
    }

    /// Only configuration errors are allowed to halt the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ClientInit(_))
    }
}

pub type Result<T> = std::result::Result<T, ParleyError>;
