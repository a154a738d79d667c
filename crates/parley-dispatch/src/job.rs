use chrono::{DateTime, Utc};
use parley_session::ImageSource;
use parley_types::{ConversationId, JobId, JobOutcome, JobStatus};
use serde::{Deserialize, Serialize};

/// Work a job carries out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobRequest {
    Text {
        prompt: String,
    },
    /// A turn in the conversation's multimodal session; without an image
    /// the prompt is sent as plain text
    Image {
        prompt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<ImageSource>,
    },
    Summarize {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chunk_size: Option<usize>,
    },
}

impl JobRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self::Text {
            prompt: prompt.into(),
        }
    }

    pub fn image(prompt: impl Into<String>, image: ImageSource) -> Self {
        Self::vision(prompt, Some(image))
    }

    pub fn vision(prompt: impl Into<String>, image: Option<ImageSource>) -> Self {
        Self::Image {
            prompt: prompt.into(),
            image,
        }
    }

    pub fn summarize(text: impl Into<String>, chunk_size: Option<usize>) -> Self {
        Self::Summarize {
            text: text.into(),
            chunk_size,
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            Self::Text { .. } => JobKind::Text,
            Self::Image { .. } => JobKind::Image,
            Self::Summarize { .. } => JobKind::Summarize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Text,
    Image,
    Summarize,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Summarize => "summarize",
        })
    }
}

/// What travels through the queue to a worker
#[derive(Debug, Clone)]
pub(crate) struct Submission {
    pub id: JobId,
    pub conversation_id: ConversationId,
    pub request: JobRequest,
}

/// Registry view of one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub conversation_id: ConversationId,
    pub kind: JobKind,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<JobOutcome>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    pub(crate) fn pending(id: JobId, conversation_id: ConversationId, kind: JobKind) -> Self {
        Self {
            id,
            conversation_id,
            kind,
            status: JobStatus::Pending,
            outcome: None,
            submitted_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }
}

/// A terminal job handed back to a poller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedJob {
    pub job_id: JobId,
    pub conversation_id: ConversationId,
    pub outcome: JobOutcome,
}

impl CompletedJob {
    pub fn result(&self) -> Option<&str> {
        self.outcome.result()
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.error()
    }
}

/// Answer to a poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    /// Queued, no worker has picked it up yet (per-job polls only)
    Pending,
    /// Still running, or nothing is ready
    Processing,
    Ready(CompletedJob),
}

impl Poll {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn into_completed(self) -> Option<CompletedJob> {
        match self {
            Self::Ready(job) => Some(job),
            _ => None,
        }
    }
}
