use std::sync::Arc;

use async_trait::async_trait;
use parley_context::ChunkingSummarizer;
use parley_session::SessionManager;
use parley_types::{ConversationId, Modality, Result};

use crate::job::JobRequest;

/// Executes one job on a worker
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, conversation: &ConversationId, request: JobRequest) -> Result<String>;
}

/// Routes chat jobs to the conversation's session and summaries to the
/// summarizer.
///
/// Text and image jobs of one conversation id live in separate sessions,
/// keyed `<modality>/<conversation id>`.
pub struct ConversationHandler {
    sessions: Arc<SessionManager>,
    summarizer: ChunkingSummarizer,
}

impl ConversationHandler {
    pub fn new(sessions: Arc<SessionManager>, summarizer: ChunkingSummarizer) -> Self {
        Self {
            sessions,
            summarizer,
        }
    }

    pub fn session_key(modality: Modality, conversation: &ConversationId) -> ConversationId {
        ConversationId::new(format!("{}/{}", modality, conversation))
    }
}

#[async_trait]
impl JobHandler for ConversationHandler {
    async fn handle(&self, conversation: &ConversationId, request: JobRequest) -> Result<String> {
        match request {
            JobRequest::Text { prompt } => {
                let key = Self::session_key(Modality::Text, conversation);
                self.sessions.get_or_create(&key, Modality::Text).await?;
                self.sessions.send(&key, &prompt, None).await
            }
            JobRequest::Image { prompt, image } => {
                let key = Self::session_key(Modality::Multimodal, conversation);
                self.sessions.get_or_create(&key, Modality::Multimodal).await?;
                self.sessions.send_source(&key, &prompt, image).await
            }
            JobRequest::Summarize { text, chunk_size } => {
                self.summarizer.summarize(&text, chunk_size).await
            }
        }
    }
}
