use std::sync::Arc;

use parley_session::SessionManager;
use parley_types::{ConversationId, ParleyError, Result, SummaryConfig};
use tracing::{debug, info};

use crate::chunker::{needs_chunking, split_chunks};
use crate::templates::{
    chunk_prompt, COMBINE_SUMMARIES_PROMPT, SUMMARIZE_CHUNK_PROMPT, SUMMARIZE_DOCUMENT_PROMPT,
};

/// Where summarization calls go
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    /// Independent single-shot calls
    SingleShot,
    /// Turns of an existing conversation
    Session(&'a ConversationId),
}

/// Summarizes documents too long for one call.
///
/// Text that fits in one chunk costs exactly one call. Longer text is split
/// into chunks summarized strictly in order, then a final call combines the
/// partial summaries: N chunks cost N + 1 calls.
#[derive(Debug, Clone)]
pub struct ChunkingSummarizer {
    sessions: Arc<SessionManager>,
    config: SummaryConfig,
    document_prompt: String,
    chunk_prompt: String,
    combine_prompt: String,
}

impl ChunkingSummarizer {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self::with_config(sessions, SummaryConfig::default())
    }

    pub fn with_config(sessions: Arc<SessionManager>, config: SummaryConfig) -> Self {
        Self {
            sessions,
            config,
            document_prompt: SUMMARIZE_DOCUMENT_PROMPT.to_string(),
            chunk_prompt: SUMMARIZE_CHUNK_PROMPT.to_string(),
            combine_prompt: COMBINE_SUMMARIES_PROMPT.to_string(),
        }
    }

    /// Override the prompts. The chunk template may use `<index>` and `<total>`.
    pub fn with_templates(
        mut self,
        document_prompt: impl Into<String>,
        chunk_prompt: impl Into<String>,
        combine_prompt: impl Into<String>,
    ) -> Self {
        self.document_prompt = document_prompt.into();
        self.chunk_prompt = chunk_prompt.into();
        self.combine_prompt = combine_prompt.into();
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Summarize with independent calls; `chunk_size` defaults to the
    /// configured size
    pub async fn summarize(&self, text: &str, chunk_size: Option<usize>) -> Result<String> {
        self.run(Target::SingleShot, text, chunk_size).await
    }

    /// Summarize inside a conversation, so the chunks become part of its history
    pub async fn summarize_in_session(
        &self,
        id: &ConversationId,
        text: &str,
        chunk_size: Option<usize>,
    ) -> Result<String> {
        self.run(Target::Session(id), text, chunk_size).await
    }

    async fn run(&self, target: Target<'_>, text: &str, chunk_size: Option<usize>) -> Result<String> {
        if text.trim().is_empty() {
            return Err(ParleyError::EmptyInput(
                "cannot summarize an empty document".to_string(),
            ));
        }

        let chunk_size = chunk_size.unwrap_or(self.config.chunk_size);
        if !needs_chunking(text, chunk_size) {
            debug!(chars = text.chars().count(), "Summarizing in one call");
            return self.call(target, &self.document_prompt, text).await;
        }

        let chunks = split_chunks(text, chunk_size);
        info!(chunks = chunks.len(), chunk_size, "Summarizing document in chunks");

        let mut summaries = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            debug!(chunk = chunk.number(), total = chunk.total, "Processing chunk");
            let prompt = chunk_prompt(&self.chunk_prompt, chunk.number(), chunk.total);
            summaries.push(self.call(target, &prompt, &chunk.text).await?);
        }

        let combined = summaries.join("\n\n");
        self.call(target, &self.combine_prompt, &combined).await
    }

    async fn call(&self, target: Target<'_>, prompt: &str, text: &str) -> Result<String> {
        match target {
            Target::SingleShot => {
                self.sessions
                    .generate(&format!("{}\n\n{}", prompt, text))
                    .await
            }
            Target::Session(id) => self.sessions.ask_with_prompt(id, Some(prompt), text).await,
        }
    }
}
