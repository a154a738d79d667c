//! Scriptable in-memory client for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::config::ProviderType;
use crate::traits::{ChatRequest, ChatResponse, ModelClient};

/// Records every request and answers with scripted or echoed replies.
///
/// Without scripted replies the answer is `reply to: <last user text>`.
/// Rules match against the text of the last message in the request.
#[derive(Default)]
pub struct ScriptedClient {
    requests: Mutex<Vec<ChatRequest>>,
    replies: Mutex<VecDeque<String>>,
    delay: Option<Duration>,
    delays: Vec<(String, Duration)>,
    failures: Vec<String>,
    models: Vec<String>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep before replying to prompts containing `needle`
    pub fn delay_when(mut self, needle: impl Into<String>, delay: Duration) -> Self {
        self.delays.push((needle.into(), delay));
        self
    }

    /// Fail prompts containing `needle`
    pub fn fail_when(mut self, needle: impl Into<String>) -> Self {
        self.failures.push(needle.into());
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    /// Queue a reply, used before the echo fallback
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.lock_replies().push_back(reply.into());
    }

    pub fn call_count(&self) -> usize {
        self.lock_requests().len()
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.lock_requests().clone()
    }

    /// Text of the last message of every request, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.lock_requests()
            .iter()
            .map(last_text)
            .collect()
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<ChatRequest>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        self.replies.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn last_text(request: &ChatRequest) -> String {
    request
        .messages
        .last()
        .map(|m| m.content().text_lossy())
        .unwrap_or_default()
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let prompt = last_text(&request);
        self.lock_requests().push(request);

        let delay = self
            .delays
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, d)| *d)
            .or(self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failures.iter().any(|needle| prompt.contains(needle.as_str())) {
            return Err(anyhow!("scripted failure for prompt: {}", prompt));
        }

        let reply = self
            .lock_replies()
            .pop_front()
            .unwrap_or_else(|| format!("reply to: {}", prompt));
        Ok(ChatResponse::from_text(reply))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(self.models.clone())
    }

    fn provider(&self) -> ProviderType {
        ProviderType::OpenAI
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[tokio::test]
    async fn test_scripted_then_echo() {
        let client = ScriptedClient::new();
        client.push_reply("first");

        assert_eq!(client.generate("m", "a").await.unwrap(), "first");
        assert_eq!(client.generate("m", "b").await.unwrap(), "reply to: b");
        assert_eq!(client.call_count(), 2);
        assert_eq!(client.prompts(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failure_rule() {
        let client = ScriptedClient::new().fail_when("boom");
        let request = ChatRequest::new("m", vec![Message::human("go boom")]);
        assert!(client.chat(request).await.is_err());
        assert_eq!(client.call_count(), 1);
    }
}
