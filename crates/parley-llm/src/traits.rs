use crate::config::ProviderType;
use crate::types::{Content, ImageData, Message};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for conversational model interactions
///
/// Clients are stateless: every call carries the full context it needs.
/// Conversation state lives with the caller (see `parley-session`).
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Non-streaming chat completion over the given context
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Names of the models this provider exposes
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Which backend this client talks to
    fn provider(&self) -> ProviderType;

    /// Single-shot text generation (no conversation context)
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(model, vec![Message::human(prompt)]);
        self.chat(request).await?.into_text()
    }

    /// Single-shot generation over a text prompt plus one image
    async fn generate_multimodal(
        &self,
        model: &str,
        prompt: &str,
        image: ImageData,
    ) -> Result<String> {
        let request = ChatRequest::new(
            model,
            vec![Message::human(Content::with_image(prompt, image))],
        );
        self.chat(request).await?.into_text()
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
    pub raw: serde_json::Value,
}

impl ChatResponse {
    /// Plain response built from text (handy for stubs)
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            usage: None,
            finish_reason: Some("stop".to_string()),
            raw: serde_json::Value::Null,
        }
    }

    /// Take the reply text, failing if the model produced none
    pub fn into_text(self) -> Result<String> {
        self.content
            .ok_or_else(|| anyhow!("Model returned no content (finish_reason: {:?})", self.finish_reason))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}
