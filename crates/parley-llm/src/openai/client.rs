// OpenAI-compatible client implementation

use crate::config::ProviderType;
use crate::traits::{ChatOptions, ChatRequest, ChatResponse, ModelClient, TokenUsage};
use crate::types::{Content, ContentPart, Message};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI client (HTTP direct, no SDK)
///
/// Any server speaking the chat completions protocol works, so this is also
/// the backend for locally hosted models (point `base_url` at them).
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
        })
    }

    /// Point the client at a different server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build chat completion request payload
    fn build_chat_request(
        &self,
        model: &str,
        messages: Vec<Message>,
        options: &ChatOptions,
    ) -> Value {
        let openai_messages: Vec<Value> = messages
            .into_iter()
            .map(|msg| self.convert_message(msg))
            .collect();

        let mut request = serde_json::json!({
            "model": model,
            "messages": openai_messages,
            "stream": false,
        });

        if let Some(temp) = options.temperature {
            request["temperature"] = serde_json::json!(temp);
        }
        if let Some(max_tokens) = options.max_tokens {
            request["max_tokens"] = serde_json::json!(max_tokens);
        }

        request
    }

    /// Convert our Message type to OpenAI format
    fn convert_message(&self, message: Message) -> Value {
        let role = message.role().to_string();
        let content = match message {
            Message::System { content } | Message::Human { content } | Message::AI { content } => {
                content
            }
        };

        serde_json::json!({
            "role": role,
            "content": self.convert_content(content),
        })
    }

    /// Convert Content to OpenAI format (string or array)
    fn convert_content(&self, content: Content) -> Value {
        match content {
            Content::Text(s) => serde_json::json!(s),
            Content::Parts(parts) => {
                let converted: Vec<Value> = parts
                    .into_iter()
                    .map(|part| match part {
                        ContentPart::Text { text } => serde_json::json!({
                            "type": "text",
                            "text": text,
                        }),
                        ContentPart::Image { image } => serde_json::json!({
                            "type": "image_url",
                            "image_url": { "url": image.to_data_uri() },
                        }),
                    })
                    .collect();
                serde_json::json!(converted)
            }
        }
    }
}

// ============================================================================
// TRAIT IMPLEMENTATION
// ============================================================================

#[async_trait]
impl ModelClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(&request.model, request.messages, &request.options);

        tracing::debug!(model = %request.model, "OpenAI chat request");

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        let raw: OpenAIChatResponse = response
            .json()
            .await
            .context("Failed to parse response")?;

        // Convert to provider-agnostic response
        let choice = raw.choices.first();
        Ok(ChatResponse {
            content: choice.and_then(|c| c.message.content.clone()),
            usage: raw.usage.as_ref().map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.and_then(|c| c.finish_reason.clone()),
            raw: serde_json::to_value(&raw)?,
        })
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .http_client
            .get(format!("{}/models", self.base_url))
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        let raw: OpenAIModelList = response
            .json()
            .await
            .context("Failed to parse model list")?;

        Ok(raw.data.into_iter().map(|m| m.id).collect())
    }

    fn provider(&self) -> ProviderType {
        ProviderType::OpenAI
    }
}

// ============================================================================
// OPENAI-SPECIFIC RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Choice {
    pub index: u32,
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResponseMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIModelList {
    pub data: Vec<OpenAIModel>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIModel {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageData;

    #[test]
    fn test_build_request_with_image_part() {
        let client = OpenAIClient::new("k").unwrap();
        let image = ImageData::new("image/png", vec![1, 2, 3]);
        let payload = client.build_chat_request(
            "gpt-4o",
            vec![
                Message::system("be brief"),
                Message::human(Content::with_image("what is this?", image)),
            ],
            &ChatOptions::new().temperature(0.2),
        );

        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][0]["content"], "be brief");
        let parts = payload["messages"][1]["content"].as_array().unwrap();
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/png;base64,AQID");
        assert!(payload.get("max_tokens").is_none());
    }
}
