// Gemini (Google Generative Language API) client implementation

use crate::config::ProviderType;
use crate::traits::{ChatOptions, ChatRequest, ChatResponse, ModelClient, TokenUsage};
use crate::types::{Content, ContentPart, Message};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini client (HTTP direct, no SDK)
///
/// Differences from the OpenAI protocol:
/// - URL: {base}/models/{model}:generateContent
/// - Auth header: x-goog-api-key
/// - Assistant role is "model"; system text goes to `systemInstruction`
/// - Images travel as `inline_data` parts
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&api_key).context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    /// Point the client at a different server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Model names may arrive as "models/gemma-3" (from list_models) or bare
    fn model_path(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        }
    }

    /// Build the generateContent request body
    fn build_request_body(&self, messages: Vec<Message>, options: &ChatOptions) -> Value {
        let mut contents = Vec::new();
        let mut system_parts = Vec::new();

        for msg in messages {
            match msg {
                Message::System { content } => {
                    system_parts.extend(self.convert_parts(content));
                }
                Message::Human { content } => contents.push(serde_json::json!({
                    "role": "user",
                    "parts": self.convert_parts(content),
                })),
                Message::AI { content } => contents.push(serde_json::json!({
                    "role": "model",
                    "parts": self.convert_parts(content),
                })),
            }
        }

        let mut body = serde_json::json!({ "contents": contents });

        if !system_parts.is_empty() {
            body["systemInstruction"] = serde_json::json!({ "parts": system_parts });
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(temp) = options.temperature {
            generation_config.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = options.max_tokens {
            generation_config.insert("maxOutputTokens".to_string(), serde_json::json!(max_tokens));
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }

        body
    }

    fn convert_parts(&self, content: Content) -> Vec<Value> {
        match content {
            Content::Text(text) => vec![serde_json::json!({ "text": text })],
            Content::Parts(parts) => parts
                .into_iter()
                .map(|part| match part {
                    ContentPart::Text { text } => serde_json::json!({ "text": text }),
                    ContentPart::Image { image } => serde_json::json!({
                        "inline_data": {
                            "mime_type": image.mime_type,
                            "data": image.to_base64(),
                        }
                    }),
                })
                .collect(),
        }
    }

    /// Parse a generateContent response
    fn parse_response(&self, json: Value) -> ChatResponse {
        let candidate = json["candidates"].as_array().and_then(|c| c.first());

        let text: Option<String> = candidate
            .and_then(|c| c["content"]["parts"].as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part["text"].as_str())
                    .collect::<String>()
            })
            .filter(|t| !t.is_empty());

        let finish_reason = candidate
            .and_then(|c| c["finishReason"].as_str())
            .map(str::to_string);

        let usage = json.get("usageMetadata").map(|meta| {
            let input = meta["promptTokenCount"].as_u64().unwrap_or(0) as u32;
            let output = meta["candidatesTokenCount"].as_u64().unwrap_or(0) as u32;
            TokenUsage {
                input_tokens: input,
                output_tokens: output,
                total_tokens: meta["totalTokenCount"]
                    .as_u64()
                    .map(|t| t as u32)
                    .unwrap_or(input.saturating_add(output)),
            }
        });

        ChatResponse {
            content: text,
            usage,
            finish_reason,
            raw: json,
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!(
            "{}/{}:generateContent",
            self.base_url,
            Self::model_path(&request.model)
        );
        let body = self.build_request_body(request.messages, &request.options);

        tracing::debug!(model = %request.model, "Gemini generateContent request");

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        let json: Value = response
            .json()
            .await
            .context("Failed to parse response")?;

        Ok(self.parse_response(json))
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
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        let json: Value = response
            .json()
            .await
            .context("Failed to parse model list")?;

        Ok(json["models"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn provider(&self) -> ProviderType {
        ProviderType::Gemini
    }
}
