//! Provider-agnostic model client boundary.
//!
//! A [`ModelClient`] receives the full conversation context on every call and
//! returns a text reply. Two backends ship with the crate and are picked by
//! [`ClientFactory`] from a [`ProviderConfig`]:
//! - [`OpenAIClient`] for OpenAI-compatible chat completion servers
//! - [`GeminiClient`] for the Google Generative Language API

pub mod types;
pub mod traits;
pub mod config;
pub mod openai;
pub mod gemini;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use traits::{ModelClient, ChatRequest, ChatResponse, ChatOptions, TokenUsage};
pub use config::{ClientFactory, ProviderConfig, ProviderType};
pub use openai::OpenAIClient;
pub use gemini::GeminiClient;
pub use types::{Message, Content, ContentPart, ImageData};
