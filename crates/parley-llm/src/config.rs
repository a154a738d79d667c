// Configuration layer for provider-agnostic model client creation
// Backends are selected here, at construction time, never by editing code

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::traits::ModelClient;

/// Type of model provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// OpenAI-compatible chat completions (also local inference servers)
    #[default]
    OpenAI,
    /// Google Generative Language API
    Gemini,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for ProviderType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "gemini" => Ok(Self::Gemini),
            other => bail!("Unknown provider: {}", other),
        }
    }
}

/// Provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: ProviderType,
    pub api_key: String,
    /// Base URL override (optional, defaults to the provider's public endpoint)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderConfig {
    /// Create OpenAI provider config
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::OpenAI,
            api_key: api_key.into(),
            base_url: None,
        }
    }

    /// Create Gemini provider config
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::Gemini,
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Get the provider type
    pub fn provider_type(&self) -> ProviderType {
        self.provider
    }
}

/// Factory for creating model clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    /// Create a model client from provider configuration
    ///
    /// Fails if the API key is empty or the HTTP client cannot be built.
    pub fn create_client(config: ProviderConfig) -> Result<Arc<dyn ModelClient>> {
        if config.api_key.trim().is_empty() {
            bail!("API key for provider '{}' is empty", config.provider);
        }

        match config.provider {
            ProviderType::OpenAI => {
                let mut client = crate::openai::OpenAIClient::new(config.api_key)?;
                if let Some(base_url) = config.base_url {
                    client = client.with_base_url(base_url);
                }
                Ok(Arc::new(client))
            }
            ProviderType::Gemini => {
                let mut client = crate::gemini::GeminiClient::new(config.api_key)?;
                if let Some(base_url) = config.base_url {
                    client = client.with_base_url(base_url);
                }
                Ok(Arc::new(client))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_config() {
        let config = ProviderConfig::openai("test-key");
        assert_eq!(config.provider_type(), ProviderType::OpenAI);
    }

    #[test]
    fn test_gemini_config_with_base_url() {
        let config = ProviderConfig::gemini("test-key").with_base_url("http://localhost:9999");
        assert_eq!(config.provider_type(), ProviderType::Gemini);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9999"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ProviderConfig::openai("sk-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Gemini".parse::<ProviderType>().unwrap(), ProviderType::Gemini);
        assert_eq!("openai".parse::<ProviderType>().unwrap(), ProviderType::OpenAI);
        assert!("anthropic".parse::<ProviderType>().is_err());
    }

    #[test]
    fn test_factory_selects_backend() {
        let openai = ClientFactory::create_client(ProviderConfig::openai("k")).unwrap();
        assert_eq!(openai.provider(), ProviderType::OpenAI);

        let gemini = ClientFactory::create_client(ProviderConfig::gemini("k")).unwrap();
        assert_eq!(gemini.provider(), ProviderType::Gemini);
    }

    #[test]
    fn test_factory_rejects_empty_key() {
        assert!(ClientFactory::create_client(ProviderConfig::gemini("  ")).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = ProviderConfig::gemini("test-key").with_base_url("http://x");

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ProviderConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.provider_type(), deserialized.provider_type());
        assert_eq!(deserialized.base_url.as_deref(), Some("http://x"));
    }
}
