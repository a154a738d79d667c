use config::{Config as ConfigLoader, ConfigBuilder, ConfigError, File};
use config::builder::DefaultState;
use parley_llm::{ChatOptions, ProviderConfig, ProviderType};
use parley_types::{DispatchConfig, SummaryConfig};
use serde::Deserialize;
use std::path::Path;

/// Environment prefixes and the config section each one overrides,
/// e.g. `LLM_TEXT_MODEL` sets `llm.text_model`
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("SERVER_", "server"),
    ("LLM_", "llm"),
    ("DISPATCH_", "dispatch"),
    ("SUMMARY_", "summary"),
    ("LOG_", "logging"),
];

/// Environment variable holding the provider API key
pub const API_KEY_VAR: &str = "PARLEY_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default, skip_deserializing)]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderType,
    pub text_model: String,
    /// Falls back to `text_model`
    #[serde(default)]
    pub vision_model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl LlmConfig {
    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub fn provider_config(&self, api_key: impl Into<String>) -> ProviderConfig {
        let config = ProviderConfig {
            provider: self.provider,
            api_key: api_key.into(),
            base_url: None,
        };
        match &self.base_url {
            Some(url) if !url.trim().is_empty() => config.with_base_url(url.clone()),
            _ => config,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (SERVER_, LLM_, DISPATCH_, SUMMARY_, LOG_ prefixes)
    ///
    /// The API key is only read from `PARLEY_API_KEY`. It may be empty here;
    /// building the application context rejects a missing key.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));
        let builder = apply_env_overrides(builder, std::env::vars())?;

        let mut cfg: Config = builder.build()?.try_deserialize()?;
        cfg.api_key = std::env::var(API_KEY_VAR).unwrap_or_default();
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }
}

/// `(section.key, value)` pairs for every variable carrying a section prefix
pub fn env_overrides<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter(|(name, _)| name != API_KEY_VAR)
        .filter_map(|(name, value)| {
            ENV_SECTIONS.iter().find_map(|(prefix, section)| {
                name.strip_prefix(prefix)
                    .filter(|field| !field.is_empty())
                    .map(|field| (format!("{}.{}", section, field.to_lowercase()), value.clone()))
            })
        })
        .collect()
}

fn apply_env_overrides<I>(
    mut builder: ConfigBuilder<DefaultState>,
    vars: I,
) -> Result<ConfigBuilder<DefaultState>, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in env_overrides(vars) {
        builder = builder.set_override(key, value)?;
    }
    Ok(builder)
}
