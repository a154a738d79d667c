use std::sync::Arc;

use parley::AppContext;
use parley_types::Result;

use crate::config::Config;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub app: AppContext,
}

impl AppState {
    pub fn new(config: Config, app: AppContext) -> Self {
        Self {
            config: Arc::new(config),
            app,
        }
    }

    /// Build the application context from configuration.
    ///
    /// Fails with `ClientInit` when the API key or model is missing.
    pub fn from_config(config: Config) -> Result<Self> {
        let app = AppContext::builder()
            .provider(config.llm.provider_config(config.api_key.clone()))
            .text_model(config.llm.text_model.clone())
            .vision_model(config.llm.vision_model.clone())
            .options(config.llm.chat_options())
            .dispatch(config.dispatch.clone())
            .summary(config.summary.clone())
            .build()?;

        Ok(Self::new(config, app))
    }
}
