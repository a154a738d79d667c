use std::sync::Arc;

use parley_context::{ChunkingSummarizer, DocumentProcessor, FileTextExtractor, TextExtractor};
use parley_dispatch::{ConversationHandler, Dispatcher, JobHandler};
use parley_llm::{ChatOptions, ClientFactory, ModelClient, ProviderConfig};
use parley_session::{ModelBinding, SessionManager};
use parley_types::{DispatchConfig, ParleyError, Result, SummaryConfig};
use tracing::info;

/// Everything the application shares, built once at startup and passed
/// around by reference
#[derive(Clone)]
pub struct AppContext {
    pub client: Arc<dyn ModelClient>,
    pub extractor: Arc<dyn TextExtractor>,
    pub sessions: Arc<SessionManager>,
    pub summarizer: ChunkingSummarizer,
    pub documents: Arc<DocumentProcessor>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppContext {
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }

    /// Stop the dispatcher, letting queued jobs finish
    pub async fn shutdown(&self) {
        self.dispatcher.shutdown().await;
    }
}

/// Builder for [`AppContext`]
pub struct AppContextBuilder {
    client: Option<Arc<dyn ModelClient>>,
    provider: Option<ProviderConfig>,
    extractor: Option<Arc<dyn TextExtractor>>,
    handler: Option<Arc<dyn JobHandler>>,
    text_model: Option<String>,
    vision_model: Option<String>,
    options: ChatOptions,
    dispatch: DispatchConfig,
    summary: SummaryConfig,
}

impl AppContextBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            provider: None,
            extractor: None,
            handler: None,
            text_model: None,
            vision_model: None,
            options: ChatOptions::default(),
            dispatch: DispatchConfig::default(),
            summary: SummaryConfig::default(),
        }
    }

    /// Use an existing client; takes precedence over [`provider`](Self::provider)
    pub fn client(mut self, client: Arc<dyn ModelClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the client from provider settings at [`build`](Self::build)
    pub fn provider(mut self, config: ProviderConfig) -> Self {
        self.provider = Some(config);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Replace the default [`ConversationHandler`] used by the workers
    pub fn job_handler(mut self, handler: Arc<dyn JobHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = Some(model.into());
        self
    }

    /// Model for multimodal sessions; the text model is used when unset
    pub fn vision_model(mut self, model: Option<String>) -> Self {
        self.vision_model = model;
        self
    }

    pub fn options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dispatch(mut self, config: DispatchConfig) -> Self {
        self.dispatch = config;
        self
    }

    pub fn summary(mut self, config: SummaryConfig) -> Self {
        self.summary = config;
        self
    }

    /// Wire everything together and start the dispatcher.
    ///
    /// Missing or unusable client settings fail with `ClientInit`.
    /// Must be called inside a tokio runtime.
    pub fn build(self) -> Result<AppContext> {
        let client = match (self.client, self.provider) {
            (Some(client), _) => client,
            (None, Some(provider)) => ClientFactory::create_client(provider)
                .map_err(|e| ParleyError::ClientInit(format!("{:#}", e)))?,
            (None, None) => {
                return Err(ParleyError::ClientInit(
                    "a model client or provider configuration is required".to_string(),
                ))
            }
        };

        let text_model = self
            .text_model
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| ParleyError::ClientInit("a text model name is required".to_string()))?;
        let vision_model = self.vision_model.unwrap_or_else(|| text_model.clone());

        let sessions = Arc::new(
            SessionManager::new(ModelBinding::new(client.clone(), text_model.clone()))
                .with_vision(ModelBinding::new(client.clone(), vision_model.clone()))
                .with_options(self.options),
        );

        let summarizer = ChunkingSummarizer::with_config(sessions.clone(), self.summary);
        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(FileTextExtractor::new()));
        let documents = Arc::new(DocumentProcessor::new(summarizer.clone(), extractor.clone()));

        let handler = self
            .handler
            .unwrap_or_else(|| Arc::new(ConversationHandler::new(sessions.clone(), summarizer.clone())));
        let dispatcher = Arc::new(Dispatcher::start(handler, self.dispatch));

        info!(
            provider = %client.provider(),
            text_model = %text_model,
            vision_model = %vision_model,
            "Application context ready"
        );

        Ok(AppContext {
            client,
            extractor,
            sessions,
            summarizer,
            documents,
            dispatcher,
        })
    }
}

impl Default for AppContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
