use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parley_llm::{ChatOptions, ChatRequest, Content, ImageData, Message, ModelClient};
use parley_types::{ConversationId, Modality, ParleyError, Result};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::builder::{ImageSource, MultimodalMessageBuilder, NormalizedMessage};
use crate::priming::Priming;
use crate::session::{ConversationSession, SessionInfo};

pub const DEFAULT_TEXT_PROMPT: &str = "Please analyze the following text and provide insights:";
pub const DEFAULT_IMAGE_PROMPT: &str = "Please analyze this image and describe what you see:";

/// A client plus the model name used for one modality
#[derive(Clone)]
pub struct ModelBinding {
    pub client: Arc<dyn ModelClient>,
    pub model: String,
}

impl ModelBinding {
    pub fn new(client: Arc<dyn ModelClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

impl fmt::Debug for ModelBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBinding")
            .field("provider", &self.client.provider())
            .field("model", &self.model)
            .finish()
    }
}

type SessionHandle = Arc<Mutex<ConversationSession>>;

/// Owns every conversation and is the only place that talks to the model
/// synchronously.
///
/// Each session sits behind its own mutex, so sends to one conversation are
/// serialized while different conversations proceed in parallel. The lock is
/// held across the model call; a concurrent `reset` waits for it.
pub struct SessionManager {
    text: ModelBinding,
    vision: Option<ModelBinding>,
    options: ChatOptions,
    sessions: RwLock<HashMap<ConversationId, SessionHandle>>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("text", &self.text)
            .field("vision", &self.vision)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(text: ModelBinding) -> Self {
        Self {
            text,
            vision: None,
            options: ChatOptions::default(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Enable multimodal sessions
    pub fn with_vision(mut self, vision: ModelBinding) -> Self {
        self.vision = Some(vision);
        self
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn binding(&self, modality: Modality) -> Result<&ModelBinding> {
        match modality {
            Modality::Text => Ok(&self.text),
            Modality::Multimodal => self.vision.as_ref().ok_or_else(|| {
                ParleyError::Capability("no multimodal model is configured".to_string())
            }),
        }
    }

    pub fn supports(&self, modality: Modality) -> bool {
        self.binding(modality).is_ok()
    }

    /// Allocate a session under a fresh id
    pub async fn create(&self, modality: Modality, priming: Option<Priming>) -> Result<ConversationId> {
        let id = ConversationId::generate();
        self.create_with_id(id.clone(), modality, priming).await?;
        Ok(id)
    }

    /// Allocate a session under a caller-chosen id, replacing any previous
    /// session with that id
    pub async fn create_with_id(
        &self,
        id: ConversationId,
        modality: Modality,
        priming: Option<Priming>,
    ) -> Result<()> {
        self.binding(modality)?;

        let mut session = ConversationSession::new(id.clone(), modality, priming);
        self.prime(&mut session).await;

        let previous = self
            .sessions
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(session)));

        info!(
            conversation_id = %id,
            modality = %modality,
            replaced = previous.is_some(),
            "Session created"
        );
        Ok(())
    }

    /// Look up a session, creating an unprimed one on first use
    pub async fn get_or_create(&self, id: &ConversationId, modality: Modality) -> Result<SessionInfo> {
        if let Some(handle) = self.sessions.read().await.get(id).cloned() {
            return Ok(handle.lock().await.info());
        }

        self.binding(modality)?;
        let handle = {
            let mut sessions = self.sessions.write().await;
            sessions
                .entry(id.clone())
                .or_insert_with(|| {
                    debug!(conversation_id = %id, modality = %modality, "Session created on first use");
                    Arc::new(Mutex::new(ConversationSession::new(id.clone(), modality, None)))
                })
                .clone()
        };
        let info = handle.lock().await.info();
        Ok(info)
    }

    async fn handle(&self, id: &ConversationId) -> Result<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ParleyError::SessionNotFound(id.clone()))
    }

    /// One user turn.
    ///
    /// An image on a text-only session fails with `Capability` before the
    /// model is called. History is only extended when the model replies.
    pub async fn send(&self, id: &ConversationId, text: &str, image: Option<ImageData>) -> Result<String> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;

        if image.is_some() && !session.modality().accepts_images() {
            return Err(ParleyError::Capability(format!(
                "session {} is text-only and cannot accept images",
                id
            )));
        }

        let binding = self.binding(session.modality())?;
        let content = match image {
            Some(image) => Content::with_image(text, image),
            None => Content::text(text),
        };
        let user = Message::human(content);

        debug!(
            conversation_id = %id,
            history_len = session.history().len(),
            images = user.content().image_count(),
            "Sending turn"
        );

        let reply = self.invoke(binding, session.context(&user)).await?;
        session.record_exchange(user, reply.clone());
        Ok(reply)
    }

    pub async fn send_message(&self, id: &ConversationId, message: NormalizedMessage) -> Result<String> {
        self.send(id, &message.text, message.image).await
    }

    /// Decode `image` for the session's modality, then send
    pub async fn send_source(
        &self,
        id: &ConversationId,
        text: &str,
        image: Option<ImageSource>,
    ) -> Result<String> {
        let modality = self.handle(id).await?.lock().await.modality();
        let message = MultimodalMessageBuilder::new(modality).build(text, image)?;
        self.send_message(id, message).await
    }

    /// `prefix` (or a generic analysis prompt) followed by the text
    pub async fn ask_with_prompt(&self, id: &ConversationId, prefix: Option<&str>, text: &str) -> Result<String> {
        let prompt = format!("{}\n\n{}", prefix.unwrap_or(DEFAULT_TEXT_PROMPT), text);
        self.send(id, &prompt, None).await
    }

    pub async fn describe_image(&self, id: &ConversationId, image: ImageData, prompt: Option<&str>) -> Result<String> {
        self.send(id, prompt.unwrap_or(DEFAULT_IMAGE_PROMPT), Some(image)).await
    }

    /// Single-shot call outside any conversation
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.invoke(&self.text, vec![Message::human(prompt)]).await
    }

    /// Single-shot multimodal call outside any conversation
    pub async fn generate_multimodal(&self, prompt: &str, image: ImageData) -> Result<String> {
        let binding = self.binding(Modality::Multimodal)?;
        self.invoke(binding, vec![Message::human(Content::with_image(prompt, image))])
            .await
    }

    /// Clear history and re-establish priming
    pub async fn reset(&self, id: &ConversationId) -> Result<()> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        session.clear();
        self.prime(&mut session).await;
        info!(conversation_id = %id, "Session reset");
        Ok(())
    }

    /// Reset every session of one modality; returns how many were reset
    pub async fn reset_modality(&self, modality: Modality) -> usize {
        let handles: Vec<SessionHandle> = self.sessions.read().await.values().cloned().collect();

        let mut count = 0;
        for handle in handles {
            let mut session = handle.lock().await;
            if session.modality() != modality {
                continue;
            }
            session.clear();
            self.prime(&mut session).await;
            count += 1;
        }

        info!(modality = %modality, count, "Sessions reset");
        count
    }

    /// Visible history, oldest first
    pub async fn history(&self, id: &ConversationId) -> Result<Vec<Message>> {
        let handle = self.handle(id).await?;
        let session = handle.lock().await;
        Ok(session.history().to_vec())
    }

    pub async fn info(&self, id: &ConversationId) -> Result<SessionInfo> {
        let handle = self.handle(id).await?;
        let info = handle.lock().await.info();
        Ok(info)
    }

    pub async fn remove(&self, id: &ConversationId) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!(conversation_id = %id, "Session removed");
        }
        removed
    }

    pub async fn contains(&self, id: &ConversationId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Run the setup round trip of a replayed priming, if any.
    /// A failed setup is logged and leaves the session unprimed.
    async fn prime(&self, session: &mut ConversationSession) {
        let Some(priming) = session.replay_priming() else {
            return;
        };
        let setup = Message::human(priming.text.clone());

        let binding = match self.binding(session.modality()) {
            Ok(binding) => binding,
            Err(e) => {
                warn!(conversation_id = %session.id(), error = %e, "Cannot prime session");
                return;
            }
        };

        match self.invoke(binding, vec![setup.clone()]).await {
            Ok(reply) => {
                session.set_hidden(vec![setup, Message::ai(reply)]);
                debug!(conversation_id = %session.id(), "Priming replayed");
            }
            Err(e) => {
                warn!(conversation_id = %session.id(), error = %e, "Error setting up persona");
            }
        }
    }

    async fn invoke(&self, binding: &ModelBinding, messages: Vec<Message>) -> Result<String> {
        let request = ChatRequest::new(binding.model.clone(), messages).with_options(self.options.clone());

        binding
            .client
            .chat(request)
            .await
            .and_then(|response| response.into_text())
            .map_err(|e| {
                warn!(model = %binding.model, error = %e, "Model call failed");
                ParleyError::model(format!("{:#}", e))
            })
    }
}
