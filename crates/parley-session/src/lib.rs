//! # parley-session
//!
//! Conversation state for Parley: per-conversation history, persona priming
//! and normalization of text + image input into model-ready messages.
//!
//! ```no_run
//! use std::sync::Arc;
//! use parley_llm::OpenAIClient;
//! use parley_session::{ModelBinding, Persona, SessionManager};
//! use parley_types::Modality;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = Arc::new(OpenAIClient::new("sk-...")?);
//! let manager = SessionManager::new(ModelBinding::new(client, "gpt-4o-mini"));
//!
//! let priming = Persona::topic_expert("astronomy", None).priming();
//! let id = manager.create(Modality::Text, Some(priming)).await?;
//! let reply = manager.send(&id, "What is a pulsar?", None).await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod manager;
pub mod priming;
pub mod session;

pub use builder::{decode_image, ImageSource, MultimodalMessageBuilder, NormalizedMessage};
pub use manager::{ModelBinding, SessionManager, DEFAULT_IMAGE_PROMPT, DEFAULT_TEXT_PROMPT};
pub use priming::{Persona, Priming, PrimingMode};
pub use session::{ConversationSession, SessionInfo};
