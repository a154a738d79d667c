//! # Parley
//!
//! Conversation orchestration for generative models.
//!
//! Parley keeps per-conversation history and persona priming, summarizes
//! documents too long for one call by chunking them, and runs long model calls
//! as background jobs that callers poll.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parley::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let app = AppContext::builder()
//!         .provider(ProviderConfig::gemini(std::env::var("PARLEY_API_KEY")?))
//!         .text_model("gemini-1.5-flash")
//!         .build()?;
//!
//!     let priming = Persona::topic_expert("astronomy", None).priming();
//!     let id = app.sessions.create(Modality::Text, Some(priming)).await?;
//!     println!("{}", app.sessions.send(&id, "What is a magnetar?", None).await?);
//!
//!     let job = app
//!         .dispatcher
//!         .submit(ConversationId::new("docs"), JobRequest::summarize("...", None))
//!         .await?;
//!     println!("submitted {job}");
//!
//!     app.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`parley-llm`**: provider-agnostic model client (OpenAI-compatible, Gemini)
//! - **`parley-types`**: ids, modality, job status and the error taxonomy
//! - **`parley-session`**: sessions, priming and multimodal message building
//! - **`parley-context`**: chunked summarization and text extraction
//! - **`parley-dispatch`**: bounded worker pool with submit/poll delivery

mod context;
pub mod prelude;

pub use context::{AppContext, AppContextBuilder};

pub use parley_llm::{
    ChatOptions, ChatRequest, ChatResponse, ClientFactory, Content, GeminiClient, ImageData, Message,
    ModelClient, OpenAIClient, ProviderConfig, ProviderType,
};

pub use parley_types::{
    ConversationId, DeliveryMode, DispatchConfig, JobId, JobOutcome, JobStatus, Modality, ParleyError,
    Result, SummaryConfig, DEFAULT_CHUNK_SIZE,
};

pub use parley_session::{
    ImageSource, ModelBinding, MultimodalMessageBuilder, NormalizedMessage, Persona, Priming, PrimingMode,
    SessionInfo, SessionManager,
};

pub use parley_context::{
    split_chunks, ChunkingSummarizer, DocumentAnalysis, DocumentChunk, DocumentProcessor, ExtractionError,
    FileTextExtractor, TextExtractor,
};

pub use parley_dispatch::{
    CompletedJob, ConversationHandler, Dispatcher, Job, JobHandler, JobKind, JobRequest, Poll,
};
