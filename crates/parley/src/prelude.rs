//! Prelude module for convenient imports
//!
//! ```rust
//! use parley::prelude::*;
//! ```

pub use crate::{
    AppContext, AppContextBuilder,
    ModelClient, OpenAIClient, GeminiClient, ClientFactory, ProviderConfig,
    ChatOptions, Message, Content, ImageData,
    ConversationId, JobId, Modality, ParleyError,
    SessionManager, Persona, Priming, ImageSource, MultimodalMessageBuilder,
    ChunkingSummarizer, DocumentProcessor, TextExtractor,
    Dispatcher, JobRequest, Poll,
};
