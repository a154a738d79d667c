use chrono::{DateTime, Utc};
use parley_llm::Message;
use parley_types::{ConversationId, Modality};
use serde::{Deserialize, Serialize};

use crate::priming::{Priming, PrimingMode};

/// One ongoing dialogue.
///
/// History only grows through [`record_exchange`](Self::record_exchange) and
/// is only ever cleared as a whole.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: ConversationId,
    modality: Modality,
    priming: Option<Priming>,
    /// Setup exchange of a replayed priming, never visible in history
    hidden: Vec<Message>,
    history: Vec<Message>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(id: ConversationId, modality: Modality, priming: Option<Priming>) -> Self {
        let now = Utc::now();
        Self {
            id,
            modality,
            priming,
            hidden: Vec::new(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn priming(&self) -> Option<&Priming> {
        self.priming.as_ref()
    }

    /// Priming that must be sent as a setup round trip
    pub fn replay_priming(&self) -> Option<&Priming> {
        self.priming.as_ref().filter(|p| p.mode == PrimingMode::Replay)
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn hidden(&self) -> &[Message] {
        &self.hidden
    }

    pub fn is_primed(&self) -> bool {
        match &self.priming {
            Some(p) if p.mode == PrimingMode::Replay => !self.hidden.is_empty(),
            Some(_) => true,
            None => false,
        }
    }

    /// Full model context for the next user turn:
    /// prepended priming, hidden setup exchange, history, then `next`
    pub fn context(&self, next: &Message) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.hidden.len() + self.history.len() + 2);

        if let Some(priming) = self.priming.as_ref().filter(|p| p.mode == PrimingMode::Prepend) {
            messages.push(Message::system(priming.text.clone()));
        }
        messages.extend(self.hidden.iter().cloned());
        messages.extend(self.history.iter().cloned());
        messages.push(next.clone());
        messages
    }

    pub fn record_exchange(&mut self, user: Message, reply: impl Into<String>) {
        self.history.push(user);
        self.history.push(Message::ai(reply.into()));
        self.updated_at = Utc::now();
    }

    pub(crate) fn set_hidden(&mut self, hidden: Vec<Message>) {
        self.hidden = hidden;
    }

    /// Drop history and any replayed setup exchange; priming itself is kept
    pub fn clear(&mut self) {
        self.history.clear();
        self.hidden.clear();
        self.updated_at = Utc::now();
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            modality: self.modality,
            turns: self.history.len() / 2,
            primed: self.is_primed(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Read-only summary of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: ConversationId,
    pub modality: Modality,
    /// Completed user/assistant exchanges
    pub turns: usize,
    pub primed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
