//! Persona priming: hidden instructions that shape every later turn.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// How the priming text reaches the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimingMode {
    /// Sent as a system message ahead of the history on every call
    #[default]
    Prepend,
    /// Sent once as a setup turn on create/reset; the exchange is kept as a
    /// hidden context prefix and never shown in history
    Replay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priming {
    pub text: String,
    #[serde(default)]
    pub mode: PrimingMode,
}

impl Priming {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: PrimingMode::default(),
        }
    }

    pub fn replay(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: PrimingMode::Replay,
        }
    }

    pub fn with_mode(mut self, mode: PrimingMode) -> Self {
        self.mode = mode;
        self
    }
}

/// A named expert role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub topic: String,
    pub knowledge: Option<String>,
}

impl Persona {
    pub fn topic_expert(topic: impl Into<String>, knowledge: Option<String>) -> Self {
        Self {
            topic: topic.into(),
            knowledge: knowledge.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Loads specialized knowledge from a file. An unreadable file yields a
    /// topic-only persona.
    pub fn from_knowledge_file(topic: impl Into<String>, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let knowledge = match std::fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not load knowledge file");
                None
            }
        };
        Self::topic_expert(topic, knowledge)
    }

    pub fn priming_text(&self) -> String {
        let mut text = format!(
            "I want you to act as an expert on {topic}. \
             Please respond to all questions as if you are a leading authority on this subject. \
             Keep your answers focused on {topic}.",
            topic = self.topic
        );
        if let Some(knowledge) = &self.knowledge {
            text.push_str(" Here's some specialized knowledge you have: ");
            text.push_str(knowledge.trim());
        }
        text
    }

    pub fn priming(&self) -> Priming {
        Priming::new(self.priming_text())
    }
}

impl From<Persona> for Priming {
    fn from(persona: Persona) -> Self {
        persona.priming()
    }
}
