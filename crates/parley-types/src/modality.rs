use serde::{Deserialize, Serialize};

/// What a session (or model binding) can carry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    #[default]
    Text,
    /// Text plus images. Web clients call this "image".
    #[serde(alias = "image")]
    Multimodal,
}

impl Modality {
    pub fn accepts_images(&self) -> bool {
        matches!(self, Self::Multimodal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Multimodal => "multimodal",
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
