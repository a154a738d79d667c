//! Normalizes a text prompt plus an optional image into one model-ready message.

use std::io::Cursor;
use std::path::PathBuf;

use base64::Engine;
use parley_llm::{Content, ImageData, Message};
use parley_types::{Modality, ParleyError, Result};
use serde::{Deserialize, Serialize};

/// Where an image comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImageSource {
    /// Raw encoded image bytes (PNG, JPEG, ...)
    Bytes(Vec<u8>),
    /// Image file on disk
    Path(PathBuf),
    /// Base64 payload, optionally with a `data:image/...;base64,` header
    Base64(String),
}

impl ImageSource {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn base64(encoded: impl Into<String>) -> Self {
        Self::Base64(encoded.into())
    }
}

/// One user turn: text plus at most one decoded image
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMessage {
    pub text: String,
    pub image: Option<ImageData>,
}

impl NormalizedMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn to_content(&self) -> Content {
        match &self.image {
            Some(image) => Content::with_image(self.text.clone(), image.clone()),
            None => Content::text(self.text.clone()),
        }
    }

    pub fn into_message(self) -> Message {
        Message::human(self.to_content())
    }
}

/// Builds [`NormalizedMessage`]s for a binding of a given modality
#[derive(Debug, Clone, Copy, Default)]
pub struct MultimodalMessageBuilder {
    modality: Modality,
}

impl MultimodalMessageBuilder {
    pub fn new(modality: Modality) -> Self {
        Self { modality }
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    /// Text plus zero or one image.
    ///
    /// Images are rejected with `Capability` on a text-only builder before
    /// any decoding happens; malformed payloads fail with `Decode`.
    pub fn build(&self, text: impl Into<String>, image: Option<ImageSource>) -> Result<NormalizedMessage> {
        let text = text.into();
        let image = match image {
            None => None,
            Some(_) if !self.modality.accepts_images() => {
                return Err(ParleyError::Capability(
                    "images require a multimodal binding".to_string(),
                ));
            }
            Some(source) => Some(decode_image(source)?),
        };

        Ok(NormalizedMessage { text, image })
    }
}

/// Decode any [`ImageSource`] into validated image bytes with a sniffed MIME type
pub fn decode_image(source: ImageSource) -> Result<ImageData> {
    let bytes = match source {
        ImageSource::Bytes(bytes) => bytes,
        ImageSource::Path(path) => std::fs::read(&path).map_err(|e| {
            ParleyError::Decode(format!("cannot read image {}: {}", path.display(), e))
        })?,
        ImageSource::Base64(encoded) => decode_base64(&encoded)?,
    };

    let mime_type = sniff_image(&bytes)?;
    Ok(ImageData::new(mime_type, bytes))
}

/// Strip an optional data-URI header and decode the base64 payload
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    let payload = strip_data_uri(encoded.trim())?;
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    if compact.is_empty() {
        return Err(ParleyError::Decode("empty image payload".to_string()));
    }

    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ParleyError::Decode(format!("invalid base64: {}", e)))
}

fn strip_data_uri(input: &str) -> Result<&str> {
    if !input.starts_with("data:") {
        return Ok(input);
    }
    match input.split_once(',') {
        Some((header, payload)) if header.ends_with(";base64") => Ok(payload),
        Some((header, _)) => Err(ParleyError::Decode(format!(
            "data URI is not base64 encoded: {}",
            header
        ))),
        None => Err(ParleyError::Decode("data URI has no payload".to_string())),
    }
}

/// Parse the image header; returns its MIME type
fn sniff_image(bytes: &[u8]) -> Result<String> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ParleyError::Decode(format!("unreadable image: {}", e)))?;

    let format = reader
        .format()
        .ok_or_else(|| ParleyError::Decode("unrecognized image format".to_string()))?;

    reader
        .into_dimensions()
        .map_err(|e| ParleyError::Decode(format!("unreadable image: {}", e)))?;

    Ok(format.to_mime_type().to_string())
}
