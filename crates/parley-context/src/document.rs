use std::path::{Path, PathBuf};
use std::sync::Arc;

use parley_session::{decode_image, ImageSource};
use parley_types::{ConversationId, ParleyError, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extractor::TextExtractor;
use crate::summarizer::ChunkingSummarizer;
use crate::templates::{COMBINED_ANALYSIS_PROMPT, EXTRACTED_TEXT_PROMPT, VISUAL_ANALYSIS_PROMPT};

/// Outcome for one document of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub path: PathBuf,
    pub result: Result<String>,
}

/// Visual and textual analysis of a document image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub visual_analysis: String,
    /// `None` when extraction was not requested or produced no text
    pub extracted_text: Option<String>,
    pub text_analysis: Option<String>,
    pub combined_analysis: Option<String>,
}

/// Extract-then-summarize over files on disk
pub struct DocumentProcessor {
    summarizer: ChunkingSummarizer,
    extractor: Arc<dyn TextExtractor>,
}

impl DocumentProcessor {
    pub fn new(summarizer: ChunkingSummarizer, extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            summarizer,
            extractor,
        }
    }

    pub fn summarizer(&self) -> &ChunkingSummarizer {
        &self.summarizer
    }

    pub async fn extract(&self, path: &Path) -> Result<String> {
        Ok(self.extractor.extract(path).await?)
    }

    pub async fn summarize_document(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let text = self.extract(path).await?;
        info!(path = %path.display(), chars = text.chars().count(), "Summarizing document");
        self.summarizer.summarize(&text, None).await
    }

    /// One result per input; a failing document never aborts the batch
    pub async fn summarize_documents<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<DocumentSummary> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let result = self.summarize_document(path).await;
            if let Err(e) = &result {
                warn!(path = %path.display(), error = %e, "Document summary failed");
            }
            results.push(DocumentSummary {
                path: path.to_path_buf(),
                result,
            });
        }
        results
    }

    /// Analyze a document image inside a multimodal conversation.
    ///
    /// With `extract_text`, text pulled out by the extractor is analyzed too and
    /// a final turn combines both views. Extraction failures only skip the
    /// textual part.
    pub async fn analyze_image_document(
        &self,
        id: &ConversationId,
        path: impl AsRef<Path>,
        extract_text: bool,
    ) -> Result<DocumentAnalysis> {
        let path = path.as_ref();
        let sessions = self.summarizer.sessions();

        let info = sessions.info(id).await?;
        if !info.modality.accepts_images() {
            return Err(ParleyError::Capability(format!(
                "session {} is not multimodal",
                id
            )));
        }

        let image = decode_image(ImageSource::path(path))?;
        let visual_analysis = sessions
            .send(id, VISUAL_ANALYSIS_PROMPT, Some(image))
            .await?;

        let mut analysis = DocumentAnalysis {
            visual_analysis,
            extracted_text: None,
            text_analysis: None,
            combined_analysis: None,
        };
        if !extract_text {
            return Ok(analysis);
        }

        let text = match self.extractor.extract(path).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => return Ok(analysis),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "No text extracted from document image");
                return Ok(analysis);
            }
        };

        let text_analysis = sessions
            .ask_with_prompt(id, Some(EXTRACTED_TEXT_PROMPT), &text)
            .await?;
        let combined = sessions.send(id, COMBINED_ANALYSIS_PROMPT, None).await?;

        analysis.extracted_text = Some(text);
        analysis.text_analysis = Some(text_analysis);
        analysis.combined_analysis = Some(combined);
        Ok(analysis)
    }
}
