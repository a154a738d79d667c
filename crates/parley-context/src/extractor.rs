use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parley_types::ParleyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported file format: {0}")]
    Unsupported(String),

    #[error("Error extracting text from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ExtractionError> for ParleyError {
    fn from(err: ExtractionError) -> Self {
        ParleyError::Extraction(err.to_string())
    }
}

/// Turns a document on disk into plain text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError>;

    /// Whether `path` has an extension this extractor handles
    fn supports(&self, path: &Path) -> bool;
}

/// Reads plain-text documents; dispatches on the lowercase file extension
#[derive(Debug, Clone)]
pub struct FileTextExtractor {
    extensions: Vec<String>,
}

impl Default for FileTextExtractor {
    fn default() -> Self {
        Self {
            extensions: vec!["txt".to_string(), "md".to_string()],
        }
    }
}

impl FileTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also accept `extension` (without the dot) as plain text
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into().trim_start_matches('.').to_lowercase());
        self
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[async_trait]
impl TextExtractor for FileTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        if !self.supports(path) {
            let ext = extension_of(path);
            let shown = if ext.is_empty() { String::new() } else { format!(".{}", ext) };
            return Err(ExtractionError::Unsupported(shown));
        }

        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ExtractionError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    fn supports(&self, path: &Path) -> bool {
        let ext = extension_of(path);
        self.extensions.iter().any(|e| *e == ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_txt_and_md() {
        let extractor = FileTextExtractor::new();
        for suffix in [".txt", ".MD"] {
            let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
            write!(file, "hello {}", suffix).unwrap();
            let text = extractor.extract(file.path()).await.unwrap();
            assert_eq!(text, format!("hello {}", suffix));
        }
    }

    #[tokio::test]
    async fn test_unsupported_extension_message() {
        let err = FileTextExtractor::new()
            .extract(Path::new("report.pdf"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file format: .pdf");

        let err: ParleyError = err.into();
        assert_eq!(err, ParleyError::Extraction("Unsupported file format: .pdf".to_string()));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = FileTextExtractor::new()
            .extract(Path::new("/no/such/notes.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Io { .. }));
    }

    #[test]
    fn test_extra_extension() {
        let extractor = FileTextExtractor::new().with_extension(".LOG");
        assert!(extractor.supports(Path::new("server.log")));
        assert!(!extractor.supports(Path::new("archive")));
    }
}
