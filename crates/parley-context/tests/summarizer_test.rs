use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parley_context::{
    ChunkingSummarizer, DocumentProcessor, ExtractionError, FileTextExtractor, TextExtractor,
};
use parley_llm::testing::ScriptedClient;
use parley_session::{ModelBinding, SessionManager};
use parley_types::{Modality, ParleyError, SummaryConfig};

fn sessions(client: Arc<ScriptedClient>) -> Arc<SessionManager> {
    Arc::new(
        SessionManager::new(ModelBinding::new(client.clone(), "text-model"))
            .with_vision(ModelBinding::new(client, "vision-model")),
    )
}

fn summarizer(client: Arc<ScriptedClient>, chunk_size: usize) -> ChunkingSummarizer {
    ChunkingSummarizer::with_config(sessions(client), SummaryConfig::new().with_chunk_size(chunk_size))
}

#[tokio::test]
async fn test_short_text_is_one_call() {
    let client = Arc::new(ScriptedClient::new());
    let summary = summarizer(client.clone(), 10).summarize("0123456789", None).await.unwrap();

    assert_eq!(client.call_count(), 1);
    assert_eq!(client.prompts()[0], "Please summarize this document:\n\n0123456789");
    assert!(summary.starts_with("reply to: Please summarize this document:"));
}

#[tokio::test]
async fn test_fifteen_chars_by_ten_is_three_calls() {
    let client = Arc::new(ScriptedClient::new());
    client.push_reply("S1");
    client.push_reply("S2");
    client.push_reply("FINAL");

    let summary = summarizer(client.clone(), 10)
        .summarize("abcdefghijklmno", None)
        .await
        .unwrap();

    assert_eq!(summary, "FINAL");
    let prompts = client.prompts();
    assert_eq!(prompts.len(), 3);
    assert_eq!(
        prompts[0],
        "This is part 1 of 2 of a document. Please summarize this section:\n\nabcdefghij"
    );
    assert_eq!(
        prompts[1],
        "This is part 2 of 2 of a document. Please summarize this section:\n\nklmno"
    );
    assert_eq!(
        prompts[2],
        "The following are summaries of different parts of a document. \
         Please provide a coherent overall summary:\n\nS1\n\nS2"
    );
}

#[tokio::test]
async fn test_explicit_chunk_size_overrides_config() {
    let client = Arc::new(ScriptedClient::new());
    summarizer(client.clone(), 10_000)
        .summarize(&"x".repeat(25), Some(10))
        .await
        .unwrap();
    assert_eq!(client.call_count(), 4);
}

#[tokio::test]
async fn test_empty_input() {
    let client = Arc::new(ScriptedClient::new());
    let err = summarizer(client.clone(), 10).summarize("   \n\t", None).await.unwrap_err();

    assert!(matches!(err, ParleyError::EmptyInput(_)));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_chunk_failure_stops_before_combine() {
    let client = Arc::new(ScriptedClient::new().fail_when("part 2 of 3"));
    let err = summarizer(client.clone(), 5)
        .summarize(&"y".repeat(15), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ParleyError::ModelInvocation(_)));
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_summarize_in_session_records_history() {
    let client = Arc::new(ScriptedClient::new());
    let summarizer = summarizer(client.clone(), 10);
    let sessions = summarizer.sessions().clone();
    let id = sessions.create(Modality::Text, None).await.unwrap();

    summarizer
        .summarize_in_session(&id, "abcdefghijklmno", None)
        .await
        .unwrap();

    // Two chunk turns plus the combine turn
    assert_eq!(sessions.history(&id).await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_summarize_documents_keeps_going_after_failure() {
    let client = Arc::new(ScriptedClient::new());
    let processor = DocumentProcessor::new(summarizer(client.clone(), 100), Arc::new(FileTextExtractor::new()));

    let mut good = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    write!(good, "meeting notes").unwrap();
    let paths = vec![
        Path::new("slides.pptx").to_path_buf(),
        good.path().to_path_buf(),
    ];

    let results = processor.summarize_documents(&paths).await;
    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0].result,
        Err(ParleyError::Extraction("Unsupported file format: .pptx".to_string()))
    );
    assert!(results[1].result.is_ok());
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_empty_document_is_empty_input() {
    let client = Arc::new(ScriptedClient::new());
    let processor = DocumentProcessor::new(summarizer(client.clone(), 100), Arc::new(FileTextExtractor::new()));
    let empty = tempfile::Builder::new().suffix(".md").tempfile().unwrap();

    let err = processor.summarize_document(empty.path()).await.unwrap_err();
    assert!(matches!(err, ParleyError::EmptyInput(_)));
}

/// Pretends to OCR any file
struct FixedText(&'static str);

#[async_trait]
impl TextExtractor for FixedText {
    async fn extract(&self, _path: &Path) -> Result<String, ExtractionError> {
        Ok(self.0.to_string())
    }

    fn supports(&self, _path: &Path) -> bool {
        true
    }
}

fn png_file() -> tempfile::NamedTempFile {
    let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    image::DynamicImage::new_rgb8(3, 3)
        .save_with_format(file.path(), image::ImageFormat::Png)
        .unwrap();
    file
}

#[tokio::test]
async fn test_analyze_image_document_with_text() {
    let client = Arc::new(ScriptedClient::new());
    let processor = DocumentProcessor::new(summarizer(client.clone(), 100), Arc::new(FixedText("Invoice #42")));
    let sessions = processor.summarizer().sessions().clone();
    let id = sessions.create(Modality::Multimodal, None).await.unwrap();
    let file = png_file();

    let analysis = processor.analyze_image_document(&id, file.path(), true).await.unwrap();

    assert_eq!(analysis.extracted_text.as_deref(), Some("Invoice #42"));
    assert!(analysis.text_analysis.is_some());
    assert!(analysis.combined_analysis.is_some());
    assert_eq!(client.call_count(), 3);
    assert_eq!(client.requests()[0].messages[0].content().image_count(), 1);
}

#[tokio::test]
async fn test_analyze_image_document_without_extractable_text() {
    let client = Arc::new(ScriptedClient::new());
    let processor = DocumentProcessor::new(summarizer(client.clone(), 100), Arc::new(FileTextExtractor::new()));
    let sessions = processor.summarizer().sessions().clone();
    let id = sessions.create(Modality::Multimodal, None).await.unwrap();
    let file = png_file();

    let analysis = processor.analyze_image_document(&id, file.path(), true).await.unwrap();

    assert!(analysis.extracted_text.is_none());
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_analyze_image_document_requires_multimodal_session() {
    let client = Arc::new(ScriptedClient::new());
    let processor = DocumentProcessor::new(summarizer(client.clone(), 100), Arc::new(FixedText("x")));
    let sessions = processor.summarizer().sessions().clone();
    let id = sessions.create(Modality::Text, None).await.unwrap();
    let file = png_file();

    let err = processor.analyze_image_document(&id, file.path(), true).await.unwrap_err();
    assert!(matches!(err, ParleyError::Capability(_)));
    assert_eq!(client.call_count(), 0);
}
