//! Long-document handling for Parley: bounded chunking, chunk-then-combine
//! summarization and text extraction at the document boundary.

mod chunker;
mod document;
mod extractor;
mod summarizer;
mod templates;

pub use chunker::{needs_chunking, split_chunks, DocumentChunk};
pub use document::{DocumentAnalysis, DocumentProcessor, DocumentSummary};
pub use extractor::{ExtractionError, FileTextExtractor, TextExtractor};
pub use summarizer::ChunkingSummarizer;
pub use templates::{
    COMBINED_ANALYSIS_PROMPT, COMBINE_SUMMARIES_PROMPT, EXTRACTED_TEXT_PROMPT, SUMMARIZE_CHUNK_PROMPT,
    SUMMARIZE_DOCUMENT_PROMPT, VISUAL_ANALYSIS_PROMPT,
};
