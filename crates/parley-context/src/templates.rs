/// Whole-document prompt when no chunking is needed
pub const SUMMARIZE_DOCUMENT_PROMPT: &str = "Please summarize this document:";

/// Per-chunk prompt; `<index>` and `<total>` are replaced (1-based)
pub const SUMMARIZE_CHUNK_PROMPT: &str =
    "This is part <index> of <total> of a document. Please summarize this section:";

/// Second pass over the joined chunk summaries
pub const COMBINE_SUMMARIES_PROMPT: &str =
    "The following are summaries of different parts of a document. Please provide a coherent overall summary:";

pub const VISUAL_ANALYSIS_PROMPT: &str = "Analyze this document visually:";

pub const EXTRACTED_TEXT_PROMPT: &str =
    "The following text was extracted from the document image. Please analyze it:";

pub const COMBINED_ANALYSIS_PROMPT: &str = "You've analyzed this document both visually and through its text content. \
     Please provide a comprehensive analysis combining both perspectives:";

pub(crate) fn chunk_prompt(template: &str, index: usize, total: usize) -> String {
    template
        .replace("<index>", &index.to_string())
        .replace("<total>", &total.to_string())
}
