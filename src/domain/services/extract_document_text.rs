use lopdf::Document as PdfDocument;
use tracing::info;

use crate::helper::error_chain_fmt;

/// Text extracted from a paged document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocumentText {
    pub page_count: usize,
    pub sentence_count: usize,
    /// All pages concatenated, page boundaries collapsed
    pub full_text: String,
    /// Page one only, trimmed. Empty if the first page has no text content.
    pub first_page_text: String,
}

#[derive(thiserror::Error)]
pub enum ExtractDocumentTextError {
    #[error("Unable to decode document as a PDF: {0}")]
    Decode(#[from] lopdf::Error),
}

impl std::fmt::Debug for ExtractDocumentTextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Decodes a PDF and extracts its text, page by page
///
/// Only able to read text content that is not "drawn".
#[tracing::instrument(name = "Extracting document text", skip(bytes))]
pub fn extract_document_text(
    bytes: &[u8],
) -> Result<ExtractedDocumentText, ExtractDocumentTextError> {
    let document = PdfDocument::load_mem(bytes)?;
    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();

    let mut page_texts = Vec::with_capacity(page_numbers.len());
    for page_number in &page_numbers {
        page_texts.push(document.extract_text(&[*page_number])?);
    }

    let full_text = page_texts.join("\n").trim().to_string();
    let first_page_text = page_texts
        .first()
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    info!(
        page_count = page_numbers.len(),
        "Extracted text from PDF document"
    );

    Ok(ExtractedDocumentText {
        page_count: page_numbers.len(),
        sentence_count: count_sentences(&full_text),
        full_text,
        first_page_text,
    })
}

/// Heuristic sentence count: non-empty segments after splitting on
/// terminal punctuation. Not grammatical sentence detection.
pub fn count_sentences(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|segment| !segment.trim().is_empty())
        .count()
}
