use async_trait::async_trait;

use crate::helper::error_chain_fmt;

/// Service computing a fixed-dimension embedding vector from a text body
///
/// Treated as a pure function of its input: every ingestion run recomputes
/// the embedding for the current document, no caching.
#[async_trait]
pub trait EmbeddingsRepository: Send + Sync {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>, EmbeddingsRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum EmbeddingsRepositoryError {
    #[error("Embedding service transport error: {0}")]
    Transport(String),
    #[error("Unexpected embedding service response: {0}")]
    UnexpectedResponse(String),
}

impl std::fmt::Debug for EmbeddingsRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
