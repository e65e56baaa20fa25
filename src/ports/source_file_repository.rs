use async_trait::async_trait;

use crate::helper::error_chain_fmt;

/// Retrieval of the raw bytes of an uploaded document
#[async_trait]
pub trait SourceFileRepository: Send + Sync {
    async fn get_file(&self, url: &str) -> Result<Vec<u8>, SourceFileRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum SourceFileRepositoryError {
    #[error("Unable to fetch document from {url}: {message}")]
    Fetch { url: String, message: String },
}

impl std::fmt::Debug for SourceFileRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
