use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::document::{Document, DocumentIngestionUpdate};
use crate::helper::error_chain_fmt;

/// Access to the persisted submission documents
///
/// Assumed strongly consistent for a single record. Two concurrent runs
/// updating the same id are not coordinated: last writer wins.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn get_document(&self, id: Uuid) -> Result<Document, DocumentRepositoryError>;

    /// Prior submissions of the same folder, uploaded strictly before `before`
    async fn list_prior_documents(
        &self,
        folder: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<Document>, DocumentRepositoryError>;

    /// Writes every field populated by an ingestion run in a single update
    async fn update_ingestion_fields(
        &self,
        id: Uuid,
        update: &DocumentIngestionUpdate,
    ) -> Result<(), DocumentRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum DocumentRepositoryError {
    #[error("No document found with id {0}")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(String),
}

impl std::fmt::Debug for DocumentRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<sqlx::Error> for DocumentRepositoryError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database(error.to_string())
    }
}
