use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::document::DocumentIngestionUpdate;
use crate::domain::services::extract_document_text::{
    extract_document_text, ExtractDocumentTextError,
};
use crate::domain::services::extract_student_metadata::{
    extract_student_metadata, StudentMetadataError,
};
use crate::domain::services::plagiarism::PlagiarismScorer;
use crate::helper::error_chain_fmt;
use crate::ports::completions_repository::CompletionsRepository;
use crate::ports::document_repository::{DocumentRepository, DocumentRepositoryError};
use crate::ports::embeddings_repository::{EmbeddingsRepository, EmbeddingsRepositoryError};
use crate::ports::source_file_repository::{SourceFileRepository, SourceFileRepositoryError};

#[derive(Debug, Clone)]
pub struct IngestAssignmentRequest {
    pub id: Uuid,
    pub document_url: String,
}

/// Fields populated on the document record by a successful run
#[derive(Debug, Clone)]
pub struct IngestedAssignment {
    pub page_count: usize,
    pub sentence_count: usize,
    pub full_text: String,
    pub student_name: String,
    pub student_id: String,
    pub plagiarism_score: f32,
    pub plagiarism_detected: bool,
    /// Raw structured metadata value, echoed back to the caller
    pub raw_metadata: JsonValue,
}

/// Orchestrates the ingestion pipeline for one uploaded submission:
/// fetch record, extract text, extract metadata, embed, score against
/// prior submissions of the same folder, persist.
///
/// Sole error boundary of the pipeline: no write happens before the final
/// step, so any earlier failure leaves the record untouched.
pub struct IngestAssignmentUseCase {
    document_repository: Arc<dyn DocumentRepository>,
    source_file_repository: Arc<dyn SourceFileRepository>,
    embeddings_repository: Arc<dyn EmbeddingsRepository>,
    completions_repository: Arc<dyn CompletionsRepository>,
    plagiarism_scorer: PlagiarismScorer,
}

impl IngestAssignmentUseCase {
    pub fn new(
        document_repository: Arc<dyn DocumentRepository>,
        source_file_repository: Arc<dyn SourceFileRepository>,
        embeddings_repository: Arc<dyn EmbeddingsRepository>,
        completions_repository: Arc<dyn CompletionsRepository>,
        plagiarism_scorer: PlagiarismScorer,
    ) -> Self {
        Self {
            document_repository,
            source_file_repository,
            embeddings_repository,
            completions_repository,
            plagiarism_scorer,
        }
    }

    #[tracing::instrument(name = "Ingesting assignment", skip(self))]
    pub async fn execute(
        &self,
        request: &IngestAssignmentRequest,
    ) -> Result<IngestedAssignment, IngestAssignmentError> {
        let document = self.document_repository.get_document(request.id).await?;
        let prior_documents = self
            .document_repository
            .list_prior_documents(&document.folder, document.uploaded_date)
            .await?;
        info!(
            folder = %document.folder,
            nb_priors = prior_documents.len(),
            "Loaded document and its prior submissions"
        );

        let file = self
            .source_file_repository
            .get_file(&request.document_url)
            .await?;
        let extracted = extract_document_text(&file)?;

        // Metadata extraction and embedding have no data dependency on each
        // other: fan-out, then join. The first failure propagates and the
        // sibling future is dropped.
        let metadata_future = async {
            extract_student_metadata(
                self.completions_repository.as_ref(),
                &extracted.first_page_text,
            )
            .await
            .map_err(IngestAssignmentError::from)
        };
        let embedding_future = async {
            self.embeddings_repository
                .embed_document(&extracted.full_text)
                .await
                .map_err(IngestAssignmentError::from)
        };
        let ((student_metadata, raw_metadata), embedding) =
            futures::try_join!(metadata_future, embedding_future)?;

        let assessment = self
            .plagiarism_scorer
            .assess(&embedding, &prior_documents);
        info!(
            score = assessment.score,
            detected = assessment.detected,
            nb_matches = assessment.matches.len(),
            "Assessed plagiarism against prior submissions"
        );

        let update = DocumentIngestionUpdate {
            content: extracted.full_text.clone(),
            page_count: extracted.page_count as i32,
            sentence_count: extracted.sentence_count as i32,
            embedding,
            student_name: student_metadata.name.clone(),
            student_id: student_metadata.student_id.clone(),
            plagiarism_score: assessment.score,
            plagiarism_detected: assessment.detected,
        };
        self.document_repository
            .update_ingestion_fields(document.id, &update)
            .await?;

        Ok(IngestedAssignment {
            page_count: extracted.page_count,
            sentence_count: extracted.sentence_count,
            full_text: extracted.full_text,
            student_name: student_metadata.name,
            student_id: student_metadata.student_id,
            plagiarism_score: assessment.score,
            plagiarism_detected: assessment.detected,
            raw_metadata,
        })
    }
}

#[derive(thiserror::Error)]
pub enum IngestAssignmentError {
    #[error(transparent)]
    DocumentRepositoryError(#[from] DocumentRepositoryError),
    #[error(transparent)]
    SourceFileRepositoryError(#[from] SourceFileRepositoryError),
    #[error(transparent)]
    ExtractDocumentTextError(#[from] ExtractDocumentTextError),
    #[error(transparent)]
    StudentMetadataError(#[from] StudentMetadataError),
    #[error(transparent)]
    EmbeddingsRepositoryError(#[from] EmbeddingsRepositoryError),
}

impl std::fmt::Debug for IngestAssignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
