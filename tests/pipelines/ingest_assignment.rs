use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::{Duration, Utc};
use claims::{assert_err, assert_ok};

use assignment_ingestion_service::domain::services::extract_document_text::extract_document_text;
use assignment_ingestion_service::domain::services::plagiarism::PlagiarismScorer;
use assignment_ingestion_service::ports::document_repository::DocumentRepositoryError;
use assignment_ingestion_service::use_cases::ingest_assignment::{
    IngestAssignmentError, IngestAssignmentRequest, IngestAssignmentUseCase,
};
use uuid::Uuid;

use crate::helpers::{
    document, fake_embedding, pdf_with_text, FakeCompletionsRepository, FakeEmbeddingsRepository,
    FakeSourceFileRepository, InMemoryDocumentRepository,
};

fn use_case_with(
    document_repository: Arc<InMemoryDocumentRepository>,
    source_file_repository: Arc<FakeSourceFileRepository>,
    embeddings_repository: Arc<FakeEmbeddingsRepository>,
    completions_repository: Arc<FakeCompletionsRepository>,
) -> IngestAssignmentUseCase {
    IngestAssignmentUseCase::new(
        document_repository,
        source_file_repository,
        embeddings_repository,
        completions_repository,
        PlagiarismScorer::new(0.5),
    )
}

#[tokio::test]
async fn a_missing_document_id_fails_with_not_found_and_writes_nothing() {
    let document_repository = Arc::new(InMemoryDocumentRepository::new(vec![]));
    let embeddings_repository = Arc::new(FakeEmbeddingsRepository::new());
    let use_case = use_case_with(
        document_repository.clone(),
        Arc::new(FakeSourceFileRepository::new(pdf_with_text("Hello."))),
        embeddings_repository.clone(),
        Arc::new(FakeCompletionsRepository::new()),
    );

    let request = IngestAssignmentRequest {
        id: Uuid::new_v4(),
        document_url: "https://example.com/file.pdf".to_string(),
    };
    let error = assert_err!(use_case.execute(&request).await);

    assert!(matches!(
        error,
        IngestAssignmentError::DocumentRepositoryError(DocumentRepositoryError::NotFound(_))
    ));
    assert!(document_repository.updates().is_empty());
    assert_eq!(embeddings_repository.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn a_successful_run_persists_every_field_in_a_single_write() {
    let current = document("folder-f", Utc::now(), None);
    let document_repository = Arc::new(InMemoryDocumentRepository::new(vec![current.clone()]));
    let use_case = use_case_with(
        document_repository.clone(),
        Arc::new(FakeSourceFileRepository::new(pdf_with_text("Hello world."))),
        Arc::new(FakeEmbeddingsRepository::new()),
        Arc::new(FakeCompletionsRepository::new()),
    );

    let request = IngestAssignmentRequest {
        id: current.id,
        document_url: "https://example.com/file.pdf".to_string(),
    };
    let ingested = assert_ok!(use_case.execute(&request).await);

    assert_eq!(ingested.page_count, 1);
    assert_eq!(ingested.sentence_count, 1);
    assert!(ingested.full_text.contains("Hello world"));
    // The identifier was returned by the model as a number and coerced
    assert_eq!(ingested.student_name, "Alex Doe");
    assert_eq!(ingested.student_id, "1234567890");
    assert_eq!(ingested.plagiarism_score, 0.0);
    assert!(!ingested.plagiarism_detected);

    let updates = document_repository.updates();
    assert_eq!(updates.len(), 1);
    let (updated_id, update) = &updates[0];
    assert_eq!(*updated_id, current.id);
    assert_eq!(update.page_count, 1);
    assert_eq!(update.student_name, "Alex Doe");
    assert_eq!(update.student_id, "1234567890");
    assert!(!update.embedding.is_empty());
    assert!(!update.plagiarism_detected);
}

#[tokio::test]
async fn resubmitting_identical_text_in_the_same_folder_is_flagged() {
    let bytes = pdf_with_text("Hello world");
    // The prior submission carries the embedding of the exact same text
    let extracted = extract_document_text(&bytes).unwrap();
    let prior = document(
        "folder-f",
        Utc::now() - Duration::hours(2),
        Some(fake_embedding(&extracted.full_text)),
    );
    let current = document("folder-f", Utc::now(), None);

    let document_repository = Arc::new(InMemoryDocumentRepository::new(vec![
        prior.clone(),
        current.clone(),
    ]));
    let use_case = use_case_with(
        document_repository.clone(),
        Arc::new(FakeSourceFileRepository::new(bytes)),
        Arc::new(FakeEmbeddingsRepository::new()),
        Arc::new(FakeCompletionsRepository::new()),
    );

    let request = IngestAssignmentRequest {
        id: current.id,
        document_url: "https://example.com/file.pdf".to_string(),
    };
    let ingested = assert_ok!(use_case.execute(&request).await);

    assert!(ingested.plagiarism_score > 0.99);
    assert!(ingested.plagiarism_detected);

    let updates = document_repository.updates();
    assert_eq!(updates.len(), 1);
    assert!(updates[0].1.plagiarism_detected);
}

#[tokio::test]
async fn a_prior_submission_from_another_folder_is_not_compared() {
    let bytes = pdf_with_text("Hello world");
    let extracted = extract_document_text(&bytes).unwrap();
    // Identical text, but in a different folder
    let prior = document(
        "folder-other",
        Utc::now() - Duration::hours(2),
        Some(fake_embedding(&extracted.full_text)),
    );
    let current = document("folder-f", Utc::now(), None);

    let document_repository = Arc::new(InMemoryDocumentRepository::new(vec![
        prior,
        current.clone(),
    ]));
    let use_case = use_case_with(
        document_repository.clone(),
        Arc::new(FakeSourceFileRepository::new(bytes)),
        Arc::new(FakeEmbeddingsRepository::new()),
        Arc::new(FakeCompletionsRepository::new()),
    );

    let request = IngestAssignmentRequest {
        id: current.id,
        document_url: "https://example.com/file.pdf".to_string(),
    };
    let ingested = assert_ok!(use_case.execute(&request).await);

    assert_eq!(ingested.plagiarism_score, 0.0);
    assert!(!ingested.plagiarism_detected);
}

#[tokio::test]
async fn a_failing_metadata_extraction_leaves_the_record_untouched() {
    let current = document("folder-f", Utc::now(), None);
    let document_repository = Arc::new(InMemoryDocumentRepository::new(vec![current.clone()]));
    // A structured response missing `id` fails schema re-validation
    let completions_repository = Arc::new(FakeCompletionsRepository {
        structured_response: serde_json::json!({ "name": "Alex Doe" }),
        ..FakeCompletionsRepository::new()
    });

    let use_case = use_case_with(
        document_repository.clone(),
        Arc::new(FakeSourceFileRepository::new(pdf_with_text("Hello."))),
        Arc::new(FakeEmbeddingsRepository::new()),
        completions_repository,
    );

    let request = IngestAssignmentRequest {
        id: current.id,
        document_url: "https://example.com/file.pdf".to_string(),
    };
    let error = assert_err!(use_case.execute(&request).await);

    assert!(matches!(error, IngestAssignmentError::StudentMetadataError(_)));
    assert!(document_repository.updates().is_empty());
}
