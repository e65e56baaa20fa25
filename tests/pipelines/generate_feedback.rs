use std::sync::atomic::Ordering;
use std::sync::Arc;

use claims::{assert_err, assert_ok};
use fake::faker::lorem::en::Paragraph;
use fake::Fake;

use assignment_ingestion_service::domain::entities::feedback::{
    FeedbackRequest, FeedbackRequestError,
};
use assignment_ingestion_service::use_cases::generate_feedback::{
    GenerateFeedbackError, GenerateFeedbackUseCase,
};

use crate::helpers::FakeCompletionsRepository;

fn feedback_request() -> FeedbackRequest {
    FeedbackRequest {
        assignment_name: "Essay 1".to_string(),
        description: "Write about X".to_string(),
        content: Paragraph(1..3).fake(),
        personalization: String::new(),
    }
}

#[tokio::test]
async fn a_request_missing_description_fails_before_any_model_call() {
    let completions_repository = Arc::new(FakeCompletionsRepository::new());
    let use_case = GenerateFeedbackUseCase::new(completions_repository.clone());

    let mut request = feedback_request();
    request.description = String::new();

    let error = assert_err!(use_case.execute(&request).await);

    assert!(matches!(
        error,
        GenerateFeedbackError::ValidationError(FeedbackRequestError::MissingFields(ref fields))
            if fields == &vec!["description".to_string()]
    ));
    assert_eq!(completions_repository.text_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn a_complete_request_runs_all_three_stages_and_returns_a_report() {
    let completions_repository = Arc::new(FakeCompletionsRepository::new());
    let use_case = GenerateFeedbackUseCase::new(completions_repository.clone());

    let report = assert_ok!(use_case.execute(&feedback_request()).await);

    assert!(!report.analysis.is_empty());
    assert!(!report.summary.is_empty());
    assert!(!report.final_evaluation.is_empty());
    assert_eq!(report.metadata.task_name, "Essay 1");
    assert_eq!(report.metadata.description, "Write about X");
    assert_eq!(completions_repository.text_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn a_first_stage_failure_fails_the_whole_orchestration() {
    let completions_repository = Arc::new(FakeCompletionsRepository::failing_text_generation());
    let use_case = GenerateFeedbackUseCase::new(completions_repository.clone());

    let error = assert_err!(use_case.execute(&feedback_request()).await);

    assert!(matches!(
        error,
        GenerateFeedbackError::CompletionsRepositoryError(_)
    ));
    // The dependent final stage is never reached
    assert!(completions_repository.text_calls.load(Ordering::SeqCst) <= 2);
}
