use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::entities::feedback::{
    FeedbackMetadata, FeedbackReport, FeedbackRequest, FeedbackRequestError,
};
use crate::helper::error_chain_fmt;
use crate::ports::completions_repository::{CompletionsRepository, CompletionsRepositoryError};

/// Ordinal suitability levels the analysis stage must pick from
const SUITABILITY_LEVELS: &str = "very low, low, medium, high, relevant";

const SUMMARIZER_SYSTEM_PROMPT: &str = "\
You are a summarizer agent for academic assignments.
Focus on:
- the main purpose of the task
- the key steps
- the expected outcome
- the grading criteria, if any are given
Reply with the core summary of the task only.";

fn final_evaluation_system_prompt(personalization: &str) -> String {
    format!(
        "You are the orchestrating lecturer, integrating the results of the \
         analysis agent and the summarizer agent into comprehensive feedback.\n\
         Work in a Socratic style: ask guiding questions, cite only verbatim \
         excerpts from the submission as evidence, and never supply direct \
         answers.\n\
         Personalization: {}",
        personalization.trim()
    )
}

/// Orchestrates the three-stage feedback pipeline: a suitability analysis
/// and a summary running concurrently, then a dependent final evaluation
/// synthesizing both.
///
/// Any model failure in any stage fails the whole orchestration:
/// no partial report is ever returned.
pub struct GenerateFeedbackUseCase {
    completions_repository: Arc<dyn CompletionsRepository>,
}

impl GenerateFeedbackUseCase {
    pub fn new(completions_repository: Arc<dyn CompletionsRepository>) -> Self {
        Self {
            completions_repository,
        }
    }

    #[tracing::instrument(name = "Generating feedback", skip(self, request), fields(task_name = %request.assignment_name))]
    pub async fn execute(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackReport, GenerateFeedbackError> {
        // Validated before any model call is dispatched
        request.validate()?;

        let task = request.task_representation();

        let analysis_prompt = format!(
            "Rate how well the following assignment matches academic criteria. \
             Pick one of: {}.\n\nAssignment: {}",
            SUITABILITY_LEVELS, task
        );

        // Fan-out: the two first-stage calls are independent of each other.
        // Joining propagates the first failure and drops the sibling call.
        let analysis_future = self.completions_repository.generate_text(None, &analysis_prompt);
        let summary_future = self
            .completions_repository
            .generate_text(Some(SUMMARIZER_SYSTEM_PROMPT), &task);
        let (analysis, summary) = futures::try_join!(analysis_future, summary_future)?;
        info!("Completed the analysis and summary stages");

        let final_user_content = format!(
            "Task:\n{}\n\nSummary:\n{}\n\nSuitability:\n{}\n\n\
             Give the final evaluation and recommendations.",
            task, summary, analysis
        );
        let final_evaluation = self
            .completions_repository
            .generate_text(
                Some(&final_evaluation_system_prompt(&request.personalization)),
                &final_user_content,
            )
            .await?;
        info!("Completed the final evaluation stage");

        Ok(FeedbackReport {
            analysis,
            summary,
            final_evaluation,
            metadata: FeedbackMetadata {
                task_name: request.assignment_name.clone(),
                description: request.description.clone(),
                content: request.content.clone(),
                timestamp: Utc::now(),
            },
        })
    }
}

#[derive(thiserror::Error)]
pub enum GenerateFeedbackError {
    #[error(transparent)]
    ValidationError(#[from] FeedbackRequestError),
    #[error(transparent)]
    CompletionsRepositoryError(#[from] CompletionsRepositoryError),
}

impl std::fmt::Debug for GenerateFeedbackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
