use chrono::{DateTime, Utc};

use crate::helper::error_chain_fmt;

/// A request for AI feedback on one assignment submission
///
/// Ephemeral and request-scoped: nothing about it is persisted.
#[derive(Debug, Clone)]
pub struct FeedbackRequest {
    pub assignment_name: String,
    pub description: String,
    pub content: String,
    /// Free-text directive shaping the tone and style of the final feedback.
    /// Empty when the caller did not provide one.
    pub personalization: String,
}

impl FeedbackRequest {
    /// Checks the required fields, before any model call is dispatched
    pub fn validate(&self) -> Result<(), FeedbackRequestError> {
        let mut missing = Vec::new();

        if self.assignment_name.trim().is_empty() {
            missing.push("assignmentName".to_string());
        }
        if self.description.trim().is_empty() {
            missing.push("description".to_string());
        }
        if self.content.trim().is_empty() {
            missing.push("content".to_string());
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FeedbackRequestError::MissingFields(missing))
        }
    }

    /// Single joined representation of the task, handed to every model call
    pub fn task_representation(&self) -> String {
        format!(
            "Task name: {}\nDescription: {}\nSubmission: {}",
            self.assignment_name, self.description, self.content
        )
    }
}

#[derive(thiserror::Error)]
pub enum FeedbackRequestError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

impl std::fmt::Debug for FeedbackRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// The three generated artifacts plus their metadata stamp,
/// returned directly to the caller
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReport {
    pub analysis: String,
    pub summary: String,
    pub final_evaluation: String,
    pub metadata: FeedbackMetadata,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackMetadata {
    pub task_name: String,
    pub description: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}
