use actix_web::http::StatusCode;
use actix_web::web::{Data, Json};
use actix_web::{HttpResponse, ResponseError};

use crate::domain::entities::feedback::{FeedbackReport, FeedbackRequest};
use crate::helper::error_chain_fmt;
use crate::use_cases::generate_feedback::{GenerateFeedbackError, GenerateFeedbackUseCase};

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyData {
    pub assignment_name: String,
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub personalization: String,
}

#[derive(Debug, serde::Serialize)]
pub struct GenerateFeedbackResponse {
    pub success: bool,
    pub data: FeedbackReport,
}

/// Runs the three-stage feedback orchestration for one submission
///
/// Unlike the ingestion route, failures are surfaced with explicit status
/// classes: 400 for request validation, 500 for anything else.
#[tracing::instrument(name = "Generate feedback handler", skip(use_case, body), fields(task_name = %body.assignment_name))]
pub async fn generate_feedback(
    use_case: Data<GenerateFeedbackUseCase>,
    body: Json<BodyData>,
) -> Result<HttpResponse, GenerateFeedbackResponseError> {
    let request = FeedbackRequest {
        assignment_name: body.assignment_name.clone(),
        description: body.description.clone(),
        content: body.content.clone(),
        personalization: body.personalization.clone(),
    };

    let report = use_case.execute(&request).await?;

    Ok(HttpResponse::Ok().json(GenerateFeedbackResponse {
        success: true,
        data: report,
    }))
}

#[derive(thiserror::Error)]
pub enum GenerateFeedbackResponseError {
    #[error(transparent)]
    GenerateFeedbackError(#[from] GenerateFeedbackError),
}

impl std::fmt::Debug for GenerateFeedbackResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for GenerateFeedbackResponseError {
    fn status_code(&self) -> StatusCode {
        match self {
            GenerateFeedbackResponseError::GenerateFeedbackError(
                GenerateFeedbackError::ValidationError(_),
            ) => StatusCode::BAD_REQUEST,
            GenerateFeedbackResponseError::GenerateFeedbackError(
                GenerateFeedbackError::CompletionsRepositoryError(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
        }))
    }
}
