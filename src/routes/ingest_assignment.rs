use actix_web::web::{Data, Json};
use actix_web::HttpResponse;
use serde_json::Value as JsonValue;
use tracing::error;
use uuid::Uuid;

use crate::use_cases::ingest_assignment::{
    IngestAssignmentRequest, IngestAssignmentUseCase, IngestedAssignment,
};

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyData {
    pub id: Uuid,
    pub document_url: String,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestAssignmentResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    pub data: IngestAssignmentResponseData,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestAssignmentResponseData {
    pub id: Uuid,
    pub document_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentences: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plagiarism_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plagiarism_detected: Option<bool>,
}

impl IngestAssignmentResponseData {
    /// Failure responses only echo the input identifiers,
    /// never partially populated fields
    fn echo(request: &IngestAssignmentRequest) -> Self {
        Self {
            id: request.id,
            document_url: request.document_url.clone(),
            page: None,
            sentences: None,
            text: None,
            student_name: None,
            student_id: None,
            plagiarism_score: None,
            plagiarism_detected: None,
        }
    }

    fn from_ingested(request: &IngestAssignmentRequest, ingested: &IngestedAssignment) -> Self {
        Self {
            id: request.id,
            document_url: request.document_url.clone(),
            page: Some(ingested.page_count),
            sentences: Some(ingested.sentence_count),
            text: Some(ingested.full_text.clone()),
            student_name: Some(ingested.student_name.clone()),
            student_id: Some(ingested.student_id.clone()),
            plagiarism_score: Some(ingested.plagiarism_score),
            plagiarism_detected: Some(ingested.plagiarism_detected),
        }
    }
}

/// Runs the ingestion pipeline for one uploaded document
///
/// The response contract is kept stable for strict API consumers: failures
/// are reported inside the same success-shaped envelope with a descriptive
/// message, never as an error status.
#[tracing::instrument(name = "Ingest assignment handler", skip(use_case))]
pub async fn ingest_assignment(
    use_case: Data<IngestAssignmentUseCase>,
    body: Json<BodyData>,
) -> HttpResponse {
    let request = IngestAssignmentRequest {
        id: body.id,
        document_url: body.document_url.clone(),
    };

    match use_case.execute(&request).await {
        Ok(ingested) => HttpResponse::Ok().json(IngestAssignmentResponse {
            message: "Data saved successfully.".to_string(),
            result: Some(ingested.raw_metadata.clone()),
            data: IngestAssignmentResponseData::from_ingested(&request, &ingested),
        }),
        Err(error) => {
            error!(?error, "Failed to ingest assignment");

            HttpResponse::Ok().json(IngestAssignmentResponse {
                message: format!("Failed to process document and save data: {}", error),
                result: None,
                data: IngestAssignmentResponseData::echo(&request),
            })
        }
    }
}
