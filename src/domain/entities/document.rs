use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A submitted assignment document
///
/// Created by the upload step (out of this service's hands) and only
/// enriched, never created or deleted, by the ingestion pipeline.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Document {
    pub id: Uuid,

    /// Grouping key: submissions are only compared for plagiarism
    /// against other documents of the same folder
    pub folder: String,

    /// Comparison is restricted to documents uploaded strictly before this one
    pub uploaded_date: DateTime<Utc>,

    pub deadline: Option<DateTime<Utc>>,

    /// Full extracted text of the submission
    pub content: Option<String>,

    pub page_count: Option<i32>,
    pub sentence_count: Option<i32>,

    /// Embedding of the full text, fixed dimensionality per deployment.
    /// Always replaced wholesale, never partially updated.
    pub embedding: Option<Vec<f32>>,

    pub student_name: Option<String>,
    pub student_id: Option<String>,

    pub plagiarism_score: Option<f32>,
    pub plagiarism_detected: Option<bool>,
}

/// Field set written back in the single persistence write
/// at the end of a successful ingestion run
#[derive(Debug, Clone)]
pub struct DocumentIngestionUpdate {
    pub content: String,
    pub page_count: i32,
    pub sentence_count: i32,
    pub embedding: Vec<f32>,
    pub student_name: String,
    pub student_id: String,
    pub plagiarism_score: f32,
    pub plagiarism_detected: bool,
}
