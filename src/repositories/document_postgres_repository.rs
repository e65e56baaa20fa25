use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::entities::document::{Document, DocumentIngestionUpdate};
use crate::ports::document_repository::{DocumentRepository, DocumentRepositoryError};

const DOCUMENT_COLUMNS: &str = "id, folder, uploaded_date, deadline, content, page_count, \
     sentence_count, embedding, student_name, student_id, plagiarism_score, plagiarism_detected";

pub struct DocumentPostgresRepository {
    pool: PgPool,
}

impl DocumentPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for DocumentPostgresRepository {
    #[tracing::instrument(name = "Fetching document from database", skip(self))]
    async fn get_document(&self, id: Uuid) -> Result<Document, DocumentRepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE id = $1",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => document_from_row(&row),
            None => Err(DocumentRepositoryError::NotFound(id)),
        }
    }

    #[tracing::instrument(name = "Listing prior documents", skip(self))]
    async fn list_prior_documents(
        &self,
        folder: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<Document>, DocumentRepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE folder = $1 AND uploaded_date < $2",
            DOCUMENT_COLUMNS
        ))
        .bind(folder)
        .bind(before)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(document_from_row).collect()
    }

    #[tracing::instrument(name = "Updating document ingestion fields", skip(self, update))]
    async fn update_ingestion_fields(
        &self,
        id: Uuid,
        update: &DocumentIngestionUpdate,
    ) -> Result<(), DocumentRepositoryError> {
        let result = sqlx::query(
            r#"
    UPDATE documents
    SET content = $2,
        page_count = $3,
        sentence_count = $4,
        embedding = $5,
        student_name = $6,
        student_id = $7,
        plagiarism_score = $8,
        plagiarism_detected = $9
    WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.content)
        .bind(update.page_count)
        .bind(update.sentence_count)
        .bind(serde_json::json!(update.embedding))
        .bind(&update.student_name)
        .bind(&update.student_id)
        .bind(update.plagiarism_score)
        .bind(update.plagiarism_detected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DocumentRepositoryError::NotFound(id));
        }

        Ok(())
    }
}

fn document_from_row(row: &PgRow) -> Result<Document, DocumentRepositoryError> {
    Ok(Document {
        id: row.try_get("id")?,
        folder: row.try_get("folder")?,
        uploaded_date: row.try_get("uploaded_date")?,
        deadline: row.try_get("deadline")?,
        content: row.try_get("content")?,
        page_count: row.try_get("page_count")?,
        sentence_count: row.try_get("sentence_count")?,
        embedding: parse_embedding(row.try_get("embedding")?),
        student_name: row.try_get("student_name")?,
        student_id: row.try_get("student_id")?,
        plagiarism_score: row.try_get("plagiarism_score")?,
        plagiarism_detected: row.try_get("plagiarism_detected")?,
    })
}

/// A stored embedding that is not a numeric array is treated as absent,
/// so the scorer skips the record instead of failing the run
fn parse_embedding(value: Option<JsonValue>) -> Option<Vec<f32>> {
    value.and_then(|value| serde_json::from_value(value).ok())
}
