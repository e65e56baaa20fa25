use once_cell::sync::Lazy;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::domain::entities::student_metadata::StudentMetadata;
use crate::helper::error_chain_fmt;
use crate::ports::completions_repository::{CompletionsRepository, CompletionsRepositoryError};

/// Permissive extraction schema: both fields are required but deliberately
/// untyped, as the model may return an identifier as a number instead of
/// a string. Narrowing happens once, after validation.
static STUDENT_METADATA_SCHEMA: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "name": { "description": "student name" },
            "id": { "description": "10-digit student identification number" }
        },
        "required": ["name", "id"]
    })
});

const REQUIRED_FIELDS: [&str; 2] = ["name", "id"];

#[derive(thiserror::Error)]
pub enum StudentMetadataError {
    #[error("Model output does not match the student metadata schema: {0}")]
    SchemaValidation(String),
    #[error(transparent)]
    CompletionsRepositoryError(#[from] CompletionsRepositoryError),
}

impl std::fmt::Debug for StudentMetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Extracts the student name and identifier from a text excerpt,
/// typically the first page of a submission
///
/// Returns the coerced metadata together with the raw validated value,
/// which is echoed back to the caller of the ingestion pipeline.
#[tracing::instrument(
    name = "Extracting student metadata",
    skip(completions_repository, first_page_text)
)]
pub async fn extract_student_metadata(
    completions_repository: &dyn CompletionsRepository,
    first_page_text: &str,
) -> Result<(StudentMetadata, JsonValue), StudentMetadataError> {
    let prompt = format!("Extract the entities from this text: {}", first_page_text);

    let value = completions_repository
        .generate_structured(&prompt, &STUDENT_METADATA_SCHEMA)
        .await?;
    debug!(?value, "Received structured model output");

    validate_against_schema(&value)?;

    let metadata = StudentMetadata {
        name: coerce_to_string(&value["name"]),
        student_id: coerce_to_string(&value["id"]),
    };

    Ok((metadata, value))
}

/// Re-validates the model output against the permissive schema:
/// an object carrying every required key, values of any type
fn validate_against_schema(value: &JsonValue) -> Result<(), StudentMetadataError> {
    let object = value.as_object().ok_or_else(|| {
        StudentMetadataError::SchemaValidation(format!("expected an object, got `{}`", value))
    })?;

    for field in REQUIRED_FIELDS {
        if !object.contains_key(field) {
            return Err(StudentMetadataError::SchemaValidation(format!(
                "missing required field `{}`",
                field
            )));
        }
    }

    Ok(())
}

/// Total coercion to string: primitives use their display form,
/// anything non-coercible falls back to an empty string
fn coerce_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
