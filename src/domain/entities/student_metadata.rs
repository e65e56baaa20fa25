/// Structured fields extracted from the first page of a submission
///
/// Both fields are coerced to strings after extraction: the model output
/// is not guaranteed to be a primitive string (an identifier is often
/// returned as a number).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StudentMetadata {
    pub name: String,
    pub student_id: String,
}
