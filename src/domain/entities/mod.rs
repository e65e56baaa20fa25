pub mod document;
pub mod feedback;
pub mod student_metadata;
