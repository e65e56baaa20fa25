pub mod extract_document_text;
pub mod extract_student_metadata;
pub mod plagiarism;
