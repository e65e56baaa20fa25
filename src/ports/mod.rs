pub mod completions_repository;
pub mod document_repository;
pub mod embeddings_repository;
pub mod source_file_repository;
