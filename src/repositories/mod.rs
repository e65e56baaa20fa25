pub mod completion_groq_repository;
pub mod document_postgres_repository;
pub mod embedding_pinecone_repository;
pub mod source_file_http_repository;
