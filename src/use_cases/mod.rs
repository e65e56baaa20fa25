pub mod generate_feedback;
pub mod ingest_assignment;
