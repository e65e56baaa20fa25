pub mod generate_feedback;
pub mod health_check;
pub mod ingest_assignment;
