mod generate_feedback;
mod helpers;
mod ingest_assignment;
