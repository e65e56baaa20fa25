use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::Server;
use actix_web::web::{self, Data};
use actix_web::{App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::configuration::{DatabaseSettings, Settings};
use crate::domain::services::plagiarism::PlagiarismScorer;
use crate::repositories::completion_groq_repository::CompletionGroqRepository;
use crate::repositories::document_postgres_repository::DocumentPostgresRepository;
use crate::repositories::embedding_pinecone_repository::EmbeddingPineconeRepository;
use crate::repositories::source_file_http_repository::SourceFileHttpRepository;
use crate::routes::generate_feedback::generate_feedback;
use crate::routes::health_check::health_check;
use crate::routes::ingest_assignment::ingest_assignment;
use crate::use_cases::generate_feedback::GenerateFeedbackUseCase;
use crate::use_cases::ingest_assignment::IngestAssignmentUseCase;

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationBuildError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Failed to build an HTTP client: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

impl Application {
    /// # Parameters
    /// - nb_workers: number of actix-web workers
    ///   if `None`, the number of available physical CPUs is used as the worker count.
    #[tracing::instrument(name = "Building application", skip(settings))]
    pub async fn build(
        settings: Settings,
        nb_workers: Option<usize>,
    ) -> Result<Self, ApplicationBuildError> {
        let connection_pool = get_connection_pool(&settings.database);

        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let document_repository = Arc::new(DocumentPostgresRepository::new(connection_pool));
        let source_file_repository = Arc::new(SourceFileHttpRepository::new()?);
        let embeddings_repository =
            Arc::new(EmbeddingPineconeRepository::new(&settings.embedding)?);
        let completions_repository: Arc<CompletionGroqRepository> =
            Arc::new(CompletionGroqRepository::new(&settings.llm)?);

        let ingest_assignment_use_case = IngestAssignmentUseCase::new(
            document_repository,
            source_file_repository,
            embeddings_repository,
            completions_repository.clone(),
            PlagiarismScorer::new(settings.plagiarism.threshold),
        );
        let generate_feedback_use_case = GenerateFeedbackUseCase::new(completions_repository);

        let server = run(
            listener,
            nb_workers,
            ingest_assignment_use_case,
            generate_feedback_use_case,
        )?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        self.server.await
    }
}

/// listener: the consumer binds their own port
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
pub fn run(
    listener: TcpListener,
    nb_workers: Option<usize>,
    ingest_assignment_use_case: IngestAssignmentUseCase,
    generate_feedback_use_case: GenerateFeedbackUseCase,
) -> Result<Server, std::io::Error> {
    // Wraps the use cases in `actix_web::Data` (`Arc`) to register them
    // and access them from handlers. Shared among all workers.
    let ingest_assignment_use_case = Data::new(ingest_assignment_use_case);
    let generate_feedback_use_case = Data::new(generate_feedback_use_case);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/assignment", web::post().to(ingest_assignment))
            .route("/feedback", web::post().to(generate_feedback))
            .app_data(ingest_assignment_use_case.clone())
            .app_data(generate_feedback_use_case.clone())
    })
    .listen(listener)?;

    // If no workers were set, use the actix-web default (number of physical CPUs)
    if let Some(nb_workers) = nb_workers {
        return Ok(server.workers(nb_workers).run());
    }

    Ok(server.run())
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(settings.with_db())
}
