use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::configuration::EmbeddingSettings;
use crate::ports::embeddings_repository::{EmbeddingsRepository, EmbeddingsRepositoryError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Embedding service adapter targeting the Pinecone inference API
pub struct EmbeddingPineconeRepository {
    client: Client,
    endpoint: String,
    api_key: Secret<String>,
    model: String,
    dimension: usize,
}

impl EmbeddingPineconeRepository {
    pub fn new(settings: &EmbeddingSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            dimension: settings.dimension,
        })
    }
}

#[async_trait]
impl EmbeddingsRepository for EmbeddingPineconeRepository {
    #[tracing::instrument(name = "Embedding document text", skip(self, text))]
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>, EmbeddingsRepositoryError> {
        let body = EmbedRequest {
            model: &self.model,
            inputs: vec![EmbedInput { text }],
            parameters: EmbedParameters {
                input_type: "passage",
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Api-Key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|error| EmbeddingsRepositoryError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingsRepositoryError::Transport(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|error| EmbeddingsRepositoryError::UnexpectedResponse(error.to_string()))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|data| data.values)
            .ok_or_else(|| {
                EmbeddingsRepositoryError::UnexpectedResponse(
                    "no embedding in service response".to_string(),
                )
            })?;

        if embedding.len() != self.dimension {
            return Err(EmbeddingsRepositoryError::UnexpectedResponse(format!(
                "expected a {}-dimension vector, got {}",
                self.dimension,
                embedding.len()
            )));
        }

        info!(dimension = embedding.len(), "Computed document embedding");
        Ok(embedding)
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    inputs: Vec<EmbedInput<'a>>,
    parameters: EmbedParameters,
}

#[derive(Serialize)]
struct EmbedInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct EmbedParameters {
    input_type: &'static str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    values: Vec<f32>,
}
