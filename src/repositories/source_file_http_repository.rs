use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::ports::source_file_repository::{SourceFileRepository, SourceFileRepositoryError};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches uploaded documents over HTTP from their public URL
pub struct SourceFileHttpRepository {
    client: Client,
}

impl SourceFileHttpRepository {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SourceFileRepository for SourceFileHttpRepository {
    #[tracing::instrument(name = "Fetching source file", skip(self))]
    async fn get_file(&self, url: &str) -> Result<Vec<u8>, SourceFileRepositoryError> {
        let fetch_error = |message: String| SourceFileRepositoryError::Fetch {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| fetch_error(error.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|error| fetch_error(error.to_string()))?;

        info!(nb_bytes = bytes.len(), "Fetched source file");
        Ok(bytes.to_vec())
    }
}
