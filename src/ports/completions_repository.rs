use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::helper::error_chain_fmt;

/// Language-model inference service
#[async_trait]
pub trait CompletionsRepository: Send + Sync {
    /// Free-form text generation, with an optional system instruction
    async fn generate_text(
        &self,
        system: Option<&str>,
        user: &str,
    ) -> Result<String, CompletionsRepositoryError>;

    /// JSON-mode generation constrained by `schema`, at zero sampling temperature
    ///
    /// The returned value is NOT guaranteed to match the schema:
    /// callers re-validate before use.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &JsonValue,
    ) -> Result<JsonValue, CompletionsRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum CompletionsRepositoryError {
    #[error("Model service transport error: {0}")]
    Transport(String),
    #[error("Unexpected model service response: {0}")]
    UnexpectedResponse(String),
}

impl std::fmt::Debug for CompletionsRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
