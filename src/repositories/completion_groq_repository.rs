use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::configuration::LlmSettings;
use crate::ports::completions_repository::{CompletionsRepository, CompletionsRepositoryError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat-completions client targeting the Groq OpenAI-compatible API
///
/// Retries transient transport failures up to `max_retries` times.
/// The orchestrators never retry on top of this.
pub struct CompletionGroqRepository {
    client: Client,
    endpoint: String,
    api_key: Secret<String>,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl CompletionGroqRepository {
    pub fn new(settings: &LlmSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_retries: settings.max_retries,
        })
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        json_mode: bool,
    ) -> Result<String, CompletionsRepositoryError> {
        let mut attempt = 0;
        loop {
            match self.try_chat(messages, temperature, json_mode).await {
                Ok(content) => return Ok(content),
                Err(error @ CompletionsRepositoryError::Transport(_))
                    if attempt < self.max_retries =>
                {
                    attempt += 1;
                    warn!(?error, attempt, "Retrying model call after transient failure");
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn try_chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        json_mode: bool,
    ) -> Result<String, CompletionsRepositoryError> {
        let body = ChatRequest {
            model: &self.model,
            temperature,
            messages,
            response_format: json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|error| CompletionsRepositoryError::Transport(error.to_string()))?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionsRepositoryError::Transport(format!(
                "status {}: {}",
                status, body
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionsRepositoryError::UnexpectedResponse(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|error| CompletionsRepositoryError::UnexpectedResponse(error.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                CompletionsRepositoryError::UnexpectedResponse(
                    "no choices in model response".to_string(),
                )
            })
    }
}

#[async_trait]
impl CompletionsRepository for CompletionGroqRepository {
    #[tracing::instrument(name = "Generating text completion", skip(self, system, user))]
    async fn generate_text(
        &self,
        system: Option<&str>,
        user: &str,
    ) -> Result<String, CompletionsRepositoryError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user.to_string(),
        });

        self.chat(&messages, self.temperature, false).await
    }

    #[tracing::instrument(name = "Generating structured completion", skip(self, prompt, schema))]
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &JsonValue,
    ) -> Result<JsonValue, CompletionsRepositoryError> {
        let messages = [
            ChatMessage {
                role: "system",
                content: format!(
                    "Reply with a single JSON object matching this JSON schema, \
                     and nothing else: {}",
                    schema
                ),
            },
            ChatMessage {
                role: "user",
                content: prompt.to_string(),
            },
        ];

        // Extraction runs deterministic: temperature 0
        let content = self.chat(&messages, 0.0, true).await?;

        serde_json::from_str(&content)
            .map_err(|error| CompletionsRepositoryError::UnexpectedResponse(error.to_string()))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}
