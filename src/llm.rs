// src/llm.rs
//! Language-model boundary. The rest of the crate only sees `CompletionClient`.

use crate::core::ServiceClient;
use crate::environment::{ApiKeys, EnvironmentConfig};
use crate::error::{PitchError, PitchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

const SERVICE_NAME: &str = "OpenAI";

/// Single-prompt text completion
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str, temperature: f32) -> PitchResult<String>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiClient {
    service: ServiceClient,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, model: String, timeout_seconds: u64) -> PitchResult<Self> {
        Ok(Self {
            service: ServiceClient::new(SERVICE_NAME, timeout_seconds)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub fn from_config(config: &EnvironmentConfig, keys: &ApiKeys) -> PitchResult<Self> {
        Self::new(
            keys.openai()?.to_string(),
            config.openai_base_url.clone(),
            config.model.clone(),
            config.timeout_seconds,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> PitchResult<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        info!("Sending completion request to {} ({})", SERVICE_NAME, self.model);

        let builder = self
            .service
            .http()
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request);

        let response: ChatCompletionResponse = self.service.send_json(builder).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| PitchError::upstream(SERVICE_NAME, None, "Response contained no choices"))
    }
}
