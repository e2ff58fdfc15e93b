// Text-generation backend: a single non-streaming chat call to Ollama.

use crate::config::Config;
use crate::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_output_tokens: 1000,
        }
    }
}

/// One-shot prompt → raw text. Failures surface as `BackendUnavailable`.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String, ApiError>;

    /// Human-readable backend identity, used in logs.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.ollama_base_url.clone(),
            model: config.ollama_model.clone(),
        })
    }

    fn endpoint_chat(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }

    fn unavailable(&self, status: impl std::fmt::Display) -> ApiError {
        ApiError::BackendUnavailable(format!(
            "Ollama API error: {}. Is Ollama running with model \"{}\"?",
            status, self.model
        ))
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String, ApiError> {
        let req = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
            options: ChatOptions {
                temperature: options.temperature,
                num_predict: options.max_output_tokens,
            },
        };

        debug!("Calling Ollama at {} (model {})", self.endpoint_chat(), self.model);

        let resp = self
            .client
            .post(self.endpoint_chat())
            .json(&req)
            .send()
            .await
            .map_err(|e| {
                error!("Ollama request failed: {}", e);
                self.unavailable(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Ollama error: {}", body);
            return Err(self.unavailable(status.as_u16()));
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| {
            error!("Ollama returned an undecodable body: {}", e);
            self.unavailable(e)
        })?;

        Ok(parsed.message.map(|m| m.content).unwrap_or_default())
    }

    fn describe(&self) -> String {
        format!("ollama {} (model {})", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatMessage>,
}
