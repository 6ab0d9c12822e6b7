//! HTTP model service client.
//!
//! Speaks the Anthropic messages API or any OpenAI-compatible chat
//! completions API (OpenAI, Azure OpenAI, DeepSeek, local gateways). The
//! format is picked from the endpoint URL.

use std::time::Duration;

use async_trait::async_trait;
use huddle_core::config::LlmConfig;
use huddle_core::{ChatMessage, Role};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::service::ModelService;

/// API format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

impl ApiFormat {
    /// Detect API format from URL
    pub fn detect(url: &str) -> Self {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }
}

/// `ModelService` backed by a remote chat API.
pub struct HttpModelService {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    api_format: ApiFormat,
}

impl HttpModelService {
    /// Build a client from configuration.
    ///
    /// Fails when no API key is configured or in `LLM_API_KEY`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| LlmError::Config("LLM_API_KEY not set".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_format: ApiFormat::detect(&config.api_url),
        })
    }

    pub fn api_format(&self) -> ApiFormat {
        self.api_format
    }

    async fn complete_anthropic(
        &self,
        history: &[ChatMessage],
        system_directive: &str,
    ) -> Result<String, LlmError> {
        let request = anthropic_request(&self.model, self.max_tokens, history, system_directive);

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        completion
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| LlmError::EmptyResponse("no content blocks".to_string()))
    }

    async fn complete_openai(
        &self,
        history: &[ChatMessage],
        system_directive: &str,
    ) -> Result<String, LlmError> {
        let request = openai_request(&self.model, self.max_tokens, history, system_directive);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::EmptyResponse("no choices".to_string()))
    }
}

#[async_trait]
impl ModelService for HttpModelService {
    async fn complete(
        &self,
        history: &[ChatMessage],
        system_directive: &str,
    ) -> Result<String, LlmError> {
        tracing::debug!(
            messages = history.len(),
            format = ?self.api_format,
            "Model completion requested"
        );
        let reply = match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(history, system_directive).await,
            ApiFormat::OpenAI => self.complete_openai(history, system_directive).await,
        }?;
        tracing::debug!(reply_len = reply.len(), "Model completion received");
        Ok(reply)
    }
}

// Anthropic API format. System text travels outside the message list, so
// system messages found in the history are folded into it.
fn anthropic_request(
    model: &str,
    max_tokens: u32,
    history: &[ChatMessage],
    system_directive: &str,
) -> AnthropicRequest {
    let mut system_parts: Vec<&str> = Vec::new();
    if !system_directive.is_empty() {
        system_parts.push(system_directive);
    }
    let mut messages = Vec::with_capacity(history.len());
    for message in history {
        match message.role {
            Role::System => system_parts.push(&message.content),
            Role::User | Role::Assistant => messages.push(WireMessage::from(message)),
        }
    }

    AnthropicRequest {
        model: model.to_string(),
        max_tokens,
        system: system_parts.join("\n\n"),
        messages,
    }
}

// OpenAI-compatible format: the directive leads the message list.
fn openai_request(
    model: &str,
    max_tokens: u32,
    history: &[ChatMessage],
    system_directive: &str,
) -> OpenAIRequest {
    let mut messages = Vec::with_capacity(history.len() + 1);
    if !system_directive.is_empty() {
        messages.push(WireMessage {
            role: Role::System.to_string(),
            content: system_directive.to_string(),
        });
    }
    messages.extend(history.iter().map(WireMessage::from));

    OpenAIRequest {
        model: model.to_string(),
        max_tokens,
        messages,
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    system: String,
    messages: Vec<WireMessage>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<WireMessage>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.to_string(),
            content: message.content.clone(),
        }
    }
}
