//! OpenAI-Compatible Provider
//!
//! Implementation of the LlmProvider trait for the OpenAI chat-completions
//! API and endpoints that mirror it (DeepSeek, Ollama's `/v1` surface).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::provider::{missing_api_key_error, parse_http_error, LlmProvider};
use super::types::{
    LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig, ProviderType,
    StopReason, UsageStats,
};
use crate::http_client::build_http_client;

/// OpenAI-compatible chat-completions provider
pub struct OpenAIProvider {
    config: ProviderConfig,
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl OpenAIProvider {
    /// Create a new provider with the given configuration and an optional
    /// client-side request deadline
    pub fn new(config: ProviderConfig, timeout: Option<Duration>) -> LlmResult<Self> {
        let client = build_http_client(timeout)?;
        Ok(Self {
            config,
            client,
            timeout,
        })
    }

    /// Create a provider around an existing HTTP client
    pub fn with_client(config: ProviderConfig, client: reqwest::Client) -> Self {
        Self {
            config,
            client,
            timeout: None,
        }
    }

    /// Build the request body for the API
    fn build_request_body(
        &self,
        messages: &[Message],
        system: Option<&str>,
        request_options: &LlmRequestOptions,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": request_options
                .temperature_override
                .unwrap_or(self.config.temperature),
            "stream": false,
        });

        let mut wire_messages: Vec<serde_json::Value> = Vec::with_capacity(messages.len() + 1);
        if let Some(sys) = system {
            wire_messages.push(serde_json::json!({
                "role": "system",
                "content": sys
            }));
        }
        wire_messages.extend(messages.iter().map(Self::message_to_openai));
        body["messages"] = serde_json::json!(wire_messages);

        if request_options.json_response {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        body
    }

    /// Convert a Message to OpenAI API format
    fn message_to_openai(message: &Message) -> serde_json::Value {
        serde_json::json!({
            "role": message.role.as_str(),
            "content": message.content,
        })
    }

    /// Convert the wire response into an LlmResponse
    fn parse_response(&self, response: OpenAIResponse) -> LlmResponse {
        let choice = response.choices.into_iter().next();

        let stop_reason = choice
            .as_ref()
            .and_then(|c| c.finish_reason.as_deref())
            .map(StopReason::from)
            .unwrap_or(StopReason::EndTurn);
        let content = choice.and_then(|c| c.message).and_then(|m| m.content);

        let usage = response
            .usage
            .map(|u| UsageStats {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        LlmResponse {
            content,
            stop_reason,
            usage,
            model: response.model,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        match self.config.provider {
            ProviderType::OpenAI => "openai",
            ProviderType::DeepSeek => "deepseek",
            ProviderType::Ollama => "ollama",
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let api_key = match (&self.config.api_key, self.config.provider.requires_api_key()) {
            (Some(key), _) => Some(key.as_str()),
            (None, false) => None,
            (None, true) => return Err(missing_api_key_error(self.name())),
        };

        let body = self.build_request_body(&messages, system.as_deref(), &request_options);
        debug!(
            provider = self.name(),
            model = %self.config.model,
            message_count = messages.len(),
            "sending chat completion"
        );

        let mut request = self
            .client
            .post(self.config.endpoint())
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout {
                    seconds: self.timeout.map(|t| t.as_secs()).unwrap_or_default(),
                }
            } else {
                LlmError::NetworkError {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, self.name()));
        }

        let wire: OpenAIResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(self.parse_response(wire))
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<ResponseUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
