//! Scripted Provider
//!
//! An in-memory `LlmProvider` that replays a fixed sequence of outcomes and
//! records every request it receives. Used by tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::provider::LlmProvider;
use super::types::{LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig};

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Return this raw text as the response content
    Reply(String),
    /// Sleep, then return this raw text
    Delayed(Duration, String),
    /// Fail with this error
    Fail(LlmError),
}

/// A request captured by [`ScriptedProvider`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub system: Option<String>,
    pub options: LlmRequestOptions,
}

/// Provider that replays [`ScriptStep`]s in order
pub struct ScriptedProvider {
    config: ProviderConfig,
    steps: Mutex<VecDeque<ScriptStep>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            config: ProviderConfig {
                model: "scripted".to_string(),
                ..Default::default()
            },
            steps: Mutex::new(steps.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Convenience constructor for a list of plain replies
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|r| ScriptStep::Reply(r.into())))
    }

    /// Queue another step
    pub fn push(&self, step: ScriptStep) {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push_back(step);
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of steps not yet consumed
    pub fn remaining(&self) -> usize {
        self.steps.lock().map(|s| s.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
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
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                messages,
                system,
                options: request_options,
            });
        }

        let step = self
            .steps
            .lock()
            .ok()
            .and_then(|mut steps| steps.pop_front())
            .ok_or_else(|| LlmError::Other {
                message: "script exhausted".to_string(),
            })?;

        match step {
            ScriptStep::Reply(text) => Ok(LlmResponse::text(text, "scripted")),
            ScriptStep::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(LlmResponse::text(text, "scripted"))
            }
            ScriptStep::Fail(err) => Err(err),
        }
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}
