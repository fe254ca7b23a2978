//! Form Copilot LLM
//!
//! Provides a unified interface for the text-generation collaborator:
//! - `LlmProvider` trait
//! - OpenAI-compatible chat-completions provider (OpenAI, DeepSeek, Ollama)
//! - Scripted in-memory provider for tests (`test-util` feature)
//! - HTTP client factory

pub mod http_client;
pub mod openai;
pub mod provider;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
#[cfg(any(test, feature = "test-util"))]
pub use scripted::{RecordedRequest, ScriptStep, ScriptedProvider};
pub use types::*;
