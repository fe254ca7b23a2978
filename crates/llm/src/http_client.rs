//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients with a request
//! deadline.

use std::time::Duration;

use super::types::{LlmError, LlmResult};

/// Build a `reqwest::Client` for collaborator calls.
///
/// - `Some(timeout)` -> every request is aborted after `timeout`
/// - `None` -> no client-side deadline (callers bound the call themselves)
pub fn build_http_client(timeout: Option<Duration>) -> LlmResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(concat!(
        "form-copilot/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| LlmError::Other {
        message: format!("failed to build HTTP client: {}", e),
    })
}
