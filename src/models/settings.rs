//! Settings Models
//!
//! Application configuration and settings data structures.

use form_copilot_llm::{ProviderConfig, ProviderType};
use serde::{Deserialize, Serialize};

/// Environment variable consulted when the config file has no API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the configured model
pub const MODEL_ENV: &str = "FORM_COPILOT_MODEL";
/// Environment variable overriding the configured endpoint
pub const BASE_URL_ENV: &str = "FORM_COPILOT_BASE_URL";

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Collaborator connection settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Upper bound on a single collaborator call, in seconds
    #[serde(default = "default_turn_timeout_secs")]
    pub turn_timeout_secs: u64,
    /// Maximum number of recent messages sent to the collaborator
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_turn_timeout_secs() -> u64 {
    30
}

fn default_history_limit() -> usize {
    40
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            turn_timeout_secs: default_turn_timeout_secs(),
            history_limit: default_history_limit(),
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub provider: Option<ProviderType>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub turn_timeout_secs: Option<u64>,
    pub history_limit: Option<usize>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(provider) = update.provider {
            self.provider.provider = provider;
        }
        if let Some(model) = update.model {
            self.provider.model = model;
        }
        if let Some(base_url) = update.base_url {
            self.provider.base_url = Some(base_url);
        }
        if let Some(api_key) = update.api_key {
            self.provider.api_key = Some(api_key);
        }
        if let Some(secs) = update.turn_timeout_secs {
            self.turn_timeout_secs = secs;
        }
        if let Some(limit) = update.history_limit {
            self.history_limit = limit;
        }
    }

    /// Fill in values from the environment.
    ///
    /// The API key is only taken from the environment when the file has none;
    /// model and endpoint variables always win.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.provider.api_key.is_none() {
            self.provider.api_key = non_empty(API_KEY_ENV);
        }
        if let Some(model) = non_empty(MODEL_ENV) {
            self.provider.model = model;
        }
        if let Some(base_url) = non_empty(BASE_URL_ENV) {
            self.provider.base_url = Some(base_url);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.provider.model.trim().is_empty() {
            return Err("provider.model must not be empty".to_string());
        }

        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(format!(
                "provider.temperature must be between 0.0 and 2.0, got {}",
                self.provider.temperature
            ));
        }

        if self.provider.max_tokens == 0 {
            return Err("provider.max_tokens must be positive".to_string());
        }

        if self.turn_timeout_secs == 0 || self.turn_timeout_secs > 600 {
            return Err("turn_timeout_secs must be between 1 and 600".to_string());
        }

        if self.history_limit < 2 {
            return Err("history_limit must be at least 2".to_string());
        }

        Ok(())
    }
}
