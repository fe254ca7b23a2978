//! Application State
//!
//! Resolved configuration plus the orchestrator built from it, shared by the
//! command layer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use form_copilot_llm::{LlmProvider, OpenAIProvider};
use tracing::{info, warn};

use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::services::intake::DialogueOrchestrator;
use crate::storage::ConfigService;
use crate::utils::error::{AppError, AppResult};

/// Application state for one CLI run
pub struct AppState {
    config: AppConfig,
    orchestrator: DialogueOrchestrator,
}

impl AppState {
    /// Load configuration, apply command-line overrides and connect the
    /// collaborator.
    ///
    /// `config_path` defaults to `~/.form-copilot/config.json`.
    pub fn initialize(config_path: Option<PathBuf>, overrides: SettingsUpdate) -> AppResult<Self> {
        let service = match config_path {
            Some(path) => ConfigService::from_path(path)?,
            None => ConfigService::new()?,
        };

        let mut config = service.effective_config()?;
        config.apply_update(overrides);
        config.validate().map_err(AppError::validation)?;

        if config.provider.api_key.is_none() && config.provider.provider.requires_api_key() {
            warn!(
                provider = %config.provider.provider,
                "no API key configured; collaborator calls will fail"
            );
        }

        let provider = OpenAIProvider::new(
            config.provider.clone(),
            Some(Duration::from_secs(config.turn_timeout_secs)),
        )?;
        info!(
            config_path = %service.path().display(),
            provider = %config.provider.provider,
            model = %config.provider.model,
            "collaborator configured"
        );

        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// Build state around an already constructed collaborator
    pub fn with_provider(config: AppConfig, provider: Arc<dyn LlmProvider>) -> Self {
        let orchestrator = DialogueOrchestrator::from_config(provider, &config);
        Self {
            config,
            orchestrator,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &DialogueOrchestrator {
        &self.orchestrator
    }
}
