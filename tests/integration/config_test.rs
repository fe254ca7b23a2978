//! Configuration Integration Tests
//!
//! Config file loading feeding the orchestrator's turn settings.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use form_copilot::models::settings::{AppConfig, SettingsUpdate};
use form_copilot::state::AppState;
use form_copilot::storage::ConfigService;
use form_copilot::AppError;
use form_copilot_llm::{ProviderType, ScriptedProvider};

#[test]
fn test_state_uses_config_file_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "provider": {"provider": "ollama", "model": "llama3.1"},
            "turn_timeout_secs": 45,
            "history_limit": 10
        }"#,
    )
    .unwrap();

    let state = AppState::initialize(Some(path), SettingsUpdate::default()).unwrap();
    assert_eq!(state.config().provider.provider, ProviderType::Ollama);
    assert_eq!(state.config().history_limit, 10);
    assert_eq!(state.orchestrator().turn_timeout(), Duration::from_secs(45));
}

#[test]
fn test_command_line_overrides_beat_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"turn_timeout_secs": 45}"#).unwrap();

    let overrides = SettingsUpdate {
        turn_timeout_secs: Some(9),
        ..Default::default()
    };
    let state = AppState::initialize(Some(path.clone()), overrides).unwrap();
    assert_eq!(state.orchestrator().turn_timeout(), Duration::from_secs(9));

    // Overrides are never written back
    let service = ConfigService::from_path(&path).unwrap();
    assert_eq!(service.get_config().turn_timeout_secs, 45);
}

#[test]
fn test_invalid_file_fails_initialization() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"history_limit": 1}"#).unwrap();

    let result = AppState::initialize(Some(path), SettingsUpdate::default());
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_history_limit_bounds_collaborator_request() {
    let provider = Arc::new(ScriptedProvider::replies([
        r#"{"message": "one"}"#,
        r#"{"message": "two"}"#,
        r#"{"message": "three"}"#,
    ]));
    let config = AppConfig {
        history_limit: 3,
        ..Default::default()
    };
    let state = AppState::with_provider(config, provider.clone());
    let orch = state.orchestrator();
    let mut session = orch.start_session();

    for utterance in ["a", "b", "c"] {
        orch.process_turn(&mut session, utterance).await.unwrap();
    }

    let requests = provider.requests();
    assert_eq!(requests[0].messages.len(), 2);
    assert_eq!(requests[2].messages.len(), 3);
    assert_eq!(requests[2].messages[2].content, "c");
}
