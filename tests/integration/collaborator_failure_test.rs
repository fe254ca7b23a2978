//! Collaborator Failure Tests
//!
//! Errors, timeouts and stale replies must never corrupt the session.

use std::sync::Arc;
use std::time::Duration;

use form_copilot::services::intake::prompt::APOLOGY_REPLY;
use form_copilot::services::intake::{CollaboratorError, DialogueOrchestrator, IntakeError};
use form_copilot_core::{FieldName, Phase};
use form_copilot_llm::{LlmError, ScriptStep, ScriptedProvider};
use serde_json::json;

fn name_reply(name: &str) -> String {
    json!({"message": format!("Hi {}!", name), "updates": {"name": name}}).to_string()
}

#[tokio::test]
async fn test_provider_error_yields_apology() {
    let provider = Arc::new(ScriptedProvider::new([
        ScriptStep::Fail(LlmError::ServerError {
            message: "overloaded".to_string(),
            status: Some(503),
        }),
        ScriptStep::Reply(name_reply("Dana")),
    ]));
    let orch = DialogueOrchestrator::new(provider, Duration::from_secs(5), 40);
    let mut session = orch.start_session();

    let outcome = orch.process_turn(&mut session, "I'm Dana").await.unwrap();
    assert_eq!(outcome.assistant_message, APOLOGY_REPLY);
    assert_eq!(outcome.form_state.get(FieldName::Name), None);
    assert_eq!(outcome.phase, Phase::Collecting);
    assert_eq!(session.turn(), 1);

    // The next utterance acts as the retry
    let retry = orch.process_turn(&mut session, "I'm Dana").await.unwrap();
    assert_eq!(retry.form_state.get(FieldName::Name), Some("Dana"));
    assert_eq!(session.turn(), 2);
}

#[tokio::test]
async fn test_timeout_yields_apology() {
    let provider = Arc::new(ScriptedProvider::new([ScriptStep::Delayed(
        Duration::from_millis(500),
        name_reply("Dana"),
    )]));
    let orch = DialogueOrchestrator::new(provider, Duration::from_millis(20), 40);
    let mut session = orch.start_session();

    let outcome = orch.process_turn(&mut session, "I'm Dana").await.unwrap();
    assert_eq!(outcome.assistant_message, APOLOGY_REPLY);
    assert_eq!(outcome.form_state.get(FieldName::Name), None);
    assert!(!session.is_turn_in_flight());
}

#[tokio::test]
async fn test_exhausted_script_is_absorbed() {
    let provider = Arc::new(ScriptedProvider::new(Vec::<ScriptStep>::new()));
    let orch = DialogueOrchestrator::new(provider, Duration::from_secs(5), 40);
    let mut session = orch.start_session();

    let outcome = orch.process_turn(&mut session, "hello").await.unwrap();
    assert_eq!(outcome.assistant_message, APOLOGY_REPLY);
}

#[tokio::test]
async fn test_reply_after_reset_is_discarded() {
    let provider = Arc::new(ScriptedProvider::replies([name_reply("Dana")]));
    let orch = DialogueOrchestrator::new(provider, Duration::from_secs(5), 40);
    let mut session = orch.start_session();

    let pending = orch.begin_turn(&mut session, "I'm Dana").unwrap();
    let result = orch.collaborate(&pending).await;
    orch.reset_session(&mut session);

    let err = orch.complete_turn(&mut session, pending, result).unwrap_err();
    assert!(matches!(err, IntakeError::StaleTurn { turn: 1, .. }));
    assert_eq!(session.form().get(FieldName::Name), None);
    assert_eq!(session.conversation().len(), 1);
}

#[tokio::test]
async fn test_second_turn_rejected_while_in_flight() {
    let provider = Arc::new(ScriptedProvider::replies([name_reply("Dana")]));
    let orch = DialogueOrchestrator::new(provider, Duration::from_secs(5), 40);
    let mut session = orch.start_session();

    let pending = orch.begin_turn(&mut session, "I'm Dana").unwrap();
    assert!(matches!(
        orch.begin_turn(&mut session, "hello?"),
        Err(IntakeError::TurnInFlight { turn: 1 })
    ));

    let result = orch.collaborate(&pending).await;
    let outcome = orch.complete_turn(&mut session, pending, result).unwrap();
    assert_eq!(outcome.form_state.get(FieldName::Name), Some("Dana"));
    assert!(orch.begin_turn(&mut session, "next").is_ok());
}

#[tokio::test]
async fn test_failed_collaboration_can_be_completed_manually() {
    let provider = Arc::new(ScriptedProvider::replies([name_reply("Dana")]));
    let orch = DialogueOrchestrator::new(provider, Duration::from_secs(5), 40);
    let mut session = orch.start_session();

    let pending = orch.begin_turn(&mut session, "I'm Dana").unwrap();
    let outcome = orch
        .complete_turn(&mut session, pending, Err(CollaboratorError::EmptyResponse))
        .unwrap();
    assert_eq!(outcome.assistant_message, APOLOGY_REPLY);
    assert_eq!(outcome.turn, 1);
}
