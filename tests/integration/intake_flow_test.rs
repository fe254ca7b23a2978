//! Intake Flow Integration Tests
//!
//! Multi-turn conversations driven through the orchestrator against a
//! scripted collaborator.

use std::sync::Arc;
use std::time::Duration;

use form_copilot::services::intake::prompt::GREETING;
use form_copilot::services::intake::{DialogueOrchestrator, IntakeError, PhaseDiagnostic};
use form_copilot_core::{FieldName, FormState, Phase};
use form_copilot_llm::ScriptedProvider;
use serde_json::json;

fn reply(message: &str, updates: serde_json::Value, ready: bool) -> String {
    json!({
        "message": message,
        "updates": updates,
        "isSubmissionReady": ready,
    })
    .to_string()
}

fn all_fields() -> serde_json::Value {
    json!({
        "name": "Dana",
        "email": "dana@example.com",
        "profileUrl": "https://linkedin.com/in/dana",
        "idea": "An AI tutor for kids",
    })
}

fn orchestrator(replies: Vec<String>) -> (DialogueOrchestrator, Arc<ScriptedProvider>) {
    let provider = Arc::new(ScriptedProvider::replies(replies));
    let orch = DialogueOrchestrator::new(provider.clone(), Duration::from_secs(5), 40);
    (orch, provider)
}

// ============================================================================
// Collecting
// ============================================================================

#[tokio::test]
async fn test_name_only_stays_collecting_and_asks_for_email() {
    let (orch, _) = orchestrator(vec![reply("", json!({"name": "Dana"}), false)]);
    let mut session = orch.start_session();

    let outcome = orch.process_turn(&mut session, "I'm Dana").await.unwrap();

    assert_eq!(outcome.form_state.get(FieldName::Name), Some("Dana"));
    assert_eq!(outcome.phase, Phase::Collecting);
    assert_eq!(outcome.next_field, Some(FieldName::Email));
    assert_eq!(
        outcome.assistant_message,
        "Thanks! Could you tell me your email?"
    );
    assert!(!outcome.submission_authorized);
}

#[tokio::test]
async fn test_fields_collected_across_turns() {
    let (orch, provider) = orchestrator(vec![
        reply("Hi Dana! Email?", json!({"name": "Dana"}), false),
        reply("Thanks! LinkedIn?", json!({"e-mail": "dana@example.com"}), false),
        reply(
            "And your idea?",
            json!({"linkedin": "https://linkedin.com/in/dana"}),
            false,
        ),
        reply("Love it!", json!({"aiIdea": "An AI tutor for kids"}), false),
    ]);
    let mut session = orch.start_session();

    for utterance in [
        "I'm Dana",
        "dana@example.com",
        "linkedin.com/in/dana, with https",
        "An AI tutor",
    ] {
        orch.process_turn(&mut session, utterance).await.unwrap();
    }

    assert!(session.form().is_complete());
    assert_eq!(session.phase(), Phase::Reviewing);
    let last = session.conversation().last().unwrap().text().to_string();
    assert!(last.starts_with("Love it!"));
    assert!(last.contains("Here's what I've got:"));

    // Every request carries the current state in the system instruction
    let requests = provider.requests();
    assert_eq!(requests.len(), 4);
    let system = requests[3].system.as_deref().unwrap();
    assert!(system.contains("- name: Dana"));
    assert!(system.contains("- idea: (missing)"));
    assert!(system.contains("Ask for the AI idea next."));
}

#[tokio::test]
async fn test_invalid_email_is_reported_and_other_fields_merge() {
    let raw = "```json\n{\"message\": \"Thanks Dana!\", \"updates\": {\"name\": \"Dana\", \"email\": \"plainaddress\"}}\n```";
    let (orch, _) = orchestrator(vec![raw.to_string()]);
    let mut session = orch.start_session();

    let outcome = orch
        .process_turn(&mut session, "Dana, plainaddress")
        .await
        .unwrap();

    assert_eq!(outcome.form_state.get(FieldName::Name), Some("Dana"));
    assert_eq!(outcome.form_state.get(FieldName::Email), None);
    assert_eq!(outcome.phase, Phase::Collecting);
    assert_eq!(outcome.rejections.len(), 1);
    assert_eq!(outcome.rejections[0].0, FieldName::Email);
    assert!(outcome.assistant_message.starts_with("Thanks Dana!"));
    assert!(outcome.assistant_message.contains("plainaddress"));
}

#[tokio::test]
async fn test_unparseable_reply_leaves_state_untouched() {
    let (orch, _) = orchestrator(vec![
        reply("Hi Dana!", json!({"name": "Dana"}), false),
        r#"{"message": "Thanks! What's your em"#.to_string(),
    ]);
    let mut session = orch.start_session();
    orch.process_turn(&mut session, "I'm Dana").await.unwrap();
    let before = session.form().clone();

    let outcome = orch
        .process_turn(&mut session, "dana@example.com")
        .await
        .unwrap();

    assert_eq!(
        outcome.assistant_message,
        "I didn't quite catch that, could you rephrase?"
    );
    assert_eq!(outcome.form_state, before);
    assert_eq!(outcome.phase, Phase::Collecting);
    assert!(!session.is_turn_in_flight());
}

// ============================================================================
// Reviewing and submission
// ============================================================================

#[tokio::test]
async fn test_looks_good_without_signal_stays_reviewing() {
    let (orch, _) = orchestrator(vec![
        reply("Got everything!", all_fields(), false),
        reply("Great, shall I submit?", json!({}), false),
    ]);
    let mut session = orch.start_session();
    let first = orch.process_turn(&mut session, "all my details").await.unwrap();
    assert_eq!(first.phase, Phase::Reviewing);
    assert!(first.assistant_message.contains("Here's what I've got:"));

    let outcome = orch.process_turn(&mut session, "looks good").await.unwrap();
    assert_eq!(outcome.phase, Phase::Reviewing);
    assert!(!outcome.submission_authorized);
    assert!(outcome.submission.is_none());
    assert_eq!(outcome.assistant_message, "Great, shall I submit?");
}

#[tokio::test]
async fn test_confirmation_during_collecting_is_ignored() {
    let (orch, _) = orchestrator(vec![reply(
        "All set, submitting!",
        json!({"name": "Dana"}),
        true,
    )]);
    let mut session = orch.start_session();

    let outcome = orch.process_turn(&mut session, "I'm Dana, submit").await.unwrap();
    assert_eq!(outcome.phase, Phase::Collecting);
    assert!(!outcome.submission_authorized);
    assert_eq!(
        session.diagnostics(),
        &[PhaseDiagnostic::ConfirmationOutsideReview {
            phase: Phase::Collecting
        }]
    );
}

#[tokio::test]
async fn test_edit_during_review_stays_reviewing() {
    let (orch, _) = orchestrator(vec![
        reply("Got everything!", all_fields(), false),
        reply(
            "Updated your email.",
            json!({"email": "dana@newmail.com"}),
            false,
        ),
    ]);
    let mut session = orch.start_session();
    orch.process_turn(&mut session, "all my details").await.unwrap();

    let outcome = orch
        .process_turn(&mut session, "actually use dana@newmail.com")
        .await
        .unwrap();

    assert_eq!(outcome.phase, Phase::Reviewing);
    assert_eq!(
        outcome.form_state.get(FieldName::Email),
        Some("dana@newmail.com")
    );
    assert!(outcome.assistant_message.contains("Email: dana@newmail.com"));
}

#[tokio::test]
async fn test_edit_with_confirmation_needs_fresh_review() {
    let (orch, _) = orchestrator(vec![
        reply("Got everything!", all_fields(), false),
        reply("Done!", json!({"email": "other@example.com"}), true),
        reply("Submitting!", json!({}), true),
    ]);
    let mut session = orch.start_session();
    orch.process_turn(&mut session, "all my details").await.unwrap();

    let outcome = orch
        .process_turn(&mut session, "use other@example.com and submit")
        .await
        .unwrap();
    assert_eq!(outcome.phase, Phase::Reviewing);
    assert!(!outcome.submission_authorized);
    assert!(outcome.submission.is_none());
    assert!(outcome.assistant_message.starts_with("Done!"));
    assert!(outcome.assistant_message.contains("Email: other@example.com"));
    assert_eq!(
        session.diagnostics(),
        &[PhaseDiagnostic::ConfirmationWithUnreviewedEdit]
    );

    // Confirming the re-presented summary submits the edited value
    let outcome = orch.process_turn(&mut session, "yes").await.unwrap();
    assert!(outcome.submission_authorized);
    assert_eq!(outcome.submission.unwrap().email, "other@example.com");
}

#[tokio::test]
async fn test_submission_authorized_exactly_once() {
    let (orch, _) = orchestrator(vec![
        reply("Got everything!", all_fields(), false),
        reply("Submitting!", json!({}), true),
    ]);
    let mut session = orch.start_session();
    orch.process_turn(&mut session, "all my details").await.unwrap();

    let outcome = orch.process_turn(&mut session, "yes, submit").await.unwrap();
    assert!(outcome.submission_authorized);
    assert_eq!(outcome.phase, Phase::Submitted);
    let record = outcome.submission.unwrap();
    assert_eq!(record.session_id, session.id());
    assert_eq!(record.name, "Dana");
    assert_eq!(record.profile_url, "https://linkedin.com/in/dana");
    assert!(session.submission_emitted());
    assert!(session.form().is_sealed());

    // Further turns are refused until reset
    let err = orch.process_turn(&mut session, "yes!").await.unwrap_err();
    assert!(matches!(err, IntakeError::SessionSubmitted));
}

#[tokio::test]
async fn test_reset_after_submission_starts_fresh() {
    let (orch, _) = orchestrator(vec![
        reply("Got everything!", all_fields(), false),
        reply("Submitting!", json!({}), true),
        reply("Hi again!", json!({"name": "Sam"}), false),
    ]);
    let mut session = orch.start_session();
    orch.process_turn(&mut session, "all my details").await.unwrap();
    orch.process_turn(&mut session, "submit").await.unwrap();

    orch.reset_session(&mut session);
    assert_eq!(session.phase(), Phase::Collecting);
    assert_eq!(session.form(), &FormState::new());
    assert_eq!(session.conversation().len(), 1);
    assert_eq!(session.conversation().messages()[0].text(), GREETING);

    let outcome = orch.process_turn(&mut session, "I'm Sam").await.unwrap();
    assert_eq!(outcome.form_state.get(FieldName::Name), Some("Sam"));
    assert!(!outcome.submission_authorized);
}

#[tokio::test]
async fn test_repeating_an_update_is_idempotent() {
    let (orch, _) = orchestrator(vec![
        reply("Hi Dana!", json!({"name": "Dana"}), false),
        reply("Still Dana!", json!({"name": " Dana "}), false),
    ]);
    let mut session = orch.start_session();
    let first = orch.process_turn(&mut session, "I'm Dana").await.unwrap();
    let second = orch.process_turn(&mut session, "I said Dana").await.unwrap();
    assert_eq!(first.form_state, second.form_state);
    assert!(second.rejections.is_empty());
}
