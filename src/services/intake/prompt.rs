//! Collaborator Prompts
//!
//! Builds the request sent to the text-generation collaborator and the fixed
//! texts the engine shows on its own (greeting, fallbacks, review summary).

use form_copilot_core::{FieldName, FormState, Phase, Role};
use form_copilot_llm::{LlmRequestOptions, Message as LlmMessage};

use super::session::Session;

/// First assistant message of every session
pub const GREETING: &str =
    "Hi! I'm your form copilot. I'll help you fill this form. Tell me a bit about yourself.";

/// Reply used when the collaborator's output could not be parsed
pub const FALLBACK_REPLY: &str = "I didn't quite catch that, could you rephrase?";

/// Reply used when the collaborator failed or timed out
pub const APOLOGY_REPLY: &str = "Sorry, I'm having trouble connecting. Try again in a moment!";

/// Reply used when submission was authorized and the collaborator said nothing
pub const SUBMITTED_REPLY: &str = "Thanks! Your form has been submitted.";

/// Temperature for form-filling turns; low to keep the JSON contract stable
const COLLABORATOR_TEMPERATURE: f32 = 0.3;

/// A ready-to-send collaborator request
#[derive(Debug, Clone)]
pub struct CollaboratorRequest {
    pub system: String,
    pub messages: Vec<LlmMessage>,
    pub options: LlmRequestOptions,
}

/// Build the request for the session's current turn.
///
/// Only the last `history_limit` messages are included.
pub fn build_collaborator_request(session: &Session, history_limit: usize) -> CollaboratorRequest {
    let messages = session
        .conversation()
        .recent(history_limit)
        .iter()
        .map(|m| match m.role() {
            Role::User => LlmMessage::user(m.text()),
            Role::Assistant => LlmMessage::assistant(m.text()),
        })
        .collect();

    CollaboratorRequest {
        system: system_instruction(session.form(), session.phase()),
        messages,
        options: LlmRequestOptions {
            temperature_override: Some(COLLABORATOR_TEMPERATURE),
            json_response: true,
        },
    }
}

/// System instruction describing the fields, the reply contract and the
/// current state. Fields are always listed in canonical order.
pub fn system_instruction(form: &FormState, phase: Phase) -> String {
    let field_list = FieldName::ALL
        .iter()
        .map(|f| format!("- {} ({})", f.as_str(), f.label()))
        .collect::<Vec<_>>()
        .join("\n");

    let state_lines = form
        .entries()
        .map(|(field, value)| format!("- {}: {}", field.as_str(), value.unwrap_or("(missing)")))
        .collect::<Vec<_>>()
        .join("\n");

    let missing = form.missing_fields();
    let missing_line = if missing.is_empty() {
        "none".to_string()
    } else {
        missing
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let next_line = match form.next_missing() {
        Some(field) => format!("Ask for the {} next.", field.label()),
        None if phase == Phase::Reviewing => {
            "All fields are filled. Ask the user to confirm the summary or edit a field."
                .to_string()
        }
        None => "All fields are filled.".to_string(),
    };

    format!(
        r#"You are a friendly form copilot helping a user fill in a short application form through conversation.

The form has four fields, collected in this order:
{field_list}

Extract any field values the user mentions, answer briefly and warmly, and ask for one missing field at a time.
Only set "isSubmissionReady" to true when all fields are filled and the user has explicitly confirmed the summary.

Reply with ONLY a JSON object of this shape:
{{"message": "<your reply to the user>", "updates": {{"<field>": "<value>"}}, "isSubmissionReady": false}}
Use the field keys listed above. Leave "updates" empty when the user gave no new values.

Current form state:
{state_lines}

Missing fields: {missing_line}
Current phase: {phase}
{next_line}"#,
        phase = phase.as_str(),
    )
}

/// Deterministic question for a missing field
pub fn next_field_prompt(field: FieldName) -> String {
    format!("Thanks! Could you tell me your {}?", field.label())
}

/// Summary of the form shown while reviewing
pub fn review_summary(form: &FormState) -> String {
    let lines = form
        .entries()
        .map(|(field, value)| format!("- {}: {}", capitalize(field.label()), value.unwrap_or("")))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Here's what I've got:\n{}\nDoes everything look right, or would you like to edit anything?",
        lines
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
