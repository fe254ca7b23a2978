//! Response Parser Integration Tests
//!
//! Replies in every encoding the collaborator is known to emit, fed through
//! parsing and normalization together.

use form_copilot::services::intake::normalizer::{
    merge_verdicts, normalize_updates, ValidationVerdict,
};
use form_copilot::services::intake::parser::{parse_reply, ReplyEncoding};
use form_copilot_core::{FieldName, FormState};

const REPLY: &str = r#"{"message": "Great, thanks!", "updates": {"LinkedIn URL": "https://linkedin.com/in/dana", "AI_Idea": "Tutor bot"}, "isSubmissionReady": false}"#;

// ============================================================================
// Encodings
// ============================================================================

#[test]
fn test_same_reply_in_every_encoding() {
    let fenced = format!("```json\n{}\n```", REPLY);
    let untagged = format!("```\n{}\n```", REPLY);
    let prose = format!("Sure, here is my answer: {} Let me know!", REPLY);

    let bare = parse_reply(REPLY).unwrap();
    for (raw, encoding) in [
        (fenced.as_str(), ReplyEncoding::Fenced),
        (untagged.as_str(), ReplyEncoding::Fenced),
        (prose.as_str(), ReplyEncoding::Embedded),
    ] {
        let parsed = parse_reply(raw).unwrap();
        assert_eq!(parsed.message, bare.message);
        assert_eq!(parsed.updates, bare.updates);
        assert_eq!(parsed.confirmation_signal, bare.confirmation_signal);
        assert_eq!(parsed.encoding, encoding);
    }
}

#[test]
fn test_fenced_reply_with_invalid_email() {
    let raw = "```json\n{\"message\": \"Thanks Dana!\", \"updates\": {\"name\": \"Dana\", \"email\": \"plainaddress\", \"idea\": \"AI tutor\"}}\n```";
    let reply = parse_reply(raw).unwrap();

    let mut form = FormState::new();
    let verdicts = normalize_updates(&reply.updates, &form);
    assert!(matches!(
        verdicts[&FieldName::Email],
        ValidationVerdict::RejectedFormat(_)
    ));

    let report = merge_verdicts(&mut form, &verdicts).unwrap();
    assert_eq!(report.changed, vec![FieldName::Name, FieldName::Idea]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(form.get(FieldName::Email), None);
    assert_eq!(form.get(FieldName::Name), Some("Dana"));
}

#[test]
fn test_nested_quotes_and_braces_in_prose() {
    let raw = r#"I'll format it like {this}: {"message": "Your idea \"{Tutor}\" sounds fun", "updates": {"idea": "Tutor {beta}"}}"#;
    let reply = parse_reply(raw).unwrap();
    assert_eq!(reply.message, "Your idea \"{Tutor}\" sounds fun");
    assert_eq!(reply.updates["idea"], "Tutor {beta}");
}

#[test]
fn test_unparseable_replies() {
    for raw in [
        "",
        "Sorry, I can't help with that.",
        r#"{"message": "Thanks! What's your"#,
        "```json\n{\"updates\": {}}\n```",
        r#"{"message": 42}"#,
    ] {
        assert!(parse_reply(raw).is_err(), "expected failure for {:?}", raw);
    }
}

// ============================================================================
// Normalization across key spellings
// ============================================================================

#[test]
fn test_synonym_keys_resolve_to_canonical_fields() {
    let reply = parse_reply(REPLY).unwrap();
    let verdicts = normalize_updates(&reply.updates, &FormState::new());
    assert_eq!(
        verdicts[&FieldName::ProfileUrl],
        ValidationVerdict::Accepted("https://linkedin.com/in/dana".to_string())
    );
    assert_eq!(
        verdicts[&FieldName::Idea],
        ValidationVerdict::Accepted("Tutor bot".to_string())
    );
}

#[test]
fn test_key_order_does_not_matter() {
    let a = r#"{"message": "x", "updates": {"email": "dana@example.com", "name": "Dana"}}"#;
    let b = r#"{"message": "x", "updates": {"name": "Dana", "email": "dana@example.com"}}"#;

    let mut form_a = FormState::new();
    let verdicts_a = normalize_updates(&parse_reply(a).unwrap().updates, &form_a);
    merge_verdicts(&mut form_a, &verdicts_a).unwrap();

    let mut form_b = FormState::new();
    let verdicts_b = normalize_updates(&parse_reply(b).unwrap().updates, &form_b);
    merge_verdicts(&mut form_b, &verdicts_b).unwrap();

    assert_eq!(form_a, form_b);
}
