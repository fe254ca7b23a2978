//! Dialogue Orchestrator
//!
//! Runs one conversational turn end to end:
//!
//! 1. `begin_turn` records the user's utterance, advances the turn counter,
//!    marks the turn in flight and builds the collaborator request
//! 2. `collaborate` calls the collaborator under a deadline (the only
//!    suspension point)
//! 3. `complete_turn` discards the reply if the turn went stale, otherwise
//!    parses, normalizes, merges, evaluates the phase and appends the
//!    assistant message
//!
//! `process_turn` runs all three in sequence. Splitting them lets a caller
//! reset or cancel a session while a collaborator call is outstanding.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use form_copilot_core::{FieldName, FormState, Phase, Role};
use form_copilot_llm::{LlmError, LlmProvider};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::normalizer::{merge_verdicts, normalize_updates, MergeReport};
use super::parser::parse_reply;
use super::phase::PhaseMachine;
use super::prompt::{
    build_collaborator_request, next_field_prompt, review_summary, CollaboratorRequest,
    APOLOGY_REPLY, FALLBACK_REPLY, GREETING, SUBMITTED_REPLY,
};
use super::session::Session;
use super::{IntakeError, IntakeResult};
use crate::models::settings::AppConfig;

/// Why the collaborator produced no usable text
#[derive(Error, Debug, Clone)]
pub enum CollaboratorError {
    #[error("Collaborator timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Collaborator failed: {0}")]
    Provider(#[from] LlmError),

    #[error("Collaborator returned an empty response")]
    EmptyResponse,
}

/// A turn that has been started but not yet completed
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub turn: u64,
    pub session_id: String,
    pub request: CollaboratorRequest,
}

/// Payload for the downstream submit action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub session_id: String,
    pub name: String,
    pub email: String,
    pub profile_url: String,
    pub idea: String,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    fn from_form(session_id: &str, form: &FormState) -> Self {
        let value = |field: FieldName| form.get(field).unwrap_or_default().to_string();
        Self {
            session_id: session_id.to_string(),
            name: value(FieldName::Name),
            email: value(FieldName::Email),
            profile_url: value(FieldName::ProfileUrl),
            idea: value(FieldName::Idea),
            submitted_at: Utc::now(),
        }
    }
}

/// Everything the caller needs after a turn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub turn: u64,
    pub assistant_message: String,
    pub form_state: FormState,
    pub phase: Phase,
    /// True at most once per session, on the turn that enters Submitting
    pub submission_authorized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmissionRecord>,
    /// Next field to ask for, in canonical order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_field: Option<FieldName>,
    /// Fields rejected this turn and why
    pub rejections: Vec<(FieldName, String)>,
}

/// Drives sessions through turns against a collaborator
pub struct DialogueOrchestrator {
    provider: Arc<dyn LlmProvider>,
    turn_timeout: Duration,
    history_limit: usize,
}

impl DialogueOrchestrator {
    pub fn new(provider: Arc<dyn LlmProvider>, turn_timeout: Duration, history_limit: usize) -> Self {
        Self {
            provider,
            turn_timeout,
            history_limit,
        }
    }

    /// Build an orchestrator using the timeout and history settings of `config`
    pub fn from_config(provider: Arc<dyn LlmProvider>, config: &AppConfig) -> Self {
        Self::new(
            provider,
            Duration::from_secs(config.turn_timeout_secs),
            config.history_limit,
        )
    }

    pub fn turn_timeout(&self) -> Duration {
        self.turn_timeout
    }

    /// Open a new session that starts with the greeting
    pub fn start_session(&self) -> Session {
        let mut session = Session::new();
        session.conversation.append(Role::Assistant, GREETING);
        info!(session_id = %session.id(), "session started");
        session
    }

    /// Reset a session to its initial state, greeting included
    pub fn reset_session(&self, session: &mut Session) {
        let previous = session.id().to_string();
        session.reset();
        session.conversation.append(Role::Assistant, GREETING);
        info!(previous_session = %previous, session_id = %session.id(), "session reset");
    }

    /// Abandon the in-flight turn so its reply is discarded on arrival
    pub fn cancel_turn(&self, session: &mut Session) -> bool {
        match session.cancel_in_flight() {
            Some(turn) => {
                info!(session_id = %session.id(), turn, "turn cancelled");
                true
            }
            None => false,
        }
    }

    /// Record the user's utterance and prepare the collaborator request
    pub fn begin_turn(&self, session: &mut Session, utterance: &str) -> IntakeResult<PendingTurn> {
        if session.phase() == Phase::Submitted {
            return Err(IntakeError::SessionSubmitted);
        }
        if let Some(turn) = session.in_flight {
            return Err(IntakeError::TurnInFlight { turn });
        }
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(IntakeError::EmptyUtterance);
        }

        session.conversation.append(Role::User, utterance);
        session.turn_counter += 1;
        session.in_flight = Some(session.turn_counter);

        debug!(
            session_id = %session.id(),
            turn = session.turn_counter,
            phase = %session.phase(),
            "turn started"
        );

        Ok(PendingTurn {
            turn: session.turn_counter,
            session_id: session.id().to_string(),
            request: build_collaborator_request(session, self.history_limit),
        })
    }

    /// Call the collaborator for a pending turn, bounded by the turn timeout.
    ///
    /// There is no retry; the user's next utterance serves as one.
    pub async fn collaborate(&self, pending: &PendingTurn) -> Result<String, CollaboratorError> {
        let request = pending.request.clone();
        let call = self.provider.send_message(
            request.messages,
            Some(request.system),
            request.options,
        );

        let response = match tokio::time::timeout(self.turn_timeout, call).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(CollaboratorError::Timeout {
                    seconds: self.turn_timeout.as_secs(),
                })
            }
        };

        debug!(
            provider = self.provider.name(),
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            truncated = response.is_truncated(),
            "collaborator replied"
        );

        match response.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(CollaboratorError::EmptyResponse),
        }
    }

    /// Apply the collaborator's result to the session.
    ///
    /// A result for a turn that is no longer current is discarded without
    /// touching the session.
    pub fn complete_turn(
        &self,
        session: &mut Session,
        pending: PendingTurn,
        result: Result<String, CollaboratorError>,
    ) -> IntakeResult<TurnOutcome> {
        if pending.session_id != session.id() || session.in_flight != Some(pending.turn) {
            warn!(
                session_id = %session.id(),
                turn = pending.turn,
                current = session.turn_counter,
                "discarding stale collaborator reply"
            );
            return Err(IntakeError::StaleTurn {
                turn: pending.turn,
                current: session.turn_counter,
            });
        }
        session.in_flight = None;

        let mut parts: Vec<String> = Vec::new();
        let mut report = MergeReport::default();
        let mut submission = None;

        match result {
            Err(e) => {
                warn!(session_id = %session.id(), turn = pending.turn, error = %e, "collaborator unavailable");
                parts.push(APOLOGY_REPLY.to_string());
            }
            Ok(raw) => match parse_reply(&raw) {
                Err(failure) => {
                    warn!(
                        session_id = %session.id(),
                        turn = pending.turn,
                        reason = %failure.reason,
                        excerpt = %failure.excerpt,
                        "unparseable collaborator reply"
                    );
                    parts.push(FALLBACK_REPLY.to_string());
                }
                Ok(reply) => {
                    debug!(
                        turn = pending.turn,
                        encoding = ?reply.encoding,
                        update_count = reply.updates.len(),
                        confirmation = reply.confirmation_signal,
                        "parsed collaborator reply"
                    );

                    let verdicts = normalize_updates(&reply.updates, &session.form);
                    report = merge_verdicts(&mut session.form, &verdicts)?;

                    let previous = session.phase;
                    let evaluation = PhaseMachine::evaluate(
                        previous,
                        &session.form,
                        reply.confirmation_signal,
                        report.has_changes(),
                    );
                    for diagnostic in &evaluation.diagnostics {
                        warn!(session_id = %session.id(), turn = pending.turn, %diagnostic, "phase invariant violation ignored");
                    }
                    session.diagnostics.extend(evaluation.diagnostics.iter().cloned());
                    session.phase = evaluation.phase;
                    if previous != session.phase {
                        info!(
                            session_id = %session.id(),
                            from = %previous,
                            to = %session.phase,
                            "phase changed"
                        );
                    }

                    if evaluation.submission_authorized && !session.submission_emitted {
                        session.submission_emitted = true;
                        session.form.seal();
                        let record = SubmissionRecord::from_form(session.id(), &session.form);
                        info!(session_id = %session.id(), "submission authorized");
                        submission = Some(record);
                    }

                    let message = reply.message.trim();
                    if !message.is_empty() {
                        parts.push(message.to_string());
                    }

                    for (field, reason) in &report.rejected {
                        debug!(field = %field, reason = %reason, "field rejected");
                        parts.push(reason.clone());
                    }

                    let show_summary = session.phase == Phase::Reviewing
                        && (evaluation.entered(Phase::Reviewing) || report.has_changes());
                    if show_summary {
                        parts.push(review_summary(&session.form));
                    } else if parts.is_empty() {
                        match (session.phase, session.form.next_missing()) {
                            (Phase::Submitted, _) => parts.push(SUBMITTED_REPLY.to_string()),
                            (_, Some(field)) => parts.push(next_field_prompt(field)),
                            (_, None) => parts.push(review_summary(&session.form)),
                        }
                    }
                }
            },
        }

        let assistant_message = parts.join("\n\n");
        session
            .conversation
            .append(Role::Assistant, assistant_message.clone());

        Ok(TurnOutcome {
            turn: pending.turn,
            assistant_message,
            form_state: session.form.clone(),
            phase: session.phase,
            submission_authorized: submission.is_some(),
            submission,
            next_field: session.form.next_missing(),
            rejections: report.rejected,
        })
    }

    /// Run a full turn: begin, call the collaborator, complete.
    pub async fn process_turn(
        &self,
        session: &mut Session,
        utterance: &str,
    ) -> IntakeResult<TurnOutcome> {
        let pending = self.begin_turn(session, utterance)?;
        let result = self.collaborate(&pending).await;
        self.complete_turn(session, pending, result)
    }
}
