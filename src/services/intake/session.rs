//! Intake Session
//!
//! One conversation's exclusively owned state: the message log, the form,
//! the phase and the turn bookkeeping used to detect stale collaborator
//! replies.

use chrono::{DateTime, Utc};
use form_copilot_core::{ConversationStore, FormState, Phase};
use serde::Serialize;
use uuid::Uuid;

use super::phase::PhaseDiagnostic;

/// State of a single form-filling conversation.
///
/// Sessions are never shared; every mutation goes through the
/// [`DialogueOrchestrator`](super::orchestrator::DialogueOrchestrator) that
/// drives them.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    pub(crate) conversation: ConversationStore,
    pub(crate) form: FormState,
    pub(crate) phase: Phase,
    pub(crate) turn_counter: u64,
    pub(crate) in_flight: Option<u64>,
    pub(crate) submission_emitted: bool,
    pub(crate) diagnostics: Vec<PhaseDiagnostic>,
}

/// Serializable view of a session for display and debugging
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub phase: Phase,
    pub form_state: FormState,
    pub turn: u64,
    pub message_count: usize,
    pub diagnostics: Vec<PhaseDiagnostic>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an empty session in the Collecting phase
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            conversation: ConversationStore::new(),
            form: FormState::new(),
            phase: Phase::Collecting,
            turn_counter: 0,
            in_flight: None,
            submission_emitted: false,
            diagnostics: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of turns started so far, including cancelled ones
    pub fn turn(&self) -> u64 {
        self.turn_counter
    }

    pub fn is_turn_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether submission has already been authorized in this session
    pub fn submission_emitted(&self) -> bool {
        self.submission_emitted
    }

    pub fn diagnostics(&self) -> &[PhaseDiagnostic] {
        &self.diagnostics
    }

    /// Return to an empty Collecting session.
    ///
    /// The turn counter keeps advancing so that a reply to a turn started
    /// before the reset is recognised as stale.
    pub fn reset(&mut self) {
        self.id = Uuid::new_v4().to_string();
        self.created_at = Utc::now();
        self.conversation.clear();
        self.form = FormState::new();
        self.phase = Phase::Collecting;
        self.turn_counter += 1;
        self.in_flight = None;
        self.submission_emitted = false;
        self.diagnostics.clear();
    }

    /// Abandon the in-flight turn, if any
    pub(crate) fn cancel_in_flight(&mut self) -> Option<u64> {
        let cancelled = self.in_flight.take();
        if cancelled.is_some() {
            self.turn_counter += 1;
        }
        cancelled
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            created_at: self.created_at,
            phase: self.phase,
            form_state: self.form.clone(),
            turn: self.turn_counter,
            message_count: self.conversation.len(),
            diagnostics: self.diagnostics.clone(),
        }
    }
}
