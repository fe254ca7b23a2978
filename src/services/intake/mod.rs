//! Conversational Intake Service
//!
//! Deterministic engine behind the form copilot: the collaborator proposes
//! replies and field values, this service decides what is actually accepted.
//!
//! ## Architecture
//! - `parser.rs` - Extracts the reply object from raw collaborator text
//! - `normalizer.rs` - Canonical field names, format rules and merging
//! - `phase.rs` - Collecting / Reviewing / Submitting / Submitted evaluation
//! - `prompt.rs` - Collaborator request and the engine's own fixed texts
//! - `session.rs` - Exclusively owned per-conversation state
//! - `orchestrator.rs` - Per-turn pipeline with stale-turn detection

pub mod normalizer;
pub mod orchestrator;
pub mod parser;
pub mod phase;
pub mod prompt;
pub mod session;

use form_copilot_core::CoreError;
use thiserror::Error;

pub use normalizer::{FieldVerdicts, MergeReport, ValidationVerdict};
pub use orchestrator::{
    CollaboratorError, DialogueOrchestrator, PendingTurn, SubmissionRecord, TurnOutcome,
};
pub use parser::{parse_reply, ParseFailure, ParsedReply};
pub use phase::{PhaseDiagnostic, PhaseEvaluation, PhaseMachine};
pub use session::{Session, SessionSnapshot};

/// Errors a caller can receive from the orchestrator.
///
/// Collaborator failures, unparseable replies and rejected fields never show
/// up here; they are absorbed into the assistant message.
#[derive(Error, Debug)]
pub enum IntakeError {
    /// The previous turn has not completed yet
    #[error("Turn {turn} is still in flight")]
    TurnInFlight { turn: u64 },

    /// The session already authorized its submission
    #[error("Session already submitted; reset to start over")]
    SessionSubmitted,

    /// A reply arrived for a turn that is no longer current
    #[error("Discarded stale reply for turn {turn} (current turn {current})")]
    StaleTurn { turn: u64, current: u64 },

    #[error("Utterance is empty")]
    EmptyUtterance,

    /// Session state is inconsistent
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for intake operations
pub type IntakeResult<T> = Result<T, IntakeError>;

impl IntakeError {
    /// Whether the session can keep going after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Core(_))
    }
}
