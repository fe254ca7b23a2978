//! Phase State Machine
//!
//! Derives the workflow phase for a turn from the current phase, the merged
//! form and the collaborator's confirmation hint. The hint is only honoured
//! while reviewing a complete form that the turn did not edit; everything
//! else is recorded as a diagnostic and leaves the phase alone.

use std::fmt;

use form_copilot_core::{FieldName, FormState, Phase};
use serde::Serialize;

/// A non-fatal invariant violation observed while evaluating a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhaseDiagnostic {
    /// Confirmation arrived while the session was not reviewing
    ConfirmationOutsideReview { phase: Phase },
    /// Confirmation arrived while reviewing but fields are missing
    ConfirmationWithIncompleteForm { missing: Vec<FieldName> },
    /// Confirmation arrived in the same turn that edited a reviewed field
    ConfirmationWithUnreviewedEdit,
    /// A transition outside the allowed table was attempted
    InvalidTransition { from: Phase, to: Phase },
}

impl fmt::Display for PhaseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfirmationOutsideReview { phase } => {
                write!(f, "confirmation ignored while {}", phase.as_str())
            }
            Self::ConfirmationWithIncompleteForm { missing } => {
                let names: Vec<&str> = missing.iter().map(|m| m.as_str()).collect();
                write!(
                    f,
                    "confirmation ignored with missing fields: {}",
                    names.join(", ")
                )
            }
            Self::ConfirmationWithUnreviewedEdit => {
                f.write_str("confirmation ignored after an unreviewed edit")
            }
            Self::InvalidTransition { from, to } => {
                write!(f, "invalid transition {} -> {}", from.as_str(), to.as_str())
            }
        }
    }
}

/// Result of evaluating one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseEvaluation {
    /// Phase after the turn
    pub phase: Phase,
    /// Transitions taken, in order
    pub transitions: Vec<(Phase, Phase)>,
    /// True only on the turn that enters Submitting
    pub submission_authorized: bool,
    pub diagnostics: Vec<PhaseDiagnostic>,
}

impl PhaseEvaluation {
    fn unchanged(phase: Phase) -> Self {
        Self {
            phase,
            transitions: Vec::new(),
            submission_authorized: false,
            diagnostics: Vec::new(),
        }
    }

    /// Move to `next` if the table allows it, otherwise record a diagnostic
    fn step(&mut self, next: Phase) -> bool {
        match PhaseMachine::transition(self.phase, next) {
            Ok(phase) => {
                self.transitions.push((self.phase, phase));
                self.phase = phase;
                true
            }
            Err(diagnostic) => {
                self.diagnostics.push(diagnostic);
                false
            }
        }
    }

    /// Whether the phase moved into `phase` during this turn
    pub fn entered(&self, phase: Phase) -> bool {
        self.transitions
            .iter()
            .any(|(from, to)| *to == phase && *from != phase)
    }
}

/// Stateless evaluator for the Collecting -> Reviewing -> Submitting ->
/// Submitted workflow
pub struct PhaseMachine;

impl PhaseMachine {
    /// Validate a single transition against the table
    pub fn transition(from: Phase, to: Phase) -> Result<Phase, PhaseDiagnostic> {
        if from.can_transition_to(to) {
            Ok(to)
        } else {
            Err(PhaseDiagnostic::InvalidTransition { from, to })
        }
    }

    /// Evaluate the phase after a turn's updates were merged into `form`.
    ///
    /// `edited` is whether the merge changed any stored value this turn.
    pub fn evaluate(
        current: Phase,
        form: &FormState,
        confirmation: bool,
        edited: bool,
    ) -> PhaseEvaluation {
        let mut eval = PhaseEvaluation::unchanged(current);

        match current {
            Phase::Collecting => {
                if confirmation {
                    eval.diagnostics
                        .push(PhaseDiagnostic::ConfirmationOutsideReview { phase: current });
                }
                if form.is_complete() {
                    eval.step(Phase::Reviewing);
                }
            }
            Phase::Reviewing => {
                if !confirmation {
                    return eval;
                }
                if !form.is_complete() {
                    eval.diagnostics
                        .push(PhaseDiagnostic::ConfirmationWithIncompleteForm {
                            missing: form.missing_fields(),
                        });
                    return eval;
                }
                if edited {
                    // The changed value must be shown in a fresh summary first
                    eval.step(Phase::Reviewing);
                    eval.diagnostics
                        .push(PhaseDiagnostic::ConfirmationWithUnreviewedEdit);
                    return eval;
                }
                if eval.step(Phase::Submitting) {
                    eval.submission_authorized = true;
                    eval.step(Phase::Submitted);
                }
            }
            Phase::Submitting | Phase::Submitted => {
                if confirmation {
                    eval.diagnostics
                        .push(PhaseDiagnostic::ConfirmationOutsideReview { phase: current });
                }
            }
        }

        eval
    }
}
