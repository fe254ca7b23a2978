//! Workflow Phase
//!
//! The stage of the four-field collection workflow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Workflow phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Asking for missing fields
    #[default]
    Collecting,
    /// All fields present; waiting for the user to confirm the summary
    Reviewing,
    /// Confirmation accepted; submission is being authorized
    Submitting,
    /// Submission authorized; terminal until reset
    Submitted,
}

impl Phase {
    /// Get the display label for this phase
    pub fn label(&self) -> &'static str {
        match self {
            Self::Collecting => "Collecting",
            Self::Reviewing => "Reviewing",
            Self::Submitting => "Submitting",
            Self::Submitted => "Submitted",
        }
    }

    /// Get the string form used in serialized state and prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Reviewing => "reviewing",
            Self::Submitting => "submitting",
            Self::Submitted => "submitted",
        }
    }

    /// Whether the phase accepts no further turns
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted)
    }

    /// Whether `self -> next` is in the transition table.
    ///
    /// Staying in `Collecting` is not a transition; staying in `Reviewing`
    /// after an edit is.
    pub fn can_transition_to(&self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Self::Collecting, Self::Reviewing)
                | (Self::Reviewing, Self::Reviewing)
                | (Self::Reviewing, Self::Submitting)
                | (Self::Submitting, Self::Submitted)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "collecting" => Ok(Self::Collecting),
            "reviewing" => Ok(Self::Reviewing),
            "submitting" => Ok(Self::Submitting),
            "submitted" => Ok(Self::Submitted),
            _ => Err(CoreError::unknown("phase", s)),
        }
    }
}
