//! Form Fields and Form State
//!
//! The four canonical fields collected by the copilot and the record that
//! holds their current values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// One of the four canonical form fields.
///
/// The declaration order is the canonical collection order and is what
/// `Ord` compares on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Name,
    Email,
    ProfileUrl,
    Idea,
}

impl FieldName {
    /// All fields in canonical collection order.
    pub const ALL: [FieldName; 4] = [
        FieldName::Name,
        FieldName::Email,
        FieldName::ProfileUrl,
        FieldName::Idea,
    ];

    /// Stable key used in collaborator requests and serialized state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::ProfileUrl => "profileUrl",
            Self::Idea => "idea",
        }
    }

    /// Human-readable label used in assistant messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::ProfileUrl => "LinkedIn profile URL",
            Self::Idea => "AI idea",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| CoreError::unknown("field", s))
    }
}

/// Canonical record of the four form fields.
///
/// Values are stored trimmed; an empty value is stored as `None`, so "unset"
/// and "empty" are the same state. A sealed form rejects every write until it
/// is replaced by a fresh one. Equality compares the four values only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawFormState")]
pub struct FormState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idea: Option<String>,
    #[serde(skip)]
    sealed: bool,
}

impl FormState {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a field, if set
    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Write a field value.
    ///
    /// The value is trimmed; an empty result clears the field. Returns whether
    /// the stored value changed.
    pub fn set(&mut self, field: FieldName, value: &str) -> CoreResult<bool> {
        if self.sealed {
            return Err(CoreError::sealed(format!(
                "cannot write {} after submission",
                field
            )));
        }
        let trimmed = value.trim();
        let next = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        let slot = self.slot_mut(field);
        if *slot == next {
            return Ok(false);
        }
        *slot = next;
        Ok(true)
    }

    /// Whether every field holds a non-empty value
    pub fn is_complete(&self) -> bool {
        FieldName::ALL.iter().all(|f| self.get(*f).is_some())
    }

    /// Fields still unset, in canonical order
    pub fn missing_fields(&self) -> Vec<FieldName> {
        FieldName::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    /// The next field to ask for, in canonical order
    pub fn next_missing(&self) -> Option<FieldName> {
        FieldName::ALL.into_iter().find(|f| self.get(*f).is_none())
    }

    /// Number of fields currently set
    pub fn filled_count(&self) -> usize {
        FieldName::ALL.len() - self.missing_fields().len()
    }

    /// Iterate `(field, value)` pairs in canonical order
    pub fn entries(&self) -> impl Iterator<Item = (FieldName, Option<&str>)> + '_ {
        FieldName::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Freeze the form; all later writes fail
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn slot(&self, field: FieldName) -> &Option<String> {
        match field {
            FieldName::Name => &self.name,
            FieldName::Email => &self.email,
            FieldName::ProfileUrl => &self.profile_url,
            FieldName::Idea => &self.idea,
        }
    }

    fn slot_mut(&mut self, field: FieldName) -> &mut Option<String> {
        match field {
            FieldName::Name => &mut self.name,
            FieldName::Email => &mut self.email,
            FieldName::ProfileUrl => &mut self.profile_url,
            FieldName::Idea => &mut self.idea,
        }
    }
}

impl PartialEq for FormState {
    fn eq(&self, other: &Self) -> bool {
        FieldName::ALL
            .into_iter()
            .all(|f| self.get(f) == other.get(f))
    }
}

impl Eq for FormState {}

/// Wire shape of a form; every value goes through `FormState::set`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFormState {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    profile_url: Option<String>,
    #[serde(default)]
    idea: Option<String>,
}

impl TryFrom<RawFormState> for FormState {
    type Error = CoreError;

    fn try_from(raw: RawFormState) -> CoreResult<Self> {
        let mut form = FormState::new();
        for (field, value) in [
            (FieldName::Name, raw.name),
            (FieldName::Email, raw.email),
            (FieldName::ProfileUrl, raw.profile_url),
            (FieldName::Idea, raw.idea),
        ] {
            if let Some(value) = value {
                form.set(field, &value)?;
            }
        }
        Ok(form)
    }
}
