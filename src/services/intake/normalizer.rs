//! Field Normalizer / Validator
//!
//! Maps the collaborator's heterogeneous update keys onto canonical form
//! fields, applies per-field format rules, and merges accepted values into
//! the form.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use form_copilot_core::{CoreResult, FieldName, FormState};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::parser::ExtractedUpdate;

/// Known key spellings, after [`normalize_key`]. Earlier entries win when the
/// collaborator sends several spellings of the same field in one reply.
const SYNONYMS: &[(&str, FieldName)] = &[
    ("name", FieldName::Name),
    ("fullname", FieldName::Name),
    ("yourname", FieldName::Name),
    ("email", FieldName::Email),
    ("emailaddress", FieldName::Email),
    ("mail", FieldName::Email),
    ("profileurl", FieldName::ProfileUrl),
    ("linkedinprofileurl", FieldName::ProfileUrl),
    ("linkedinurl", FieldName::ProfileUrl),
    ("linkedinprofile", FieldName::ProfileUrl),
    ("linkedin", FieldName::ProfileUrl),
    ("profilelink", FieldName::ProfileUrl),
    ("profile", FieldName::ProfileUrl),
    ("url", FieldName::ProfileUrl),
    ("idea", FieldName::Idea),
    ("aiidea", FieldName::Idea),
    ("projectidea", FieldName::Idea),
    ("startupidea", FieldName::Idea),
    ("ideadescription", FieldName::Idea),
    ("pitch", FieldName::Idea),
];

/// Outcome of validating one field for one turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "value", rename_all = "snake_case")]
pub enum ValidationVerdict {
    /// Valid, trimmed and different from the stored value
    Accepted(String),
    /// Format mismatch, with a user-facing reason
    RejectedFormat(String),
    /// Blank or identical to the stored value
    NoChange,
}

/// Per-field verdicts for one turn
pub type FieldVerdicts = BTreeMap<FieldName, ValidationVerdict>;

/// What a merge actually did to the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Fields whose stored value changed, in canonical order
    pub changed: Vec<FieldName>,
    /// Rejected fields and their reasons, in canonical order
    pub rejected: Vec<(FieldName, String)>,
}

impl MergeReport {
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Priority of a raw key within the synonym table (lower wins)
fn lookup(key: &str) -> Option<(usize, FieldName)> {
    let normalized = normalize_key(key);
    SYNONYMS
        .iter()
        .position(|(synonym, _)| *synonym == normalized)
        .map(|priority| (priority, SYNONYMS[priority].1))
}

/// Resolve a raw collaborator key to a canonical field.
///
/// Case, whitespace and punctuation are ignored, so `"LinkedIn URL"`,
/// `"linkedin_url"` and `"linkedinUrl"` all resolve to
/// [`FieldName::ProfileUrl`]. Unknown keys resolve to `None`.
pub fn canonical_field(key: &str) -> Option<FieldName> {
    lookup(key).map(|(_, field)| field)
}

/// Compiled once using OnceLock.
fn is_email(value: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

fn has_url_scheme(value: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)\b[a-z][a-z0-9+.\-]*://").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

/// Apply the format rule for `field` to a raw value.
///
/// Returns the trimmed value on success or a user-facing reason on failure.
pub fn validate_field(field: FieldName, raw: &str) -> Result<String, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(format!("Your {} can't be empty.", field.label()));
    }

    match field {
        FieldName::Name => {
            if has_url_scheme(value) {
                Err(format!("\"{}\" looks like a link rather than a name.", value))
            } else if value.contains('@') {
                Err(format!(
                    "\"{}\" looks like an email address rather than a name.",
                    value
                ))
            } else {
                Ok(value.to_string())
            }
        }
        FieldName::Email => {
            if is_email(value) {
                Ok(value.to_string())
            } else {
                Err(format!(
                    "\"{}\" doesn't look like a valid email address (something like name@example.com).",
                    value
                ))
            }
        }
        FieldName::ProfileUrl => {
            let lower = value.to_ascii_lowercase();
            if lower.starts_with("http://") || lower.starts_with("https://") {
                Ok(value.to_string())
            } else {
                Err(format!(
                    "Your {} should start with http:// or https://.",
                    field.label()
                ))
            }
        }
        FieldName::Idea => Ok(value.to_string()),
    }
}

/// Where a value rejected as a name really belongs
fn reattribute_name(value: &str) -> Option<FieldName> {
    if has_url_scheme(value) {
        Some(FieldName::ProfileUrl)
    } else if value.contains('@') {
        Some(FieldName::Email)
    } else {
        None
    }
}

/// Turn one reply's raw updates into per-field verdicts.
///
/// Unknown keys are ignored. Only fields mentioned in `updates` (or
/// re-attributed from a misfiled name) appear in the result. The outcome does
/// not depend on the order of keys in the reply.
pub fn normalize_updates(updates: &ExtractedUpdate, form: &FormState) -> FieldVerdicts {
    let mut candidates: BTreeMap<FieldName, (usize, &str)> = BTreeMap::new();
    for (key, value) in updates {
        match lookup(key) {
            Some((priority, field)) => {
                let replace = candidates
                    .get(&field)
                    .map_or(true, |(existing, _)| priority < *existing);
                if replace {
                    candidates.insert(field, (priority, value.as_str()));
                }
            }
            None => debug!(key = %key, "ignoring unknown update key"),
        }
    }

    // A name that is really an email or a link moves to that field, unless
    // the reply already supplied one.
    if let Some(&(_, value)) = candidates.get(&FieldName::Name) {
        if let Some(target) = reattribute_name(value.trim()) {
            if !candidates.contains_key(&target) {
                debug!(target = %target, "re-attributing misfiled name value");
                candidates.insert(target, (usize::MAX, value));
            }
        }
    }

    candidates
        .into_iter()
        .map(|(field, (_, value))| (field, verdict_for(field, value, form)))
        .collect()
}

fn verdict_for(field: FieldName, raw: &str, form: &FormState) -> ValidationVerdict {
    let value = raw.trim();
    if value.is_empty() || form.get(field) == Some(value) {
        return ValidationVerdict::NoChange;
    }
    match validate_field(field, value) {
        Ok(accepted) => ValidationVerdict::Accepted(accepted),
        Err(reason) => ValidationVerdict::RejectedFormat(reason),
    }
}

/// Write accepted verdicts into the form.
///
/// Rejected and unchanged fields keep their stored value. Merging the same
/// verdicts twice leaves the form as merging them once.
pub fn merge_verdicts(form: &mut FormState, verdicts: &FieldVerdicts) -> CoreResult<MergeReport> {
    let mut report = MergeReport::default();
    for (field, verdict) in verdicts {
        match verdict {
            ValidationVerdict::Accepted(value) => {
                if form.set(*field, value)? {
                    report.changed.push(*field);
                }
            }
            ValidationVerdict::RejectedFormat(reason) => {
                report.rejected.push((*field, reason.clone()));
            }
            ValidationVerdict::NoChange => {}
        }
    }
    Ok(report)
}
