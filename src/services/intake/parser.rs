//! Collaborator Reply Parser
//!
//! Extracts the structured reply object from raw collaborator text. The
//! collaborator is asked for bare JSON but in practice also emits JSON inside
//! markdown fences or surrounded by prose, so parsing runs in passes:
//!
//! - Pass 1: the whole trimmed text as a JSON object
//! - Pass 2: the inner content of each `` ``` `` / `` ```json `` fenced block
//! - Pass 3: brace-balanced `{ ... }` spans found by scanning the text,
//!   ignoring braces inside string literals
//!
//! Parsing is pure: the same input always yields the same output.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Raw, unvalidated key/value pairs proposed by the collaborator
pub type ExtractedUpdate = BTreeMap<String, String>;

/// Upper bound on brace-scan candidates tried in pass 3
const MAX_SCAN_CANDIDATES: usize = 64;

/// Which encoding the reply object was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyEncoding {
    Bare,
    Fenced,
    Embedded,
}

/// A successfully parsed collaborator reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// Conversational text to show the user
    pub message: String,
    /// Proposed field values keyed by whatever name the collaborator used
    pub updates: ExtractedUpdate,
    /// The collaborator's `isSubmissionReady` hint
    pub confirmation_signal: bool,
    pub encoding: ReplyEncoding,
}

/// The collaborator output contained no usable reply object
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable collaborator reply: {reason}")]
pub struct ParseFailure {
    pub reason: String,
    /// Leading fragment of the raw text, for diagnostics
    pub excerpt: String,
}

impl ParseFailure {
    fn new(reason: impl Into<String>, raw: &str) -> Self {
        Self {
            reason: reason.into(),
            excerpt: raw.chars().take(120).collect(),
        }
    }
}

/// Parse raw collaborator text into a [`ParsedReply`].
pub fn parse_reply(raw: &str) -> Result<ParsedReply, ParseFailure> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseFailure::new("empty response", raw));
    }

    // Pass 1: bare object
    let bare_error = match parse_object(trimmed) {
        Ok(reply) => return Ok(reply.with_encoding(ReplyEncoding::Bare)),
        Err(e) => e,
    };

    // Pass 2: fenced blocks
    for block in fenced_blocks(trimmed) {
        if let Ok(reply) = parse_object(block.trim()) {
            return Ok(reply.with_encoding(ReplyEncoding::Fenced));
        }
    }

    // Pass 3: brace-balanced spans
    let mut search_from = 0;
    for _ in 0..MAX_SCAN_CANDIDATES {
        let Some(offset) = trimmed[search_from..].find('{') else {
            break;
        };
        let start = search_from + offset;
        if let Some(end) = matching_brace(trimmed, start) {
            if let Ok(reply) = parse_object(&trimmed[start..=end]) {
                return Ok(reply.with_encoding(ReplyEncoding::Embedded));
            }
        }
        search_from = start + 1;
    }

    Err(ParseFailure::new(bare_error, raw))
}

impl ParsedReply {
    fn with_encoding(mut self, encoding: ReplyEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Strictly interpret `text` as a reply object.
fn parse_object(text: &str) -> Result<ParsedReply, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| format!("invalid JSON: {}", e))?;
    let Value::Object(mut obj) = value else {
        return Err("top-level JSON value is not an object".to_string());
    };

    let message = match obj.remove("message") {
        Some(Value::String(s)) => s,
        Some(_) => return Err("`message` is not a string".to_string()),
        None => return Err("missing `message`".to_string()),
    };

    let updates = match obj.remove("updates") {
        None | Some(Value::Null) => ExtractedUpdate::new(),
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key, v)))
            .collect(),
        Some(_) => return Err("`updates` is not an object".to_string()),
    };

    let confirmation_signal = matches!(obj.get("isSubmissionReady"), Some(Value::Bool(true)));

    Ok(ParsedReply {
        message,
        updates,
        confirmation_signal,
        encoding: ReplyEncoding::Bare,
    })
}

/// Strings pass through; numbers and booleans are stringified; anything else
/// is not a field value.
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Inner contents of every closed ``` fence, in order of appearance.
///
/// The first line of a fence is treated as an info string (e.g. `json`) unless
/// it already contains the start of an object.
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut remaining = text;

    while let Some(start) = remaining.find("```") {
        let after_marker = &remaining[start + 3..];
        let body = match after_marker.find('\n') {
            Some(nl) if !after_marker[..nl].contains('{') => &after_marker[nl + 1..],
            _ => after_marker,
        };

        let Some(end) = body.find("```") else {
            break;
        };
        blocks.push(&body[..end]);
        remaining = &body[end + 3..];
    }

    blocks
}

/// Byte index of the `}` closing the `{` at `start`, skipping braces inside
/// string literals and honouring backslash escapes.
fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}
