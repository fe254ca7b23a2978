//! Form Copilot Core
//!
//! Foundational domain types and error types for the Form Copilot workspace.
//! This crate has zero dependencies on application-level code (LLM providers,
//! configuration files, the CLI).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `form` - Canonical fields and the form record (`FieldName`, `FormState`)
//! - `conversation` - Append-only dialogue log (`ConversationStore`, `Message`, `Role`)
//! - `phase` - Workflow phase and its transition table (`Phase`)

pub mod conversation;
pub mod error;
pub mod form;
pub mod phase;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Domain Types ───────────────────────────────────────────────────────
pub use conversation::{ConversationStore, Message, Role};
pub use form::{FieldName, FormState};
pub use phase::Phase;
