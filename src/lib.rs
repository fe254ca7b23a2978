//! Form Copilot - Rust Library
//!
//! Conversational form filling driven by a text-generation collaborator.
//! It includes:
//! - The intake engine (reply parsing, field normalization, phase machine,
//!   per-turn orchestration)
//! - Terminal chat command handlers
//! - Configuration storage and data models

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::settings::{AppConfig, SettingsUpdate};
pub use services::intake::{
    DialogueOrchestrator, IntakeError, IntakeResult, Session, SubmissionRecord, TurnOutcome,
};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
