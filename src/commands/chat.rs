//! Chat Commands
//!
//! Interprets one line of terminal input: slash commands act on the session,
//! anything else is a user utterance for the orchestrator.

use tracing::error;

use crate::services::intake::{DialogueOrchestrator, Session};
use crate::utils::error::AppResult;

pub const HELP_TEXT: &str = "Commands: /reset starts over, /state shows the form, /quit exits.";

/// One parsed line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Blank,
    Help,
    Reset,
    State,
    Quit,
    Unknown(String),
    Utterance(String),
}

impl ChatInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Blank;
        }
        if !trimmed.starts_with('/') {
            return Self::Utterance(trimmed.to_string());
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "/help" | "/?" => Self::Help,
            "/reset" => Self::Reset,
            "/state" => Self::State,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

/// What the terminal should print, and whether to stop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatReply {
    pub lines: Vec<String>,
    pub exit: bool,
}

impl ChatReply {
    fn say(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            exit: false,
        }
    }
}

/// Handle one line of input against `session`.
///
/// Recoverable intake errors are printed; only session corruption is
/// returned as an error. After an authorized submission the record is
/// printed as JSON and the session starts over.
pub async fn handle_input(
    orchestrator: &DialogueOrchestrator,
    session: &mut Session,
    input: ChatInput,
) -> AppResult<ChatReply> {
    match input {
        ChatInput::Blank => Ok(ChatReply::default()),
        ChatInput::Help => Ok(ChatReply::say(HELP_TEXT)),
        ChatInput::Quit => Ok(ChatReply {
            lines: vec!["Bye!".to_string()],
            exit: true,
        }),
        ChatInput::Unknown(command) => Ok(ChatReply::say(format!(
            "Unknown command {}. {}",
            command, HELP_TEXT
        ))),
        ChatInput::State => Ok(ChatReply::say(serde_json::to_string_pretty(
            &session.snapshot(),
        )?)),
        ChatInput::Reset => {
            orchestrator.reset_session(session);
            Ok(ChatReply::say(greeting(session)))
        }
        ChatInput::Utterance(text) => match orchestrator.process_turn(session, &text).await {
            Ok(outcome) => {
                let mut reply = ChatReply::say(outcome.assistant_message);
                if let Some(record) = outcome.submission {
                    reply.lines.push(serde_json::to_string_pretty(&record)?);
                    orchestrator.reset_session(session);
                    reply.lines.push(greeting(session));
                }
                Ok(reply)
            }
            Err(e) if e.is_recoverable() => Ok(ChatReply::say(e.to_string())),
            Err(e) => {
                error!(session_id = %session.id(), error = %e, "session is unusable");
                Err(e.into())
            }
        },
    }
}

/// Last assistant message, which right after a reset is the greeting
pub fn greeting(session: &Session) -> String {
    session
        .conversation()
        .last()
        .map(|m| m.text().to_string())
        .unwrap_or_default()
}
