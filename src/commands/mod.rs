//! Commands
//!
//! Entry points called by the terminal front end.

pub mod chat;

pub use chat::{handle_input, ChatInput, ChatReply};
