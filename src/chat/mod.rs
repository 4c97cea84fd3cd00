//! Chat application module for interactive legal questions.
//!
//! This module provides a streaming REPL chat interface built on top of the
//! juriste client library. It supports:
//!
//! - Streaming responses with real-time token display
//! - Live web search restricted to French legal sources
//! - Citations and a cost estimate after every answer
//! - Slash commands for session control
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core chat session management and API interaction
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, LEGAL_ASSISTANT_PROMPT};
pub use session::{ChatSession, ERROR_MARKER, SessionStats, TurnOutcome};
