//! Bot command recognition, authorization and execution.
//!
//! This module provides the complete command pipeline of feedbot, letting guild
//! administrators manage feed subscriptions from Discord.
//!
//! # Overview
//!
//! 1. **Recognition** - [`command::Invocation`] strips the invocation prefix
//!    (bot mention or `/feed:`) and splits the verb from its arguments
//! 2. **Dispatch** - [`Commander`] routes the verb to its handler inside a fault
//!    boundary
//! 3. **Authorization** - handlers gate privileged verbs with [`privilege`]
//! 4. **Execution** - handlers in [`actions`] read and write the repository
//! 5. **Response** - handlers return replies built by [`markdown_response`],
//!    the commander sends them to the originating channel
//!
//! # Architecture
//!
//! ```text
//! Discord message
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Commander  │  ← dispatch(): bot filter, prefix, verb lookup, fault boundary
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────────────┐      ┌──────────────────┐
//! │ Action Handlers     │ ───▶ │ is_administrator │
//! │  - handle_help      │      └──────────────────┘
//! │  - handle_add       │      ┌──────────────────┐
//! │  - handle_remove    │ ───▶ │ Repository       │
//! │  - handle_list      │      └──────────────────┘
//! │  - handle_set       │
//! │  - handle_migrate   │
//! └─────────────────────┘
//!      │
//!      ▼
//! CommandResult (replies) ──▶ Transport::send_message
//! ```
//!
//! # Error Handling
//!
//! - Validation problems (bad arguments, unknown or foreign subscription) are
//!   replies, never errors.
//! - A failed authorization is a reply too.
//! - Repository and platform failures are [`anyhow::Error`]s: logged by the
//!   commander with the verb, never shown to users.
//! - Panics in a handler are caught by the commander and logged.

use std::sync::Arc;

mod actions;
pub mod command;
mod commander;
mod markdown_response;
mod privilege;
mod session;

pub use crate::commands::commander::{Commander, Dispatch};
pub use crate::commands::session::{Identity, Session};
use crate::{
    discord::{Directory, Transport},
    store::Repository,
};

/// Collaborators available to command handlers.
#[derive(Clone)]
pub struct Services {
    /// Outbound messages and channel lookups
    pub transport: Arc<dyn Transport>,
    /// Member, role and guild owner lookups
    pub directory: Arc<dyn Directory>,
    /// Feed, subscription and guild configuration storage
    pub repository: Arc<dyn Repository>,
}

/// Runtime context of a single command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    /// Guild the command was issued in
    pub guild_id: u64,
    /// Channel the command was issued in, replies go there
    pub channel_id: u64,
    /// Author of the command
    pub author_id: u64,
    /// Users mentioned by the message, the bot itself excluded
    pub mentions: Vec<u64>,
    /// Arguments following the verb
    pub args: Vec<String>,
    /// Whether the author is the maintenance operator
    pub is_operator: bool,
}

/// Result of a command handler.
///
/// Handlers don't send messages themselves: the commander sends the replies in
/// order once the handler succeeded.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Markdown replies, one message each
    pub replies: Vec<String>,
}

impl CommandResult {
    /// A result with a single reply.
    pub fn reply(text: String) -> Self {
        CommandResult {
            replies: vec![text],
        }
    }

    /// A result without any reply.
    pub fn silent() -> Self {
        CommandResult::default()
    }
}
