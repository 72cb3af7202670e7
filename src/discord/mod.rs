//! Discord integration.
//!
//! The command layer never touches serenity types. It consumes the platform
//! through two capability traits:
//!
//! - [`Transport`] - sending messages and resolving channels
//! - [`Directory`] - resolving guild members, roles and owners
//!
//! Both are implemented by [`DiscordPlatform`], which reads the gateway cache
//! first and falls back to the HTTP API on a cache miss. [`Handler`] receives
//! gateway events and feeds them to the [`Commander`](crate::commands::Commander).

mod handler;
mod platform;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

pub use crate::discord::handler::{CommanderKey, Handler};
pub use crate::discord::platform::DiscordPlatform;

/// Discord `ADMINISTRATOR` permission bit.
pub const ADMINISTRATOR: u64 = 1 << 3;

/// A message received from a guild or direct message channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Author user ID
    pub author_id: u64,
    /// Whether the author is a bot account
    pub author_is_bot: bool,
    /// Guild of the channel, `None` for direct messages
    pub guild_id: Option<u64>,
    /// Channel the message was posted in
    pub channel_id: u64,
    /// Raw message text
    pub content: String,
    /// Users mentioned by the message, in order
    pub mentions: Vec<u64>,
}

/// A guild member, reduced to what permission checks need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Role IDs held by the member
    pub roles: Vec<u64>,
}

/// A guild role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: u64,
    /// Discord permission bitfield
    pub permissions: u64,
}

impl Role {
    /// Whether the role carries the `ADMINISTRATOR` permission.
    pub fn is_administrator(&self) -> bool {
        self.permissions & ADMINISTRATOR != 0
    }
}

/// A channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Owning guild, `None` for private channels
    pub guild_id: Option<u64>,
}

/// Errors raised by [`Transport`] and [`Directory`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The Discord API rejected or failed the request
    #[error("discord request failed: {0}")]
    Request(String),
    /// The request did not complete within the configured deadline
    #[error("discord request timed out: {0}")]
    Timeout(&'static str),
    /// The requested entity does not exist
    #[error("not found: {0}")]
    Missing(String),
}

/// Outbound messaging.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a plain text message to a channel.
    async fn send_message(&self, channel_id: u64, text: &str) -> Result<(), PlatformError>;
    /// Resolves a channel, cache first.
    async fn resolve_channel(&self, channel_id: u64) -> Result<Channel, PlatformError>;
}

/// Guild member and role lookups.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolves a guild member, cache first.
    async fn resolve_member(&self, guild_id: u64, user_id: u64) -> Result<Member, PlatformError>;
    /// Resolves a guild role, cache first.
    async fn resolve_role(&self, guild_id: u64, role_id: u64) -> Result<Role, PlatformError>;
    /// Resolves the user ID of the guild owner, cache first.
    async fn guild_owner(&self, guild_id: u64) -> Result<u64, PlatformError>;
}
