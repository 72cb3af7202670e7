//! Serenity backed [`Transport`] and [`Directory`].
//!
//! Lookups read the gateway cache first and only query the HTTP API on a cache
//! miss. Every HTTP request is bounded by the configured request timeout.

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use log::debug;
use serenity::{
    cache::Cache,
    http::Http,
    model::id::{ChannelId, GuildId, RoleId, UserId},
};
use tokio::time::timeout;

use crate::discord::{Channel, Directory, Member, PlatformError, Role, Transport};

/// Discord platform adapter sharing the gateway client's cache and HTTP client.
pub struct DiscordPlatform {
    /// Gateway cache, filled by the running client
    cache: Arc<Cache>,
    /// HTTP client used on cache misses and to send messages
    http: Arc<Http>,
    /// Deadline applied to every HTTP request
    request_timeout: Duration,
}

/// Rejects the zero snowflake, which serenity IDs cannot represent.
fn snowflake(kind: &str, id: u64) -> Result<u64, PlatformError> {
    if id == 0 {
        return Err(PlatformError::Missing(format!("{kind} 0")));
    }
    Ok(id)
}

impl DiscordPlatform {
    /// Creates a new [`DiscordPlatform`].
    ///
    /// # Arguments
    ///
    /// * `cache` - The gateway client cache
    /// * `http` - The gateway client HTTP client
    /// * `request_timeout` - Deadline of each HTTP request
    pub fn new(cache: Arc<Cache>, http: Arc<Http>, request_timeout: Duration) -> Self {
        DiscordPlatform {
            cache,
            http,
            request_timeout,
        }
    }

    /// Awaits a serenity request within the request timeout.
    async fn bounded<T, F>(&self, request: &'static str, future: F) -> Result<T, PlatformError>
    where
        F: Future<Output = serenity::Result<T>>,
    {
        match timeout(self.request_timeout, future).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(PlatformError::Request(format!("{request}: {e}"))),
            Err(_) => Err(PlatformError::Timeout(request)),
        }
    }
}

#[async_trait]
impl Transport for DiscordPlatform {
    async fn send_message(&self, channel_id: u64, text: &str) -> Result<(), PlatformError> {
        let channel_id = ChannelId::new(snowflake("channel", channel_id)?);
        self.bounded("send message", channel_id.say(self.http.as_ref(), text))
            .await?;
        Ok(())
    }

    async fn resolve_channel(&self, channel_id: u64) -> Result<Channel, PlatformError> {
        let id = ChannelId::new(snowflake("channel", channel_id)?);

        let cached = self.cache.channel(id).map(|channel| Channel {
            guild_id: Some(channel.guild_id.get()),
        });
        if let Some(channel) = cached {
            return Ok(channel);
        }

        debug!("channel {} not cached, requesting it", channel_id);
        let channel = self.bounded("get channel", self.http.get_channel(id)).await?;
        Ok(Channel {
            guild_id: channel.guild().map(|c| c.guild_id.get()),
        })
    }
}

#[async_trait]
impl Directory for DiscordPlatform {
    async fn resolve_member(&self, guild_id: u64, user_id: u64) -> Result<Member, PlatformError> {
        let guild = GuildId::new(snowflake("guild", guild_id)?);
        let user = UserId::new(snowflake("user", user_id)?);

        let cached = self.cache.guild(guild).and_then(|guild| {
            guild
                .members
                .get(&user)
                .map(|member| member.roles.iter().map(|role| role.get()).collect())
        });
        if let Some(roles) = cached {
            return Ok(Member { roles });
        }

        debug!("member {} of guild {} not cached, requesting it", user_id, guild_id);
        let member = self
            .bounded("get member", self.http.get_member(guild, user))
            .await?;
        Ok(Member {
            roles: member.roles.iter().map(|role| role.get()).collect(),
        })
    }

    async fn resolve_role(&self, guild_id: u64, role_id: u64) -> Result<Role, PlatformError> {
        let guild = GuildId::new(snowflake("guild", guild_id)?);
        let role = RoleId::new(snowflake("role", role_id)?);

        let cached = self
            .cache
            .guild(guild)
            .and_then(|guild| guild.roles.get(&role).map(|r| r.permissions.bits()));
        if let Some(permissions) = cached {
            return Ok(Role {
                id: role_id,
                permissions,
            });
        }

        debug!("role {} of guild {} not cached, requesting it", role_id, guild_id);
        let roles = self
            .bounded("get guild roles", self.http.get_guild_roles(guild))
            .await?;
        roles
            .iter()
            .find(|r| r.id == role)
            .map(|r| Role {
                id: role_id,
                permissions: r.permissions.bits(),
            })
            .ok_or_else(|| PlatformError::Missing(format!("role {role_id} in guild {guild_id}")))
    }

    async fn guild_owner(&self, guild_id: u64) -> Result<u64, PlatformError> {
        let guild = GuildId::new(snowflake("guild", guild_id)?);

        if let Some(owner_id) = self.cache.guild(guild).map(|g| g.owner_id.get()) {
            return Ok(owner_id);
        }

        debug!("guild {} not cached, requesting it", guild_id);
        let partial = self.bounded("get guild", self.http.get_guild(guild)).await?;
        Ok(partial.owner_id.get())
    }
}
