//! Command action handlers.
//!
//! Individual handler functions for each bot command. Each handler receives the
//! [`Services`] and a [`CommandContext`], validates its arguments and returns a
//! [`CommandResult`] holding the replies to send.
//!
//! # Handler Pattern
//!
//! Privileged handlers follow the same steps:
//! 1. Check the author is a guild administrator, reply with a denial otherwise
//! 2. Validate the arguments, reply with usage or a rejection when invalid
//! 3. Re-check guild ownership of any referenced subscription or channel
//! 4. Read or write the repository and reply with the outcome
//!
//! # Available Handlers
//!
//! - [`handle_help`] - Display help information
//! - [`handle_add`] - Subscribe a channel to a feed
//! - [`handle_remove`] - Delete a subscription
//! - [`handle_list`] - List the guild configuration and subscriptions
//! - [`handle_set`] - Change channel, contact, embed and webhook settings
//! - [`handle_migrate`] - Operator-only guild configuration reset

mod add;
mod help;
mod list;
mod migrate;
mod remove;
mod set;

use log::{debug, info};

pub use crate::commands::actions::{
    add::handle_add, help::handle_help, list::handle_list, migrate::handle_migrate,
    remove::handle_remove, set::handle_set,
};
use crate::{
    commands::{
        CommandContext, CommandResult, Services,
        markdown_response::{
            format_admin_only, format_channel_mention_required, format_foreign_channel,
            format_id_not_a_number, format_subscription_foreign, format_subscription_not_found,
        },
        privilege::is_administrator,
    },
    settings::Contact,
    store::{GuildConfig, RepositoryError, Subscription},
    utils::{parse_channel_mention, parse_id},
};

/// Outcome of a lookup driven by user input.
#[derive(Debug)]
enum Lookup<T> {
    /// The lookup succeeded
    Found(T),
    /// The input was rejected, with the reply explaining why
    Rejected(String),
}

/// Returns the denial to reply when the author is not a guild administrator.
async fn deny_unless_administrator(
    services: &Services,
    context: &CommandContext,
) -> anyhow::Result<Option<CommandResult>> {
    if is_administrator(services.directory.as_ref(), context.guild_id, context.author_id).await? {
        return Ok(None);
    }
    Ok(Some(CommandResult::reply(format_admin_only())))
}

/// Parses a subscription ID argument and checks the subscription belongs to the guild.
async fn owned_subscription(
    services: &Services,
    context: &CommandContext,
    token: &str,
) -> anyhow::Result<Lookup<Subscription>> {
    let Some(id) = parse_id(token) else {
        return Ok(Lookup::Rejected(format_id_not_a_number()));
    };

    let subscription = match services.repository.get_subscription(id).await {
        Ok(subscription) => subscription,
        Err(RepositoryError::NotFound) => {
            return Ok(Lookup::Rejected(format_subscription_not_found()));
        }
        Err(e) => return Err(e.into()),
    };

    if subscription.guild_id != context.guild_id {
        debug!(
            "subscription {} belongs to guild {}, not {}",
            id, subscription.guild_id, context.guild_id
        );
        return Ok(Lookup::Rejected(format_subscription_foreign(id)));
    }

    Ok(Lookup::Found(subscription))
}

/// Parses a `<#id>` channel argument and checks the channel belongs to the guild.
async fn owned_channel(
    services: &Services,
    context: &CommandContext,
    token: &str,
) -> anyhow::Result<Lookup<u64>> {
    let Some(channel_id) = parse_channel_mention(token) else {
        return Ok(Lookup::Rejected(format_channel_mention_required()));
    };

    let channel = services.transport.resolve_channel(channel_id).await?;
    if channel.guild_id != Some(context.guild_id) {
        debug!(
            "channel {} belongs to guild {:?}, not {}",
            channel_id, channel.guild_id, context.guild_id
        );
        return Ok(Lookup::Rejected(format_foreign_channel()));
    }

    Ok(Lookup::Found(channel_id))
}

/// Returns the guild configuration, creating it with the owner as contact when missing.
async fn guild_config(services: &Services, guild_id: u64) -> anyhow::Result<GuildConfig> {
    match services.repository.get_guild_config(guild_id).await {
        Ok(config) => Ok(config),
        Err(RepositoryError::NotFound) => {
            let owner_id = services.directory.guild_owner(guild_id).await?;
            info!("creating configuration of guild {} with owner {}", guild_id, owner_id);
            let config = services
                .repository
                .create_guild_config(guild_id, Contact::User(owner_id))
                .await?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::{
        commands::{CommandContext, Services},
        discord::{ADMINISTRATOR, Member, MockDirectory, MockTransport, Role},
        store::{Feed, MockRepository, Overwrite, Subscription},
    };

    pub const GUILD: u64 = 100;
    pub const OTHER_GUILD: u64 = 200;
    pub const CHANNEL: u64 = 300;
    pub const AUTHOR: u64 = 400;
    pub const OWNER: u64 = 500;

    pub fn create_context(args: &[&str]) -> CommandContext {
        CommandContext {
            guild_id: GUILD,
            channel_id: CHANNEL,
            author_id: AUTHOR,
            mentions: vec![],
            args: args.iter().map(|a| a.to_string()).collect(),
            is_operator: false,
        }
    }

    /// Directory where the author holds one role, administrator or not.
    pub fn create_directory(administrator: bool) -> MockDirectory {
        let mut directory = MockDirectory::new();
        directory
            .expect_resolve_member()
            .returning(|_, _| Ok(Member { roles: vec![1] }));
        directory.expect_resolve_role().returning(move |_, id| {
            Ok(Role {
                id,
                permissions: if administrator { ADMINISTRATOR } else { 0 },
            })
        });
        directory.expect_guild_owner().returning(|_| Ok(OWNER));
        directory
    }

    pub fn create_services(
        transport: MockTransport,
        directory: MockDirectory,
        repository: MockRepository,
    ) -> Services {
        Services {
            transport: Arc::new(transport),
            directory: Arc::new(directory),
            repository: Arc::new(repository),
        }
    }

    pub fn create_subscription(id: u64, guild_id: u64) -> Subscription {
        Subscription {
            id,
            guild_id,
            channel_id: CHANNEL,
            feed: Feed {
                id: 1,
                uri: "https://example.com/feed.xml".to_string(),
            },
            overwrite: Overwrite::default(),
        }
    }
}
