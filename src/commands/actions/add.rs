use log::{debug, info};

use crate::{
    commands::{
        CommandContext, CommandResult, Services,
        actions::{Lookup, deny_unless_administrator, owned_channel},
        markdown_response::{
            format_add_usage, format_subscription_created, format_subscription_exists,
        },
    },
    store::RepositoryError,
};

/// Handles the add command: subscribes a channel to a feed.
///
/// Expects `<uri> [channel]`. Without a channel argument the subscription
/// delivers to the channel the command was issued in.
///
/// # Arguments
///
/// * `services` - Platform and storage capabilities
/// * `context` - The invocation, `args` holding the URI and optional channel mention
///
/// # Returns
///
/// A single reply: the new subscription ID, the ID of an identical existing
/// subscription, or the reason the request was rejected.
///
/// # Examples
///
/// ```text
/// /feed:add https://example.com/feed.xml <#300>
/// ```
pub async fn handle_add(
    services: &Services,
    context: &CommandContext,
) -> anyhow::Result<CommandResult> {
    debug!("handling add command");

    if let Some(denied) = deny_unless_administrator(services, context).await? {
        return Ok(denied);
    }

    let (uri, channel_token) = match context.args.as_slice() {
        [uri] => (uri, None),
        [uri, channel] => (uri, Some(channel)),
        _ => return Ok(CommandResult::reply(format_add_usage())),
    };
    if uri.is_empty() {
        return Ok(CommandResult::reply(format_add_usage()));
    }

    let channel_id = match channel_token {
        Some(token) => match owned_channel(services, context, token).await? {
            Lookup::Found(channel_id) => channel_id,
            Lookup::Rejected(reply) => return Ok(CommandResult::reply(reply)),
        },
        None => context.channel_id,
    };

    let feed = services.repository.get_or_create_feed(uri).await?;
    match services
        .repository
        .add_subscription(channel_id, context.guild_id, feed.id)
        .await
    {
        Ok(subscription) => {
            info!(
                "guild {} subscribed channel {} to {} as #{}",
                context.guild_id, channel_id, feed.uri, subscription.id
            );
            Ok(CommandResult::reply(format_subscription_created(
                subscription.id,
            )))
        }
        Err(RepositoryError::SubscriptionExists(existing)) => Ok(CommandResult::reply(
            format_subscription_exists(existing.id),
        )),
        Err(e) => Err(e.into()),
    }
}
