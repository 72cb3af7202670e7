use log::{debug, info};

use crate::commands::{
    CommandContext, CommandResult, Services,
    actions::{Lookup, deny_unless_administrator, owned_subscription},
    markdown_response::{format_remove_usage, format_subscription_deleted},
};

/// Handles the remove command: deletes a subscription of the guild by ID.
///
/// # Examples
///
/// ```text
/// /feed:remove 12
/// ```
pub async fn handle_remove(
    services: &Services,
    context: &CommandContext,
) -> anyhow::Result<CommandResult> {
    debug!("handling remove command");

    if let Some(denied) = deny_unless_administrator(services, context).await? {
        return Ok(denied);
    }

    let [token] = context.args.as_slice() else {
        return Ok(CommandResult::reply(format_remove_usage()));
    };

    let subscription = match owned_subscription(services, context, token).await? {
        Lookup::Found(subscription) => subscription,
        Lookup::Rejected(reply) => return Ok(CommandResult::reply(reply)),
    };

    services
        .repository
        .destroy_subscription(subscription.id)
        .await?;
    info!(
        "guild {} removed subscription #{}",
        context.guild_id, subscription.id
    );

    Ok(CommandResult::reply(format_subscription_deleted(
        subscription.id,
    )))
}
