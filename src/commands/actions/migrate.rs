use log::{debug, warn};

use crate::{
    commands::{
        CommandContext, CommandResult, Services, markdown_response::format_guild_config_reset,
    },
    settings::Contact,
};

/// Handles the maintenance command recreating the guild configuration.
///
/// Only the operator may run it; anybody else gets no reply at all. The guild
/// configuration is reset with the server owner as contact and both defaults off.
///
/// # Returns
///
/// The reset confirmation for the operator, a silent result for anyone else.
pub async fn handle_migrate(
    services: &Services,
    context: &CommandContext,
) -> anyhow::Result<CommandResult> {
    debug!("handling migrate command");

    if !context.is_operator {
        debug!("ignoring migrate command from user {}", context.author_id);
        return Ok(CommandResult::silent());
    }

    let owner_id = services.directory.guild_owner(context.guild_id).await?;
    services
        .repository
        .create_guild_config(context.guild_id, Contact::User(owner_id))
        .await?;
    warn!(
        "configuration of guild {} reset by operator {}",
        context.guild_id, context.author_id
    );

    Ok(CommandResult::reply(format_guild_config_reset()))
}
