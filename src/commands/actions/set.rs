use log::{debug, info};

use crate::{
    commands::{
        CommandContext, CommandResult, Services,
        actions::{Lookup, deny_unless_administrator, guild_config, owned_channel, owned_subscription},
        markdown_response::{
            format_channel_mention_required, format_contact_changed, format_guild_setting_changed,
            format_inherit_requires_subscription, format_invalid_contact, format_invalid_toggle,
            format_set_channel_usage, format_set_contact_usage, format_set_toggle_usage,
            format_set_usage, format_subscription_exists, format_subscription_moved, format_subscription_setting_changed,
            format_unknown_set,
        },
    },
    settings::{Contact, Setting, Toggle},
    store::RepositoryError,
    utils::parse_channel_mention,
};

/// Handles the set command and routes to its subcommand.
///
/// # Subcommands
///
/// - `channel <id> [channel]` - move a subscription
/// - `contact <user|channel>` - change the guild emergency contact
/// - `embed <on|off|inherit> [id]` - guild default or subscription override
/// - `webhook <on|off|inherit> [id]` - guild default or subscription override
///
/// # Arguments
///
/// * `services` - Platform and storage capabilities
/// * `context` - The invocation, `args[0]` naming the subcommand
///
/// # Returns
///
/// A single reply describing the change, or why nothing was changed.
///
/// # Examples
///
/// ```text
/// /feed:set channel 12 <#300>
/// /feed:set embed inherit 12
/// /feed:set webhook on
/// ```
pub async fn handle_set(
    services: &Services,
    context: &CommandContext,
) -> anyhow::Result<CommandResult> {
    debug!("handling set command");

    if let Some(denied) = deny_unless_administrator(services, context).await? {
        return Ok(denied);
    }

    let Some(subcommand) = context.args.first() else {
        return Ok(CommandResult::reply(format_set_usage()));
    };

    match subcommand.as_str() {
        "channel" => set_channel(services, context).await,
        "contact" => set_contact(services, context).await,
        "embed" => set_toggle(services, context, Setting::Embeds).await,
        "webhook" => set_toggle(services, context, Setting::Webhooks).await,
        _ => Ok(CommandResult::reply(format_unknown_set())),
    }
}

async fn set_channel(
    services: &Services,
    context: &CommandContext,
) -> anyhow::Result<CommandResult> {
    let (id_token, channel_token) = match &context.args[1..] {
        [id] => (id, None),
        [id, channel] => (id, Some(channel)),
        _ => return Ok(CommandResult::reply(format_set_channel_usage())),
    };

    // Syntax first: no lookup for a malformed channel argument
    if let Some(token) = channel_token
        && parse_channel_mention(token).is_none()
    {
        return Ok(CommandResult::reply(format_channel_mention_required()));
    }

    let subscription = match owned_subscription(services, context, id_token).await? {
        Lookup::Found(subscription) => subscription,
        Lookup::Rejected(reply) => return Ok(CommandResult::reply(reply)),
    };

    let channel_id = match channel_token {
        Some(token) => match owned_channel(services, context, token).await? {
            Lookup::Found(channel_id) => channel_id,
            Lookup::Rejected(reply) => return Ok(CommandResult::reply(reply)),
        },
        None => context.channel_id,
    };

    match services
        .repository
        .modify_subscription_channel(subscription.id, channel_id)
        .await
    {
        Ok(()) => {}
        Err(RepositoryError::SubscriptionExists(existing)) => {
            return Ok(CommandResult::reply(format_subscription_exists(existing.id)));
        }
        Err(e) => return Err(e.into()),
    }
    info!(
        "guild {} moved subscription #{} to channel {}",
        context.guild_id, subscription.id, channel_id
    );

    Ok(CommandResult::reply(format_subscription_moved(
        subscription.id,
        channel_id,
    )))
}

async fn set_contact(
    services: &Services,
    context: &CommandContext,
) -> anyhow::Result<CommandResult> {
    let [_, token] = context.args.as_slice() else {
        return Ok(CommandResult::reply(format_set_contact_usage()));
    };

    let Some(contact) = Contact::resolve(token, &context.mentions) else {
        return Ok(CommandResult::reply(format_invalid_contact()));
    };

    match services.repository.get_guild_config(context.guild_id).await {
        Ok(_) => {
            services
                .repository
                .modify_guild_contact(context.guild_id, contact)
                .await?
        }
        Err(RepositoryError::NotFound) => {
            services
                .repository
                .create_guild_config(context.guild_id, contact)
                .await?;
        }
        Err(e) => return Err(e.into()),
    }
    info!("guild {} contact set to {}", context.guild_id, contact);

    Ok(CommandResult::reply(format_contact_changed()))
}

/// Sets the guild default of a setting, or the override of one subscription.
async fn set_toggle(
    services: &Services,
    context: &CommandContext,
    setting: Setting,
) -> anyhow::Result<CommandResult> {
    let (value_token, id_token) = match &context.args[1..] {
        [value] => (value, None),
        [value, id] => (value, Some(id)),
        _ => return Ok(CommandResult::reply(format_set_toggle_usage(setting))),
    };

    let Ok(value) = value_token.parse::<Toggle>() else {
        return Ok(CommandResult::reply(format_invalid_toggle()));
    };

    let Some(id_token) = id_token else {
        let Some(enabled) = value.definite() else {
            return Ok(CommandResult::reply(format_inherit_requires_subscription()));
        };

        guild_config(services, context.guild_id).await?;
        match setting {
            Setting::Embeds => {
                services
                    .repository
                    .modify_guild_embeds(context.guild_id, enabled)
                    .await?
            }
            Setting::Webhooks => {
                services
                    .repository
                    .modify_guild_webhooks(context.guild_id, enabled)
                    .await?
            }
        }
        info!(
            "guild {} {} default set to {}",
            context.guild_id,
            setting.noun(),
            value
        );

        return Ok(CommandResult::reply(format_guild_setting_changed(
            setting, enabled,
        )));
    };

    let subscription = match owned_subscription(services, context, id_token).await? {
        Lookup::Found(subscription) => subscription,
        Lookup::Rejected(reply) => return Ok(CommandResult::reply(reply)),
    };

    match setting {
        Setting::Embeds => {
            services
                .repository
                .modify_overwrite_embeds(subscription.id, value)
                .await?
        }
        Setting::Webhooks => {
            services
                .repository
                .modify_overwrite_webhooks(subscription.id, value)
                .await?
        }
    }
    info!(
        "subscription #{} {} override set to {}",
        subscription.id,
        setting.noun(),
        value
    );

    Ok(CommandResult::reply(format_subscription_setting_changed(
        setting,
        subscription.id,
        value,
    )))
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::{
        commands::actions::test_support::*,
        discord::{Channel, MockTransport},
        store::{GuildConfig, MockRepository},
    };

    fn create_config(guild_id: u64) -> GuildConfig {
        GuildConfig {
            guild_id,
            contact: Contact::User(OWNER),
            embeds: false,
            webhooks: false,
        }
    }

    fn create_context_with_mentions(args: &[&str], mentions: Vec<u64>) -> CommandContext {
        CommandContext {
            mentions,
            ..create_context(args)
        }
    }

    #[tokio::test]
    async fn test_set_requires_administrator() {
        let services = create_services(
            MockTransport::new(),
            create_directory(false),
            MockRepository::new(),
        );

        let result = handle_set(&services, &create_context(&["embed", "on"]))
            .await
            .unwrap();

        assert_eq!(
            result.replies,
            vec!["Sorry, feedbot requires the **ADMINISTRATOR** privilege!".to_string()]
        );
    }

    #[tokio::test]
    async fn test_set_usage_and_unknown_subcommand() {
        let services = create_services(
            MockTransport::new(),
            create_directory(true),
            MockRepository::new(),
        );

        let result = handle_set(&services, &create_context(&[])).await.unwrap();
        assert!(result.replies[0].starts_with("**usage:** `set <channel"));

        let result = handle_set(&services, &create_context(&["color", "red"]))
            .await
            .unwrap();
        assert_eq!(
            result.replies,
            vec!["subcommand must be one of channel|contact|embed|webhook, see the help command.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_set_channel_to_current_channel() {
        let mut repository = MockRepository::new();
        repository
            .expect_get_subscription()
            .returning(|id| Ok(create_subscription(id, GUILD)));
        repository
            .expect_modify_subscription_channel()
            .with(eq(7), eq(CHANNEL))
            .times(1)
            .returning(|_, _| Ok(()));
        let services = create_services(MockTransport::new(), create_directory(true), repository);

        let result = handle_set(&services, &create_context(&["channel", "7"]))
            .await
            .unwrap();

        assert_eq!(
            result.replies,
            vec!["subscription #7 will now write to <#300>".to_string()]
        );
    }

    #[tokio::test]
    async fn test_set_channel_to_mentioned_channel() {
        let mut transport = MockTransport::new();
        transport.expect_resolve_channel().returning(|_| {
            Ok(Channel {
                guild_id: Some(GUILD),
            })
        });
        let mut repository = MockRepository::new();
        repository
            .expect_get_subscription()
            .returning(|id| Ok(create_subscription(id, GUILD)));
        repository
            .expect_modify_subscription_channel()
            .with(eq(7), eq(42))
            .times(1)
            .returning(|_, _| Ok(()));
        let services = create_services(transport, create_directory(true), repository);

        let result = handle_set(&services, &create_context(&["channel", "7", "<#42>"]))
            .await
            .unwrap();

        assert_eq!(
            result.replies,
            vec!["subscription #7 will now write to <#42>".to_string()]
        );
    }

    #[tokio::test]
    async fn test_set_channel_onto_same_feed_reports_existing() {
        let mut repository = MockRepository::new();
        repository
            .expect_get_subscription()
            .returning(|id| Ok(create_subscription(id, GUILD)));
        repository
            .expect_modify_subscription_channel()
            .with(eq(7), eq(CHANNEL))
            .times(1)
            .returning(|_, _| {
                Err(RepositoryError::SubscriptionExists(Box::new(
                    create_subscription(2, GUILD),
                )))
            });
        let services = create_services(MockTransport::new(), create_directory(true), repository);

        let result = handle_set(&services, &create_context(&["channel", "7"]))
            .await
            .unwrap();

        assert_eq!(
            result.replies,
            vec!["this subscription (#2) already exists!".to_string()]
        );
    }

    #[tokio::test]
    async fn test_set_channel_rejects_foreign_subscription() {
        let mut repository = MockRepository::new();
        repository
            .expect_get_subscription()
            .returning(|id| Ok(create_subscription(id, OTHER_GUILD)));
        repository.expect_modify_subscription_channel().never();
        let services = create_services(MockTransport::new(), create_directory(true), repository);

        let result = handle_set(&services, &create_context(&["channel", "7"]))
            .await
            .unwrap();

        assert_eq!(
            result.replies,
            vec!["subscription #7 does not exist in this guild.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_set_channel_rejects_channel_name() {
        let services = create_services(
            MockTransport::new(),
            create_directory(true),
            MockRepository::new(),
        );

        let result = handle_set(&services, &create_context(&["channel", "7", "general"]))
            .await
            .unwrap();

        assert_eq!(
            result.replies,
            vec!["when specifying a channel, please use a #channel mention!".to_string()]
        );

        let result = handle_set(&services, &create_context(&["channel"]))
            .await
            .unwrap();
        assert!(result.replies[0].starts_with("**usage:** `set channel"));
    }

    #[tokio::test]
    async fn test_set_contact_user_mention() {
        let mut repository = MockRepository::new();
        repository
            .expect_get_guild_config()
            .returning(|guild_id| Ok(create_config(guild_id)));
        repository
            .expect_modify_guild_contact()
            .with(eq(GUILD), eq(Contact::User(77)))
            .times(1)
            .returning(|_, _| Ok(()));
        let services = create_services(MockTransport::new(), create_directory(true), repository);
        let context = create_context_with_mentions(&["contact", "<@77>"], vec![77]);

        let result = handle_set(&services, &context).await.unwrap();

        assert_eq!(
            result.replies,
            vec!["the guild's contact has been changed.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_set_contact_creates_missing_guild_config() {
        let mut repository = MockRepository::new();
        repository
            .expect_get_guild_config()
            .returning(|_| Err(RepositoryError::NotFound));
        repository
            .expect_create_guild_config()
            .with(eq(GUILD), eq(Contact::Channel(55)))
            .times(1)
            .returning(|guild_id, contact| {
                Ok(GuildConfig {
                    contact,
                    ..create_config(guild_id)
                })
            });
        let services = create_services(MockTransport::new(), create_directory(true), repository);

        let result = handle_set(&services, &create_context(&["contact", "<#55>"]))
            .await
            .unwrap();

        assert_eq!(
            result.replies,
            vec!["the guild's contact has been changed.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_set_contact_rejects_name() {
        let services = create_services(
            MockTransport::new(),
            create_directory(true),
            MockRepository::new(),
        );

        let result = handle_set(&services, &create_context(&["contact", "alice"]))
            .await
            .unwrap();

        assert_eq!(
            result.replies,
            vec![
                "contact must be a user mention, user id, or channel mention; not a user name or channel name."
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_set_guild_embeds() {
        let mut repository = MockRepository::new();
        repository
            .expect_get_guild_config()
            .returning(|guild_id| Ok(create_config(guild_id)));
        repository
            .expect_modify_guild_embeds()
            .with(eq(GUILD), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));
        let services = create_services(MockTransport::new(), create_directory(true), repository);

        let result = handle_set(&services, &create_context(&["embed", "on"]))
            .await
            .unwrap();

        assert_eq!(
            result.replies,
            vec!["feedbot will now post updates in this guild using embeds, unless overridden by a subscription.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_set_guild_inherit_is_rejected() {
        for setting in ["embed", "webhook"] {
            // Any storage call would fail the test: the guild config stays unchanged
            let services = create_services(
                MockTransport::new(),
                create_directory(true),
                MockRepository::new(),
            );

            let result = handle_set(&services, &create_context(&[setting, "inherit"]))
                .await
                .unwrap();

            assert_eq!(
                result.replies,
                vec!["`inherit` is only a valid flag on a subscription, please specify on|off".to_string()],
                "{setting}"
            );
        }
    }

    #[tokio::test]
    async fn test_set_invalid_toggle() {
        let services = create_services(
            MockTransport::new(),
            create_directory(true),
            MockRepository::new(),
        );

        for value in ["true", "yes", "ON", "1"] {
            let result = handle_set(&services, &create_context(&["webhook", value]))
                .await
                .unwrap();
            assert_eq!(
                result.replies,
                vec!["parameter must be one of on|off|inherit".to_string()]
            );
        }
    }

    #[tokio::test]
    async fn test_set_subscription_webhooks_inherit() {
        let mut repository = MockRepository::new();
        repository
            .expect_get_subscription()
            .returning(|id| Ok(create_subscription(id, GUILD)));
        repository
            .expect_modify_overwrite_webhooks()
            .with(eq(3), eq(Toggle::Inherit))
            .times(1)
            .returning(|_, _| Ok(()));
        let services = create_services(MockTransport::new(), create_directory(true), repository);

        let result = handle_set(&services, &create_context(&["webhook", "inherit", "3"]))
            .await
            .unwrap();

        assert_eq!(
            result.replies,
            vec!["subscription #3 will follow the guild-wide behavior for webhooks.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_set_subscription_override_rejects_foreign_subscription() {
        let mut repository = MockRepository::new();
        repository
            .expect_get_subscription()
            .returning(|id| Ok(create_subscription(id, OTHER_GUILD)));
        repository.expect_modify_overwrite_embeds().never();
        let services = create_services(MockTransport::new(), create_directory(true), repository);

        let result = handle_set(&services, &create_context(&["embed", "off", "3"]))
            .await
            .unwrap();

        assert_eq!(
            result.replies,
            vec!["subscription #3 does not exist in this guild.".to_string()]
        );
    }
}
