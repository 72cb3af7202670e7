use log::debug;

use crate::commands::{
    CommandContext, CommandResult, Services,
    actions::{deny_unless_administrator, guild_config},
    markdown_response::{LIST_FLUSH_THRESHOLD, format_list_header, format_list_row},
};

/// Handles the list command: shows the guild configuration and its subscriptions.
///
/// The output is split into several messages of at most [`LIST_FLUSH_THRESHOLD`]
/// characters: the current page is flushed before a row that would not fit, and
/// rows are never split. Concatenated in order, the pages are exactly the full
/// listing.
///
/// # Arguments
///
/// * `services` - Platform and storage capabilities
/// * `context` - The invocation, without arguments
///
/// # Returns
///
/// One reply per page, the first one starting with the guild configuration.
pub async fn handle_list(
    services: &Services,
    context: &CommandContext,
) -> anyhow::Result<CommandResult> {
    debug!("handling list command");

    if let Some(denied) = deny_unless_administrator(services, context).await? {
        return Ok(denied);
    }

    let config = guild_config(services, context.guild_id).await?;
    let subscriptions = services
        .repository
        .get_subscriptions(context.guild_id)
        .await?;

    let mut replies = Vec::new();
    let mut page = format_list_header(&config);
    for subscription in &subscriptions {
        let row = format_list_row(subscription, &config);
        if !page.is_empty() && page.len() + row.len() > LIST_FLUSH_THRESHOLD {
            replies.push(std::mem::take(&mut page));
        }
        page.push_str(&row);
    }
    if !page.is_empty() {
        replies.push(page);
    }

    debug!(
        "listing {} subscriptions of guild {} in {} messages",
        subscriptions.len(),
        context.guild_id,
        replies.len()
    );

    Ok(CommandResult { replies })
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::{
        commands::actions::test_support::*,
        discord::MockTransport,
        settings::Contact,
        store::{Feed, GuildConfig, MockRepository, RepositoryError, Subscription},
    };

    const LONG_CHANNEL: u64 = 1_234_567_890_123_456_789;

    fn create_config(guild_id: u64) -> GuildConfig {
        GuildConfig {
            guild_id,
            contact: Contact::Channel(CHANNEL),
            embeds: false,
            webhooks: true,
        }
    }

    #[tokio::test]
    async fn test_list_single_page() {
        let mut repository = MockRepository::new();
        repository
            .expect_get_guild_config()
            .returning(|guild_id| Ok(create_config(guild_id)));
        repository
            .expect_get_subscriptions()
            .with(eq(GUILD))
            .returning(|guild_id| {
                Ok(vec![
                    create_subscription(1, guild_id),
                    create_subscription(3, guild_id),
                ])
            });
        let services = create_services(MockTransport::new(), create_directory(true), repository);

        let result = handle_list(&services, &create_context(&[])).await.unwrap();

        assert_eq!(result.replies.len(), 1);
        let listing = &result.replies[0];
        assert!(listing.starts_with("**Guild Contact:** `c:300`"));
        assert!(listing.contains("**Embeds?** off"));
        assert!(listing.contains("**Webhooks?** on"));
        assert!(listing.contains("1 | <#300> | `https://example.com/feed.xml` | inherit (off) | inherit (on)\n"));
        assert!(listing.contains("\n3 | <#300>"));
    }

    #[tokio::test]
    async fn test_list_paginates_long_listing() {
        let mut repository = MockRepository::new();
        repository
            .expect_get_guild_config()
            .returning(|guild_id| Ok(create_config(guild_id)));
        repository.expect_get_subscriptions().returning(|guild_id| {
            Ok((1..=80)
                .map(|id| create_subscription(id, guild_id))
                .collect())
        });
        let services = create_services(MockTransport::new(), create_directory(true), repository);

        let result = handle_list(&services, &create_context(&[])).await.unwrap();

        assert!(result.replies.len() > 1);
        for page in &result.replies {
            assert!(page.len() <= LIST_FLUSH_THRESHOLD);
            assert!(page.ends_with('\n'));
        }

        let config = create_config(GUILD);
        let mut expected = format_list_header(&config);
        for id in 1..=80 {
            expected.push_str(&format_list_row(&create_subscription(id, GUILD), &config));
        }
        assert_eq!(result.replies.concat(), expected);
    }

    fn create_long_subscription(id: u64) -> Subscription {
        Subscription {
            channel_id: LONG_CHANNEL,
            feed: Feed {
                id,
                uri: format!("https://news.example.com/{}/{id:04}.xml", "a".repeat(130)),
            },
            ..create_subscription(id, GUILD)
        }
    }

    #[tokio::test]
    async fn test_list_pages_fit_discord_limit_with_long_rows() {
        let mut repository = MockRepository::new();
        repository
            .expect_get_guild_config()
            .returning(|guild_id| Ok(create_config(guild_id)));
        repository
            .expect_get_subscriptions()
            .returning(|_| Ok((1..=40).map(create_long_subscription).collect()));
        let services = create_services(MockTransport::new(), create_directory(true), repository);

        let result = handle_list(&services, &create_context(&[])).await.unwrap();

        assert!(result.replies.len() > 1);
        for page in &result.replies {
            assert!(page.len() <= 2000, "page of {} characters", page.len());
            assert!(page.len() <= LIST_FLUSH_THRESHOLD);
        }

        let config = create_config(GUILD);
        let mut expected = format_list_header(&config);
        for id in 1..=40 {
            expected.push_str(&format_list_row(&create_long_subscription(id), &config));
        }
        assert_eq!(result.replies.concat(), expected);
    }

    #[tokio::test]
    async fn test_list_creates_missing_guild_config() {
        let mut repository = MockRepository::new();
        repository
            .expect_get_guild_config()
            .returning(|_| Err(RepositoryError::NotFound));
        repository
            .expect_create_guild_config()
            .with(eq(GUILD), eq(Contact::User(OWNER)))
            .times(1)
            .returning(|guild_id, contact| {
                Ok(GuildConfig {
                    guild_id,
                    contact,
                    embeds: false,
                    webhooks: false,
                })
            });
        repository
            .expect_get_subscriptions()
            .returning(|_| Ok(vec![]));
        let services = create_services(MockTransport::new(), create_directory(true), repository);

        let result = handle_list(&services, &create_context(&[])).await.unwrap();

        assert_eq!(result.replies.len(), 1);
        assert!(result.replies[0].starts_with("**Guild Contact:** `u:500`"));
    }

    #[tokio::test]
    async fn test_list_requires_administrator() {
        let services = create_services(
            MockTransport::new(),
            create_directory(false),
            MockRepository::new(),
        );

        let result = handle_list(&services, &create_context(&[])).await.unwrap();

        assert_eq!(
            result.replies,
            vec!["Sorry, feedbot requires the **ADMINISTRATOR** privilege!".to_string()]
        );
    }
}
