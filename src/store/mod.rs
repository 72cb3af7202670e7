//! Feed, subscription and guild configuration storage.
//!
//! Command handlers only talk to storage through the [`Repository`] trait. The
//! bot ships with [`JsonStore`], a JSON file backed implementation.
//!
//! # Data Model
//!
//! - [`Feed`] - an external content source, unique by URI, shared by guilds
//! - [`Subscription`] - a feed bound to one channel of one guild, with an [`Overwrite`]
//! - [`GuildConfig`] - guild-wide contact and delivery defaults

mod json_store;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

pub use crate::store::json_store::JsonStore;
use crate::settings::{Contact, Setting, Toggle};

/// An external content feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    /// Feed identifier
    pub id: u64,
    /// Source URI, unique across feeds
    pub uri: String,
}

/// Per-subscription overrides of the guild delivery defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overwrite {
    /// Embeds override
    pub embeds: Toggle,
    /// Webhooks override
    pub webhooks: Toggle,
}

impl Overwrite {
    /// Returns the override for a setting.
    pub fn get(&self, setting: Setting) -> Toggle {
        match setting {
            Setting::Embeds => self.embeds,
            Setting::Webhooks => self.webhooks,
        }
    }
}

/// A feed delivered to a channel of a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// User-facing subscription ID, never reused
    pub id: u64,
    /// Guild owning the subscription
    pub guild_id: u64,
    /// Channel receiving the updates
    pub channel_id: u64,
    /// Subscribed feed
    pub feed: Feed,
    /// Delivery overrides
    pub overwrite: Overwrite,
}

/// Guild-wide configuration.
///
/// Defaults are plain booleans: a guild cannot `inherit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
    /// Guild identifier
    pub guild_id: u64,
    /// Emergency contact
    pub contact: Contact,
    /// Whether updates use embeds by default
    pub embeds: bool,
    /// Whether updates use webhooks by default
    pub webhooks: bool,
}

/// Errors raised by a [`Repository`].
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The requested record does not exist
    #[error("record not found")]
    NotFound,
    /// An identical subscription (feed, channel, guild) already exists
    #[error("subscription #{} already exists", .0.id)]
    SubscriptionExists(Box<Subscription>),
    /// The storage file could not be read or written
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The storage file could not be encoded or decoded
    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage operations used by the command handlers.
///
/// Implementations own referential integrity and ID uniqueness. Writes are
/// last-write-wins, no optimistic concurrency control is expected.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Repository: Send + Sync {
    /// Returns the feed with this URI, creating it on first reference.
    ///
    /// # Arguments
    ///
    /// * `uri` - Feed source, compared verbatim
    ///
    /// # Returns
    ///
    /// The same feed, with the same ID, for every call with the same URI.
    async fn get_or_create_feed(&self, uri: &str) -> Result<Feed, RepositoryError>;
    /// Subscribes a channel of a guild to a feed.
    ///
    /// # Arguments
    ///
    /// * `channel_id` - Channel receiving the updates
    /// * `guild_id` - Guild owning the subscription
    /// * `feed_id` - Feed returned by [`Repository::get_or_create_feed`]
    ///
    /// # Returns
    ///
    /// * `Ok(Subscription)` - The new subscription, with inherited overrides
    /// * `Err(RepositoryError::SubscriptionExists)` - The same (feed, channel, guild)
    ///   is already subscribed, the existing subscription is carried
    /// * `Err(RepositoryError::NotFound)` - The feed does not exist
    ///
    /// # Examples
    ///
    /// ```
    /// # use feedbot::store::{JsonStore, Repository, RepositoryError};
    /// # async fn run(store: &JsonStore) -> Result<(), RepositoryError> {
    /// let feed = store.get_or_create_feed("https://example.com/feed.xml").await?;
    /// let subscription = store.add_subscription(300, 100, feed.id).await?;
    ///
    /// // Subscribing the same channel again reports the first subscription
    /// match store.add_subscription(300, 100, feed.id).await {
    ///     Err(RepositoryError::SubscriptionExists(existing)) => assert_eq!(existing.id, subscription.id),
    ///     _ => unreachable!(),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn add_subscription(
        &self,
        channel_id: u64,
        guild_id: u64,
        feed_id: u64,
    ) -> Result<Subscription, RepositoryError>;
    /// Fails with [`RepositoryError::NotFound`] for unknown IDs.
    async fn get_subscription(&self, id: u64) -> Result<Subscription, RepositoryError>;
    /// Deletes a subscription. Its ID is never handed out again.
    async fn destroy_subscription(&self, id: u64) -> Result<(), RepositoryError>;
    /// Returns the subscriptions of a guild ordered by ID.
    async fn get_subscriptions(&self, guild_id: u64) -> Result<Vec<Subscription>, RepositoryError>;
    /// Fails with [`RepositoryError::NotFound`] when the guild has no configuration yet.
    async fn get_guild_config(&self, guild_id: u64) -> Result<GuildConfig, RepositoryError>;
    /// Creates, or resets, the configuration of a guild with both defaults off.
    async fn create_guild_config(
        &self,
        guild_id: u64,
        contact: Contact,
    ) -> Result<GuildConfig, RepositoryError>;
    /// Moves a subscription to another channel of its guild.
    ///
    /// # Arguments
    ///
    /// * `id` - Subscription to move
    /// * `channel_id` - New destination channel
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The subscription now delivers to `channel_id`
    /// * `Err(RepositoryError::SubscriptionExists)` - Another subscription already
    ///   delivers the same feed to `channel_id`, nothing was changed
    /// * `Err(RepositoryError::NotFound)` - Unknown subscription
    async fn modify_subscription_channel(
        &self,
        id: u64,
        channel_id: u64,
    ) -> Result<(), RepositoryError>;
    /// Fails with [`RepositoryError::NotFound`] when the guild has no configuration yet.
    async fn modify_guild_contact(
        &self,
        guild_id: u64,
        contact: Contact,
    ) -> Result<(), RepositoryError>;
    async fn modify_guild_embeds(&self, guild_id: u64, enabled: bool)
    -> Result<(), RepositoryError>;
    async fn modify_guild_webhooks(
        &self,
        guild_id: u64,
        enabled: bool,
    ) -> Result<(), RepositoryError>;
    /// Sets the embeds override of a subscription, `inherit` included.
    async fn modify_overwrite_embeds(&self, id: u64, value: Toggle) -> Result<(), RepositoryError>;
    async fn modify_overwrite_webhooks(
        &self,
        id: u64,
        value: Toggle,
    ) -> Result<(), RepositoryError>;
}
