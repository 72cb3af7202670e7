//! JSON file backed [`Repository`].
//!
//! The whole state is kept in memory and written back to disk after every
//! successful mutation. A mutation is applied to a copy of the state and only
//! committed once the file has been written, so a failed write leaves both the
//! file and the in-memory state untouched.

use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::Mutex};

use crate::{
    settings::{Contact, Toggle},
    store::{Feed, GuildConfig, Overwrite, Repository, RepositoryError, Subscription},
};

/// Subscription as persisted, referencing its feed by ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubscriptionRecord {
    id: u64,
    guild_id: u64,
    channel_id: u64,
    feed_id: u64,
    #[serde(default)]
    overwrite: Overwrite,
}

/// Everything persisted in the storage file.
///
/// ID counters are persisted too, so IDs are never handed out twice even after
/// a record is deleted and the bot restarted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct State {
    last_feed_id: u64,
    last_subscription_id: u64,
    feeds: BTreeMap<u64, Feed>,
    subscriptions: BTreeMap<u64, SubscriptionRecord>,
    guilds: BTreeMap<u64, GuildConfig>,
}

impl State {
    fn subscription(&self, record: &SubscriptionRecord) -> Result<Subscription, RepositoryError> {
        let feed = self
            .feeds
            .get(&record.feed_id)
            .ok_or(RepositoryError::NotFound)?;

        Ok(Subscription {
            id: record.id,
            guild_id: record.guild_id,
            channel_id: record.channel_id,
            feed: feed.clone(),
            overwrite: record.overwrite,
        })
    }

    /// Finds another subscription delivering the same feed to the same channel of the guild.
    fn duplicate(
        &self,
        id: Option<u64>,
        feed_id: u64,
        channel_id: u64,
        guild_id: u64,
    ) -> Option<&SubscriptionRecord> {
        self.subscriptions.values().find(|s| {
            Some(s.id) != id
                && s.feed_id == feed_id
                && s.channel_id == channel_id
                && s.guild_id == guild_id
        })
    }

    fn record_mut(&mut self, id: u64) -> Result<&mut SubscriptionRecord, RepositoryError> {
        self.subscriptions
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)
    }

    fn guild_mut(&mut self, guild_id: u64) -> Result<&mut GuildConfig, RepositoryError> {
        self.guilds
            .get_mut(&guild_id)
            .ok_or(RepositoryError::NotFound)
    }
}

/// Repository persisting feeds, subscriptions and guild configurations to a JSON file.
///
/// # Examples
///
/// ```no_run
/// use feedbot::store::{JsonStore, Repository};
///
/// # async fn example() -> Result<(), feedbot::store::RepositoryError> {
/// let store = JsonStore::open("./data/feedbot.json").await?;
/// let feed = store.get_or_create_feed("https://example.com/feed.xml").await?;
/// let subscription = store.add_subscription(1234, 42, feed.id).await?;
/// println!("subscription #{} created", subscription.id);
/// # Ok(())
/// # }
/// ```
pub struct JsonStore {
    /// Path of the storage file
    path: PathBuf,
    /// Current state, guarded for concurrent handlers
    state: Mutex<State>,
}

impl JsonStore {
    /// Opens the store, loading the storage file if it exists.
    ///
    /// A missing file starts an empty store. A file that cannot be read or
    /// decoded is an error: the store refuses to start rather than overwrite it.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref().to_path_buf();

        let state = match fs::read_to_string(&path).await {
            Ok(serialized) => {
                let state: State = serde_json::from_str(&serialized)?;
                info!(
                    "loaded {} feeds, {} subscriptions and {} guilds from {}",
                    state.feeds.len(),
                    state.subscriptions.len(),
                    state.guilds.len(),
                    path.display()
                );
                state
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("no storage file at {}, starting empty", path.display());
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).await?;
                }
                State::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(JsonStore {
            path,
            state: Mutex::new(state),
        })
    }

    /// Writes the state to a temporary file and moves it over the storage file.
    async fn persist(&self, state: &State) -> Result<(), RepositoryError> {
        let serialized = serde_json::to_string_pretty(state)?;
        let tmp_path = self.path.with_extension("tmp");

        fs::write(&tmp_path, serialized).await?;
        fs::rename(&tmp_path, &self.path).await?;

        debug!("persisted storage to {}", self.path.display());
        Ok(())
    }

    /// Applies a change to a copy of the state, persists it, then commits it.
    async fn mutate<T, F>(&self, change: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut State) -> Result<T, RepositoryError> + Send,
    {
        let mut state = self.state.lock().await;
        let mut next = state.clone();

        let value = change(&mut next)?;
        self.persist(&next).await?;
        *state = next;

        Ok(value)
    }
}

#[async_trait]
impl Repository for JsonStore {
    async fn get_or_create_feed(&self, uri: &str) -> Result<Feed, RepositoryError> {
        let mut state = self.state.lock().await;
        if let Some(feed) = state.feeds.values().find(|f| f.uri == uri) {
            return Ok(feed.clone());
        }

        let mut next = state.clone();
        next.last_feed_id += 1;
        let feed = Feed {
            id: next.last_feed_id,
            uri: uri.to_owned(),
        };
        next.feeds.insert(feed.id, feed.clone());
        self.persist(&next).await?;
        *state = next;

        info!("created feed {} for {}", feed.id, feed.uri);
        Ok(feed)
    }

    async fn add_subscription(
        &self,
        channel_id: u64,
        guild_id: u64,
        feed_id: u64,
    ) -> Result<Subscription, RepositoryError> {
        self.mutate(|state| {
            if !state.feeds.contains_key(&feed_id) {
                return Err(RepositoryError::NotFound);
            }

            if let Some(record) = state.duplicate(None, feed_id, channel_id, guild_id) {
                let subscription = state.subscription(record)?;
                return Err(RepositoryError::SubscriptionExists(Box::new(subscription)));
            }

            state.last_subscription_id += 1;
            let record = SubscriptionRecord {
                id: state.last_subscription_id,
                guild_id,
                channel_id,
                feed_id,
                overwrite: Overwrite::default(),
            };
            let subscription = state.subscription(&record)?;
            state.subscriptions.insert(record.id, record);

            Ok(subscription)
        })
        .await
    }

    async fn get_subscription(&self, id: u64) -> Result<Subscription, RepositoryError> {
        let state = self.state.lock().await;
        let record = state
            .subscriptions
            .get(&id)
            .ok_or(RepositoryError::NotFound)?;
        state.subscription(record)
    }

    async fn destroy_subscription(&self, id: u64) -> Result<(), RepositoryError> {
        self.mutate(|state| {
            state
                .subscriptions
                .remove(&id)
                .map(|_| ())
                .ok_or(RepositoryError::NotFound)
        })
        .await
    }

    async fn get_subscriptions(&self, guild_id: u64) -> Result<Vec<Subscription>, RepositoryError> {
        let state = self.state.lock().await;
        state
            .subscriptions
            .values()
            .filter(|record| record.guild_id == guild_id)
            .map(|record| state.subscription(record))
            .collect()
    }

    async fn get_guild_config(&self, guild_id: u64) -> Result<GuildConfig, RepositoryError> {
        let state = self.state.lock().await;
        state
            .guilds
            .get(&guild_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_guild_config(
        &self,
        guild_id: u64,
        contact: Contact,
    ) -> Result<GuildConfig, RepositoryError> {
        self.mutate(|state| {
            let config = GuildConfig {
                guild_id,
                contact,
                embeds: false,
                webhooks: false,
            };
            state.guilds.insert(guild_id, config.clone());
            Ok(config)
        })
        .await
    }

    async fn modify_subscription_channel(
        &self,
        id: u64,
        channel_id: u64,
    ) -> Result<(), RepositoryError> {
        self.mutate(|state| {
            let record = state
                .subscriptions
                .get(&id)
                .ok_or(RepositoryError::NotFound)?;
            if let Some(existing) =
                state.duplicate(Some(id), record.feed_id, channel_id, record.guild_id)
            {
                let subscription = state.subscription(existing)?;
                return Err(RepositoryError::SubscriptionExists(Box::new(subscription)));
            }

            state.record_mut(id)?.channel_id = channel_id;
            Ok(())
        })
        .await
    }

    async fn modify_guild_contact(
        &self,
        guild_id: u64,
        contact: Contact,
    ) -> Result<(), RepositoryError> {
        self.mutate(|state| {
            state.guild_mut(guild_id)?.contact = contact;
            Ok(())
        })
        .await
    }

    async fn modify_guild_embeds(
        &self,
        guild_id: u64,
        enabled: bool,
    ) -> Result<(), RepositoryError> {
        self.mutate(|state| {
            state.guild_mut(guild_id)?.embeds = enabled;
            Ok(())
        })
        .await
    }

    async fn modify_guild_webhooks(
        &self,
        guild_id: u64,
        enabled: bool,
    ) -> Result<(), RepositoryError> {
        self.mutate(|state| {
            state.guild_mut(guild_id)?.webhooks = enabled;
            Ok(())
        })
        .await
    }

    async fn modify_overwrite_embeds(&self, id: u64, value: Toggle) -> Result<(), RepositoryError> {
        self.mutate(|state| {
            state.record_mut(id)?.overwrite.embeds = value;
            Ok(())
        })
        .await
    }

    async fn modify_overwrite_webhooks(
        &self,
        id: u64,
        value: Toggle,
    ) -> Result<(), RepositoryError> {
        self.mutate(|state| {
            state.record_mut(id)?.overwrite.webhooks = value;
            Ok(())
        })
        .await
    }
}
