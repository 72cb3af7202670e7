//! Bot wiring: storage, Discord client and command dispatch.

use std::{path::Path, sync::Arc};

use log::info;
use serenity::{client::Client, model::gateway::GatewayIntents};

use crate::{
    Args,
    commands::{Commander, Services, Session},
    config::Config,
    discord::{CommanderKey, DiscordPlatform, Handler},
    store::JsonStore,
};

/// Name of the storage file inside the data directory.
const STORE_FILE: &str = "feedbot.json";

pub struct Bot {
    config: Config,

    store: Arc<JsonStore>,
}

impl Bot {
    /// Opens the storage from the data directory.
    ///
    /// Fails when the storage file exists but cannot be read or decoded.
    pub async fn new(config: Config, args: Args) -> Result<Self, anyhow::Error> {
        let store_path = Path::new(&args.data).join(STORE_FILE);
        let store = Arc::new(JsonStore::open(&store_path).await?);
        info!("using storage file {}", store_path.display());

        Ok(Bot { config, store })
    }

    /// Connects to the Discord gateway and processes events until the client stops.
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let intents =
            GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

        let mut client = Client::builder(&self.config.discord.token, intents)
            .event_handler(Handler)
            .await?;

        let platform = Arc::new(DiscordPlatform::new(
            client.cache.clone(),
            client.http.clone(),
            self.config.discord.request_timeout(),
        ));
        let services = Services {
            transport: platform.clone(),
            directory: platform,
            repository: self.store,
        };
        let session = Session::with_operator(self.config.discord.operator_id);
        let commander = Arc::new(Commander::new(services, session));

        {
            let mut data = client.data.write().await;
            data.insert::<CommanderKey>(commander);
        }

        info!("connecting to discord");
        client.start().await?;

        Ok(())
    }
}
