//! Gateway event handler.

use std::sync::Arc;

use log::{debug, error, info, warn};
use serenity::{
    async_trait,
    model::{channel::Message, gateway::Ready},
    prelude::*,
};

use crate::{
    commands::{Commander, Dispatch, Identity},
    discord::InboundMessage,
};

/// Client data key holding the shared [`Commander`].
pub struct CommanderKey;

impl TypeMapKey for CommanderKey {
    type Value = Arc<Commander>;
}

/// Serenity event handler feeding gateway events to the [`Commander`].
pub struct Handler;

impl Handler {
    async fn commander(ctx: &Context) -> Option<Arc<Commander>> {
        let data = ctx.data.read().await;
        let commander = data.get::<CommanderKey>().cloned();
        if commander.is_none() {
            error!("commander not found in client data");
        }
        commander
    }
}

fn inbound_message(message: &Message) -> InboundMessage {
    InboundMessage {
        author_id: message.author.id.get(),
        author_is_bot: message.author.bot,
        guild_id: message.guild_id.map(|id| id.get()),
        channel_id: message.channel_id.get(),
        content: message.content.clone(),
        mentions: message.mentions.iter().map(|user| user.id.get()).collect(),
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("connected to discord as {}", ready.user.name);

        let Some(commander) = Handler::commander(&ctx).await else {
            return;
        };
        let session = commander.session();
        session.init_identity(Identity::new(ready.user.id.get()));

        if session.has_operator() {
            return;
        }
        match ctx.http.get_current_application_info().await {
            Ok(application) => match application.owner {
                Some(owner) => session.init_operator(owner.id.get()),
                None => warn!("application has no owner, maintenance commands are disabled"),
            },
            Err(e) => error!("failed to fetch application info: {}", e),
        }
    }

    async fn message(&self, ctx: Context, message: Message) {
        if message.author.bot {
            return;
        }

        let Some(commander) = Handler::commander(&ctx).await else {
            return;
        };

        let outcome = commander.dispatch(inbound_message(&message)).await;
        if outcome != Dispatch::Ignored {
            debug!("message {} dispatched: {:?}", message.id, outcome);
        }
    }
}
