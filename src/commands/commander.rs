//! Command orchestration and execution.
//!
//! This module provides the [`Commander`] struct, the single entry point for
//! inbound messages. It recognizes invocations, routes verbs to their handlers
//! and sends the replies back to the originating channel.
//!
//! # Flow
//!
//! ```text
//! InboundMessage → dispatch() → Invocation → handle_*() → CommandResult → send_message()
//! ```
//!
//! # Fault Boundary
//!
//! Each execution runs behind [`FutureExt::catch_unwind`]: an error or a panic
//! in a handler is logged with the verb and never reaches the gateway loop.
//! Nothing is replied to the user in that case.

use std::{any::Any, panic::AssertUnwindSafe};

use futures::FutureExt;
use log::{debug, error};

use crate::{
    commands::{
        CommandContext, CommandResult, Services,
        actions::{
            handle_add, handle_help, handle_list, handle_migrate, handle_remove, handle_set,
        },
        command::{CommandParsingError, Invocation, Verb},
        session::Session,
    },
    discord::InboundMessage,
};

/// Outcome of a dispatched message, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The message is not a command for this bot
    Ignored,
    /// The handler ran and its replies were sent
    Handled(Verb),
    /// The handler or a reply failed with an error
    Failed(Verb),
    /// The handler panicked
    Panicked(Verb),
}

/// Command orchestrator shared by every message event.
///
/// # Supported Commands
///
/// - `help` - Display help information
/// - `add <uri> [channel]` - Subscribe a channel to a feed
/// - `remove <id>` - Delete a subscription
/// - `list` - List the guild configuration and subscriptions
/// - `set <channel|contact|embed|webhook> ...` - Change settings
/// - `dbg~migrate` - Operator-only guild configuration reset
pub struct Commander {
    services: Services,
    session: Session,
}

impl Commander {
    pub fn new(services: Services, session: Session) -> Self {
        Commander { services, session }
    }

    /// Session state, initialized by the gateway ready event.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Processes an inbound message.
    ///
    /// Messages from bots, from outside a guild, or not invoking the bot are
    /// ignored silently. Recognized commands run inside the fault boundary.
    ///
    /// # Arguments
    ///
    /// * `message` - The message as received from the gateway
    ///
    /// # Returns
    ///
    /// * `Dispatch::Ignored` - Not a command for this bot, nothing was sent
    /// * `Dispatch::Handled(verb)` - The handler ran and every reply was sent
    /// * `Dispatch::Failed(verb)` - The handler or a reply failed, the error was logged
    /// * `Dispatch::Panicked(verb)` - The handler panicked, the panic was logged
    ///
    /// # Examples
    ///
    /// ```
    /// # use feedbot::{commands::{Commander, Dispatch}, discord::InboundMessage};
    /// # async fn run(commander: &Commander) {
    /// let message = InboundMessage {
    ///     author_id: 400,
    ///     author_is_bot: false,
    ///     guild_id: Some(100),
    ///     channel_id: 300,
    ///     content: "/feed:help".to_string(),
    ///     mentions: vec![],
    /// };
    ///
    /// let outcome = commander.dispatch(message).await;
    /// assert!(matches!(outcome, Dispatch::Handled(_)));
    /// # }
    /// ```
    pub async fn dispatch(&self, message: InboundMessage) -> Dispatch {
        if message.author_is_bot {
            return Dispatch::Ignored;
        }

        let identity = self.session.identity();
        let invocation = match Invocation::parse(
            &message.content,
            identity.map(|identity| identity.mention.as_str()),
        ) {
            Ok(invocation) => invocation,
            Err(CommandParsingError::Unknown(verb)) => {
                debug!("ignoring unknown command {:?}", verb);
                return Dispatch::Ignored;
            }
            Err(_) => return Dispatch::Ignored,
        };

        let Some(guild_id) = message.guild_id else {
            debug!(
                "ignoring {} command outside of a guild",
                invocation.verb.name()
            );
            return Dispatch::Ignored;
        };

        let bot_id = identity.map(|identity| identity.user_id);
        let context = CommandContext {
            guild_id,
            channel_id: message.channel_id,
            author_id: message.author_id,
            mentions: message
                .mentions
                .into_iter()
                .filter(|id| Some(*id) != bot_id)
                .collect(),
            args: invocation.args,
            is_operator: self.session.operator() == Some(message.author_id),
        };
        let verb = invocation.verb;

        match AssertUnwindSafe(self.execute(verb, &context))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => Dispatch::Handled(verb),
            Ok(Err(e)) => {
                error!("cmd:{} err:{:?}", verb.name(), e);
                Dispatch::Failed(verb)
            }
            Err(panic) => {
                error!("cmd:{} panic:{}", verb.name(), panic_detail(panic.as_ref()));
                Dispatch::Panicked(verb)
            }
        }
    }

    /// Runs the handler of a verb and sends its replies in order.
    async fn execute(&self, verb: Verb, context: &CommandContext) -> anyhow::Result<()> {
        let result: CommandResult = match verb {
            Verb::Help => handle_help(),
            Verb::Add => handle_add(&self.services, context).await?,
            Verb::Remove => handle_remove(&self.services, context).await?,
            Verb::List => handle_list(&self.services, context).await?,
            Verb::Set => handle_set(&self.services, context).await?,
            Verb::Migrate => handle_migrate(&self.services, context).await?,
        };

        for reply in &result.replies {
            self.services
                .transport
                .send_message(context.channel_id, reply)
                .await?;
        }

        Ok(())
    }
}

fn panic_detail(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
