//! Command recognition and tokenization.
//!
//! This module turns raw message text into an [`Invocation`]: the [`Verb`] to run
//! and its positional arguments. A message invokes the bot when it starts with the
//! bot's own mention or with the literal [`PREFIX`].

use log::debug;

/// Literal prefix invoking the bot without mentioning it.
pub const PREFIX: &str = "/feed:";

/// A command verb.
///
/// Verbs are matched case-sensitively against their exact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Display help information
    Help,
    /// Subscribe a channel to a feed
    Add,
    /// Delete a subscription
    Remove,
    /// List the guild configuration and subscriptions
    List,
    /// Change a guild or subscription setting
    Set,
    /// Operator-only maintenance: rebuild the guild configuration
    Migrate,
}

impl Verb {
    /// Looks up the verb named by a token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "help" => Some(Verb::Help),
            "add" => Some(Verb::Add),
            "remove" => Some(Verb::Remove),
            "list" => Some(Verb::List),
            "set" => Some(Verb::Set),
            "dbg~migrate" => Some(Verb::Migrate),
            _ => None,
        }
    }

    /// Name of the verb as typed by users.
    pub fn name(self) -> &'static str {
        match self {
            Verb::Help => "help",
            Verb::Add => "add",
            Verb::Remove => "remove",
            Verb::List => "list",
            Verb::Set => "set",
            Verb::Migrate => "dbg~migrate",
        }
    }
}

/// A recognized command: verb plus positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub verb: Verb,
    /// Arguments following the verb, split on single spaces
    pub args: Vec<String>,
}

/// Reasons a message is not dispatched.
///
/// None of them produce a reply: unrelated messages and mentions stay silent.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandParsingError {
    /// The message starts with neither the mention nor the prefix
    NotInvoked,
    /// Nothing follows the invocation prefix
    Empty,
    /// The verb is not known
    Unknown(String),
}

impl Invocation {
    /// Parses a message into an invocation.
    ///
    /// The mention form is tried first and tolerates one space between the
    /// mention and the verb. The remaining text is split on single spaces: the
    /// first token is the verb, the others are arguments.
    ///
    /// # Arguments
    ///
    /// * `content` - The raw message text
    /// * `mention` - The bot's own mention string, `None` until the session is ready
    ///
    /// # Examples
    ///
    /// ```
    /// # use feedbot::commands::command::{Invocation, Verb};
    /// let invocation = Invocation::parse("/feed:remove 7", None).unwrap();
    /// assert_eq!(invocation.verb, Verb::Remove);
    /// assert_eq!(invocation.args, vec!["7".to_string()]);
    /// ```
    pub fn parse(content: &str, mention: Option<&str>) -> Result<Self, CommandParsingError> {
        let rest = match mention.and_then(|m| content.strip_prefix(m)) {
            Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
            None => content
                .strip_prefix(PREFIX)
                .ok_or(CommandParsingError::NotInvoked)?,
        };

        if rest.is_empty() {
            return Err(CommandParsingError::Empty);
        }

        let mut tokens = rest.split(' ');
        let verb_token = tokens.next().unwrap_or_default();
        let Some(verb) = Verb::from_token(verb_token) else {
            return Err(CommandParsingError::Unknown(verb_token.to_owned()));
        };
        let args: Vec<String> = tokens.map(str::to_owned).collect();

        debug!("parsed command {} with args {:?}", verb.name(), args);

        Ok(Invocation { verb, args })
    }
}
