//! Guild emergency contact.
//!
//! The emergency contact is notified when a feed breaks or when feedbot lacks a
//! permission it needs. It is either a user or a channel. The contact is
//! persisted with its historical tagged form, `u:<id>` or `c:<id>`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::utils::{parse_channel_mention, parse_id};

/// Reference to the user or channel notified on delivery failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Contact {
    /// A guild channel
    Channel(u64),
    /// A user, notified through a mention
    User(u64),
}

/// Error returned when a stored contact is not in the `u:<id>`/`c:<id>` form.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid contact reference: {0}")]
pub struct InvalidContact(String);

impl Contact {
    /// Resolves a `set contact` argument into a contact.
    ///
    /// Strategies are tried in a fixed order:
    /// 1. a `<#id>` channel mention in the token
    /// 2. the first user mentioned by the message
    /// 3. the token as a bare numeric user ID
    ///
    /// Anything else (user names, channel names) is rejected with `None`.
    ///
    /// # Arguments
    ///
    /// * `token` - The raw argument token
    /// * `mentions` - User IDs mentioned by the invoking message, in order
    pub fn resolve(token: &str, mentions: &[u64]) -> Option<Self> {
        if let Some(channel_id) = parse_channel_mention(token) {
            return Some(Contact::Channel(channel_id));
        }
        if let Some(user_id) = mentions.first() {
            return Some(Contact::User(*user_id));
        }
        parse_id(token).map(Contact::User)
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contact::Channel(id) => write!(f, "c:{id}"),
            Contact::User(id) => write!(f, "u:{id}"),
        }
    }
}

impl FromStr for Contact {
    type Err = InvalidContact;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidContact(value.to_owned());
        let (tag, id) = value.split_once(':').ok_or_else(invalid)?;
        let id = parse_id(id).ok_or_else(invalid)?;
        match tag {
            "c" => Ok(Contact::Channel(id)),
            "u" => Ok(Contact::User(id)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Contact {
    type Error = InvalidContact;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Contact> for String {
    fn from(contact: Contact) -> Self {
        contact.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_channel_mention() {
        assert_eq!(Contact::resolve("<#42>", &[]), Some(Contact::Channel(42)));
    }

    #[test]
    fn test_resolve_channel_mention_beats_user_mention() {
        assert_eq!(
            Contact::resolve("<#42>", &[7, 8]),
            Some(Contact::Channel(42))
        );
    }

    #[test]
    fn test_resolve_user_mention_beats_numeric_id() {
        assert_eq!(Contact::resolve("1234", &[7]), Some(Contact::User(7)));
        assert_eq!(Contact::resolve("<@7>", &[7]), Some(Contact::User(7)));
    }

    #[test]
    fn test_resolve_numeric_id() {
        assert_eq!(Contact::resolve("1234", &[]), Some(Contact::User(1234)));
    }

    #[test]
    fn test_resolve_rejects_names() {
        assert_eq!(Contact::resolve("alice", &[]), None);
        assert_eq!(Contact::resolve("#general", &[]), None);
        assert_eq!(Contact::resolve("@alice", &[]), None);
    }

    #[test]
    fn test_tagged_form() {
        assert_eq!(Contact::Channel(5).to_string(), "c:5");
        assert_eq!(Contact::User(6).to_string(), "u:6");
        assert_eq!("c:5".parse(), Ok(Contact::Channel(5)));
        assert_eq!("u:6".parse(), Ok(Contact::User(6)));
    }

    #[test]
    fn test_tagged_form_rejects_garbage() {
        assert!("x:5".parse::<Contact>().is_err());
        assert!("u:".parse::<Contact>().is_err());
        assert!("5".parse::<Contact>().is_err());
    }

    #[test]
    fn test_serde_uses_tagged_form() {
        let json = serde_json::to_string(&Contact::User(9)).unwrap();
        assert_eq!(json, "\"u:9\"");
        let contact: Contact = serde_json::from_str("\"c:3\"").unwrap();
        assert_eq!(contact, Contact::Channel(3));
        assert!(serde_json::from_str::<Contact>("\"z:3\"").is_err());
    }
}
