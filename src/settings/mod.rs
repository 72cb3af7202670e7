//! Guild and subscription delivery settings.
//!
//! - [`toggle`] - tri-state per-subscription overrides and their resolution
//!   against guild defaults
//! - [`contact`] - the guild emergency contact and its argument resolution

mod contact;
mod toggle;

pub use crate::settings::contact::Contact;
pub use crate::settings::toggle::{Toggle, format_flag};

/// A guild-wide delivery setting that subscriptions can override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    /// Post updates as rich embeds
    Embeds,
    /// Post updates through a channel webhook
    Webhooks,
}

impl Setting {
    /// Name of the `set` subcommand controlling this setting.
    pub fn command(self) -> &'static str {
        match self {
            Setting::Embeds => "embed",
            Setting::Webhooks => "webhook",
        }
    }

    /// Plural noun used in replies.
    pub fn noun(self) -> &'static str {
        match self {
            Setting::Embeds => "embeds",
            Setting::Webhooks => "webhooks",
        }
    }
}
