//! Tri-state delivery settings.
//!
//! A subscription can override a guild-wide delivery setting (embeds, webhooks)
//! with a [`Toggle`]. Guild defaults are plain `bool`s, so a guild can never be
//! configured to `inherit`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Per-subscription override of a guild-wide boolean setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    /// Defer to the guild default
    #[default]
    Inherit,
    /// Force the setting on
    On,
    /// Force the setting off
    Off,
}

/// Error returned when a token is not one of `on`, `off` or `inherit`.
#[derive(Debug, PartialEq, Eq)]
pub struct InvalidToggle;

impl Toggle {
    /// Returns the definite value carried by the toggle, `None` for [`Toggle::Inherit`].
    pub fn definite(self) -> Option<bool> {
        match self {
            Toggle::Inherit => None,
            Toggle::On => Some(true),
            Toggle::Off => Some(false),
        }
    }

    /// Computes the effective value of the setting.
    ///
    /// The override wins whenever it is definite, otherwise the guild default applies.
    /// There is exactly one fallback hop.
    ///
    /// # Examples
    ///
    /// ```
    /// # use feedbot::settings::Toggle;
    /// assert!(Toggle::On.resolve(false));
    /// assert!(!Toggle::Off.resolve(true));
    /// assert!(Toggle::Inherit.resolve(true));
    /// ```
    pub fn resolve(self, guild_default: bool) -> bool {
        self.definite().unwrap_or(guild_default)
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value { Toggle::On } else { Toggle::Off }
    }
}

impl FromStr for Toggle {
    type Err = InvalidToggle;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "on" => Ok(Toggle::On),
            "off" => Ok(Toggle::Off),
            "inherit" => Ok(Toggle::Inherit),
            _ => Err(InvalidToggle),
        }
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Toggle::Inherit => "inherit",
            Toggle::On => "on",
            Toggle::Off => "off",
        };
        f.write_str(token)
    }
}

/// Formats a definite guild default with the same vocabulary as [`Toggle`].
pub fn format_flag(value: bool) -> String {
    Toggle::from(value).to_string()
}
