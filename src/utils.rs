//! Parsing helpers for Discord argument tokens.
//!
//! Discord references channels with the `<#id>` mention syntax and every entity
//! with a numeric snowflake. Bare channel or user names are never accepted since
//! they are neither unique nor stable.

use std::sync::LazyLock;

use regex::Regex;

static CHANNEL_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<#(\d+)>$").expect("channel mention pattern is valid")
});

/// Extracts the channel ID from a `<#id>` channel mention.
///
/// Returns `None` when the token is not exactly a channel mention.
///
/// # Examples
///
/// ```
/// # use feedbot::utils::parse_channel_mention;
/// assert_eq!(parse_channel_mention("<#1234>"), Some(1234));
/// assert_eq!(parse_channel_mention("#general"), None);
/// ```
pub fn parse_channel_mention(token: &str) -> Option<u64> {
    CHANNEL_MENTION
        .captures(token)
        .and_then(|captures| captures[1].parse().ok())
}

/// Parses a plain numeric identifier (snowflake or subscription ID).
pub fn parse_id(token: &str) -> Option<u64> {
    token.parse().ok()
}
