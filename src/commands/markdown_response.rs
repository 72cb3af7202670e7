//! Markdown response formatters for bot commands.
//!
//! Every reply sent by the command handlers is built here, so the wording of the
//! bot stays in one place.

use crate::{
    commands::command::PREFIX,
    settings::{Setting, Toggle, format_flag},
    store::{GuildConfig, Subscription},
};

/// Maximum length of a `list` reply page, below Discord's 2000 characters limit.
pub const LIST_FLUSH_THRESHOLD: usize = 1900;

/// Formats the help message.
pub fn format_help() -> String {
    format!(
        "**feedbot**\n\n\
        **commands:** (mention the bot or prefix commands with `{PREFIX}`)\n\
        - `help`: print this message\n\
        - `add <uri> [channel]`: subscribe to a RSS feed by its URI, updates go to the given channel or to this one\n\
        - `remove <id>`: remove a subscription by its ID (see `list`)\n\
        - `list`: list the subscriptions of this guild and its configuration\n\
        - `set channel <id> [channel]`: move a subscription to the given channel or to this one\n\
        - `set contact <user|channel>`: set the emergency contact of this guild, the server owner by default\n\
        - `set embed <on|off|inherit> [id]`: enable or disable embeds for this guild, or for a single subscription\n\
        - `set webhook <on|off|inherit> [id]`: enable or disable webhooks for this guild, or for a single subscription\n\n\
        `inherit` is only valid for a single subscription, it restores the guild behavior.\n\n\
        **how it works:**\n\
        feedbot polls the subscribed feeds regularly. When a feed has new content, every subscribed channel receives an update.\n\n\
        **permissions:**\n\
        feedbot only answers to members holding the **ADMINISTRATOR** permission.\n\
        feedbot needs **READ MESSAGES** and **SEND MESSAGES**, plus **EMBED LINKS** when embeds are enabled \
        and **MANAGE WEBHOOKS** when webhooks are enabled.\n\n\
        **emergency contact:**\n\
        when a permission is missing or a feed is broken, feedbot notifies the emergency contact."
    )
}

pub fn format_admin_only() -> String {
    "Sorry, feedbot requires the **ADMINISTRATOR** privilege!".to_owned()
}

pub fn format_add_usage() -> String {
    "**usage:** `add <uri> [channel]`; please omit spaces from arguments!".to_owned()
}

pub fn format_remove_usage() -> String {
    "**usage:** `remove <id>`; please omit spaces from arguments!".to_owned()
}

pub fn format_set_usage() -> String {
    "**usage:** `set <channel|contact|embed|webhook> ...`, see the help command.".to_owned()
}

pub fn format_unknown_set() -> String {
    "subcommand must be one of channel|contact|embed|webhook, see the help command.".to_owned()
}

pub fn format_set_channel_usage() -> String {
    "**usage:** `set channel <id> [channel]`; please omit spaces from arguments!".to_owned()
}

pub fn format_set_contact_usage() -> String {
    "**usage:** `set contact <user|channel>`; please use a user mention, user id, or channel mention, and omit spaces."
        .to_owned()
}

pub fn format_set_toggle_usage(setting: Setting) -> String {
    format!("**usage:** `set {} <on|off|inherit> [id]`", setting.command())
}

/// Formats the rejection of a channel argument that is not a `<#id>` mention.
pub fn format_channel_mention_required() -> String {
    "when specifying a channel, please use a #channel mention!".to_owned()
}

pub fn format_foreign_channel() -> String {
    "that channel does not belong to this guild.".to_owned()
}

pub fn format_id_not_a_number() -> String {
    "`id` must be a number!".to_owned()
}

pub fn format_subscription_not_found() -> String {
    "could not find a subscription with that ID, check the list again?".to_owned()
}

/// Formats the rejection of a subscription owned by another guild.
pub fn format_subscription_foreign(id: u64) -> String {
    format!("subscription #{id} does not exist in this guild.")
}

pub fn format_subscription_created(id: u64) -> String {
    format!("subscription #{id} created!")
}

pub fn format_subscription_exists(id: u64) -> String {
    format!("this subscription (#{id}) already exists!")
}

pub fn format_subscription_deleted(id: u64) -> String {
    format!("subscription #{id} has been deleted.")
}

pub fn format_subscription_moved(id: u64, channel_id: u64) -> String {
    format!("subscription #{id} will now write to <#{channel_id}>")
}

pub fn format_invalid_contact() -> String {
    "contact must be a user mention, user id, or channel mention; not a user name or channel name."
        .to_owned()
}

pub fn format_contact_changed() -> String {
    "the guild's contact has been changed.".to_owned()
}

pub fn format_invalid_toggle() -> String {
    "parameter must be one of on|off|inherit".to_owned()
}

/// Formats the rejection of `inherit` as a guild-wide value.
pub fn format_inherit_requires_subscription() -> String {
    "`inherit` is only a valid flag on a subscription, please specify on|off".to_owned()
}

/// Formats the confirmation of a guild-wide setting change.
pub fn format_guild_setting_changed(setting: Setting, enabled: bool) -> String {
    if enabled {
        format!(
            "feedbot will now post updates in this guild using {}, unless overridden by a subscription.",
            setting.noun()
        )
    } else {
        format!(
            "feedbot will no longer post updates in this guild using {}, unless overridden by a subscription.",
            setting.noun()
        )
    }
}

/// Formats the confirmation of a subscription override change.
pub fn format_subscription_setting_changed(setting: Setting, id: u64, value: Toggle) -> String {
    match value {
        Toggle::On => format!(
            "subscription #{id} will now post updates using {}.",
            setting.noun()
        ),
        Toggle::Off => format!(
            "subscription #{id} will no longer post updates using {}.",
            setting.noun()
        ),
        Toggle::Inherit => format!(
            "subscription #{id} will follow the guild-wide behavior for {}.",
            setting.noun()
        ),
    }
}

pub fn format_guild_config_reset() -> String {
    "the guild configuration has been recreated with the server owner as contact.".to_owned()
}

/// Formats the header of the `list` output: guild configuration and table header.
pub fn format_list_header(config: &GuildConfig) -> String {
    format!(
        "**Guild Contact:** `{}`\n**Embeds?** {}\n**Webhooks?** {}\n\n**Sub ID | Channel | Feed URI | Embed? | Webhook?**\n\n",
        config.contact,
        format_flag(config.embeds),
        format_flag(config.webhooks)
    )
}

/// Formats one subscription row of the `list` output.
///
/// Overrides are shown as set, followed by the effective value when inherited.
pub fn format_list_row(subscription: &Subscription, config: &GuildConfig) -> String {
    format!(
        "{} | <#{}> | `{}` | {} | {}\n",
        subscription.id,
        subscription.channel_id,
        subscription.feed.uri,
        format_override(subscription.overwrite.get(Setting::Embeds), config.embeds),
        format_override(subscription.overwrite.get(Setting::Webhooks), config.webhooks)
    )
}

fn format_override(value: Toggle, guild_default: bool) -> String {
    match value {
        Toggle::Inherit => format!("inherit ({})", format_flag(value.resolve(guild_default))),
        _ => value.to_string(),
    }
}
