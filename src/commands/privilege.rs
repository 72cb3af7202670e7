//! Administrator permission check.
//!
//! Only guild members holding a role with the `ADMINISTRATOR` permission may
//! manage subscriptions. The check is a pure predicate: callers decide what to
//! reply when it fails.

use log::debug;

use crate::discord::{Directory, PlatformError};

/// Returns whether a user holds the administrator permission in a guild.
///
/// The member and each of their roles are resolved through the [`Directory`].
/// Any resolution failure is an error, never an implicit authorization.
///
/// # Arguments
///
/// * `directory` - Member and role lookups
/// * `guild_id` - Guild the command was issued in
/// * `user_id` - Author of the command
pub async fn is_administrator(
    directory: &dyn Directory,
    guild_id: u64,
    user_id: u64,
) -> Result<bool, PlatformError> {
    let member = directory.resolve_member(guild_id, user_id).await?;

    for role_id in &member.roles {
        let role = directory.resolve_role(guild_id, *role_id).await?;
        if role.is_administrator() {
            debug!("user {} is administrator of guild {} through role {}", user_id, guild_id, role.id);
            return Ok(true);
        }
    }

    debug!("user {} is not administrator of guild {}", user_id, guild_id);
    Ok(false)
}
