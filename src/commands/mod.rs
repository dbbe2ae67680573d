// commands/mod.rs - Command Module Registry
// Declares the command groups and the helpers they share

pub mod badwords;       // Word filter management (staff)
pub mod general;        // ping and help
pub mod owner;          // Update script runner (owner only)
pub mod sticky;         // Sticky role management (staff)
pub mod tags;           // Tag lookup and management

use crate::config::BotConfig;
use crate::error::StoreError;
use crate::moderation::author_is_staff;
use once_cell::sync::Lazy;
use regex::Regex;
use serenity::{
    client::Context,
    framework::standard::{CommandError, CommandGroup, CommandResult},
    model::channel::Message,
    prelude::TypeMapKey,
};
use std::sync::Arc;

static ROLE_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:<@&(\d+)>|(\d+))$").unwrap());
static USER_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:<@!?(\d+)>|(\d+))$").unwrap());

fn captured_id(re: &Regex, arg: &str) -> Option<u64> {
    let caps = re.captures(arg.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

/// `<@&123>` or a bare id
pub fn parse_role_id(arg: &str) -> Option<u64> {
    captured_id(&ROLE_MENTION, arg)
}

/// The @everyone role shares its id with the guild and can't be stickied.
pub fn is_everyone_role(guild_id: Option<u64>, role_id: u64) -> bool {
    guild_id == Some(role_id)
}

/// `<@123>`, `<@!123>` or a bare id
pub fn parse_user_id(arg: &str) -> Option<u64> {
    captured_id(&USER_MENTION, arg)
}

/// Fetch a shared value registered in the client's TypeMap.
pub async fn shared<K>(ctx: &Context) -> Result<K::Value, CommandError>
where
    K: TypeMapKey,
    K::Value: Clone,
{
    let data = ctx.data.read().await;
    data.get::<K>()
        .cloned()
        .ok_or_else(|| CommandError::from("bot state is not initialised"))
}

/// Replies with an access-denied message and returns false when the author is not staff.
pub async fn require_staff(ctx: &Context, msg: &Message, config: &Arc<BotConfig>) -> Result<bool, CommandError> {
    if author_is_staff(ctx, msg, config).await {
        return Ok(true);
    }

    log::warn!(
        "🔒 {} ({}) tried a staff command: {}",
        msg.author.name,
        msg.author.id,
        msg.content
    );
    msg.reply(ctx, "❌ **Access Denied**\nThis command is restricted to staff.").await?;
    Ok(false)
}

/// Report a storage failure to the user instead of failing the whole command.
pub async fn report_store_error(ctx: &Context, msg: &Message, e: StoreError) -> CommandResult {
    log::error!("💾 Storage error while handling '{}': {}", msg.content, e);
    msg.reply(ctx, format!("❌ Storage error: {}", e)).await?;
    Ok(())
}

/// Every command group, in registration order.
pub static GROUPS: [&CommandGroup; 5] = [
    &general::GENERAL_GROUP,
    &tags::TAGS_GROUP,
    &badwords::BADWORDS_GROUP,
    &sticky::STICKY_GROUP,
    &owner::OWNER_GROUP,
];

/// Plain-text listing of groups, commands and aliases for the console `commands` command.
pub fn describe_commands(groups: &[&CommandGroup]) -> String {
    let mut out = String::new();

    for group in groups {
        out.push_str(group.name);
        if !group.options.prefixes.is_empty() {
            out.push_str(&format!(" -- prefixes: {}", group.options.prefixes.join(", ")));
        }
        out.push('\n');

        let default = group.options.default_command.into_iter();
        for command in default.chain(group.options.commands.iter().copied()) {
            let names = command.options.names;
            let Some((name, aliases)) = names.split_first() else {
                continue;
            };

            out.push_str(&format!("   {}\n", name));
            if !aliases.is_empty() {
                out.push_str(&format!("     - Alias {:>30}\n", aliases.join(",")));
            }
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_listing_covers_all_groups() {
        let listing = describe_commands(&GROUPS);
        for group in ["General", "Tags", "BadWords", "Sticky", "Owner"] {
            assert!(listing.contains(group), "missing group {}", group);
        }
        assert!(listing.contains("prefixes: tag, tags"));
        assert!(listing.contains("   create\n"));
        assert!(listing.contains("   update\n"));
        assert!(listing.contains("   show\n"));
    }

    #[test]
    fn role_mentions() {
        assert_eq!(parse_role_id("<@&123>"), Some(123));
        assert_eq!(parse_role_id(" 456 "), Some(456));
        assert_eq!(parse_role_id("<@123>"), None);
        assert_eq!(parse_role_id("moderators"), None);
    }

    #[test]
    fn everyone_role_is_the_guild_id() {
        assert!(is_everyone_role(Some(42), 42));
        assert!(is_everyone_role(Some(42), parse_role_id("<@&42>").unwrap()));
        assert!(!is_everyone_role(Some(42), 43));
        assert!(!is_everyone_role(None, 42));
    }

    #[test]
    fn user_mentions() {
        assert_eq!(parse_user_id("<@123>"), Some(123));
        assert_eq!(parse_user_id("<@!123>"), Some(123));
        assert_eq!(parse_user_id("789"), Some(789));
        assert_eq!(parse_user_id("<@&123>"), None);
    }
}
