// moderation.rs - Word filter enforcement on inbound messages and the staff access rule

use crate::config::BotConfig;
use crate::word_filter::WordFilter;
use serenity::{client::Context, model::channel::Message};

/// Staff bypass: holding any configured staff role, or the manage messages permission.
pub fn is_exempt(held_roles: &[u64], manage_messages: bool, exempt_roles: &[u64]) -> bool {
    manage_messages || held_roles.iter().any(|r| exempt_roles.contains(r))
}

pub async fn should_delete(text: &str, exempt: bool, filter: &WordFilter) -> bool {
    !exempt && filter.text_contains_any(text).await
}

/// Resolve whether the author of a guild message counts as staff. DMs and
/// unresolvable members are never staff.
pub async fn author_is_staff(ctx: &Context, msg: &Message, config: &BotConfig) -> bool {
    if msg.guild_id.is_none() {
        return false;
    }

    let member = match msg.member(ctx).await {
        Ok(member) => member,
        Err(e) => {
            log::debug!("Could not resolve member {} : {}", msg.author.id, e);
            return false;
        }
    };

    let manage_messages = member
        .permissions(ctx)
        .map(|p| p.manage_messages())
        .unwrap_or(false);
    let held: Vec<u64> = member.roles.iter().map(|r| r.0).collect();

    is_exempt(&held, manage_messages, &config.staff_roles())
}

/// Delete `msg` if it contains a banned word and its author is not staff.
/// Deletion is best-effort: a message already gone or a permission race is not an error.
pub async fn enforce_word_filter(ctx: &Context, msg: &Message, config: &BotConfig, filter: &WordFilter) {
    if msg.author.bot || msg.guild_id.is_none() {
        return;
    }

    // Cheap check first so staff lookups only happen for suspicious messages
    if !filter.text_contains_any(&msg.content).await {
        return;
    }

    let exempt = author_is_staff(ctx, msg, config).await;
    if !should_delete(&msg.content, exempt, filter).await {
        return;
    }

    match msg.delete(ctx).await {
        Ok(()) => log::info!(
            "🚫 Deleted message {} from {} ({}) containing a banned word",
            msg.id,
            msg.author.name,
            msg.author.id
        ),
        Err(e) => log::debug!("Failed to delete filtered message {}: {}", msg.id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn staff_roles_and_permission_exempt() {
        let staff = [100, 200];
        assert!(is_exempt(&[1, 200], false, &staff));
        assert!(is_exempt(&[], true, &staff));
        assert!(!is_exempt(&[1, 2], false, &staff));
        assert!(!is_exempt(&[1], false, &[]));
    }

    #[tokio::test]
    async fn only_non_exempt_matches_are_deleted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("badWords.json");
        std::fs::write(&path, r#"["spam"]"#).unwrap();
        let filter = WordFilter::load(&path).await.unwrap();

        assert!(should_delete("Free SPAM!", false, &filter).await);
        assert!(!should_delete("Free SPAM!", true, &filter).await);
        assert!(!should_delete("hello there", false, &filter).await);
    }
}
