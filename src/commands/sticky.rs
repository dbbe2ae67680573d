// sticky.rs - Sticky role commands (staff only)
// Stickied roles are handed back when a member leaves and rejoins

use super::{is_everyone_role, parse_role_id, parse_user_id, report_store_error, require_staff, shared};
use crate::{ConfigKey, StickyRolesKey};
use serenity::{
    client::Context,
    framework::standard::{macros::command, macros::group, Args, CommandResult},
    model::channel::Message,
};

#[group]
#[prefixes("sticky", "stickyroles")]
#[commands(add, remove, values)]
pub struct Sticky;

#[command]
pub async fn add(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    if !require_staff(ctx, msg, &config).await? {
        return Ok(());
    }

    let Some(role_id) = parse_role_id(args.message()) else {
        msg.reply(ctx, "Usage: `sticky add <@role|role id>`").await?;
        return Ok(());
    };

    if is_everyone_role(msg.guild_id.map(|g| g.0), role_id) {
        msg.reply(ctx, "❌ Can't add @everyone").await?;
        return Ok(());
    }

    let store = shared::<StickyRolesKey>(ctx).await?;
    match store.add_role(role_id).await {
        Ok(true) => {
            msg.reply(ctx, format!("✅ Successfully added <@&{}> to the stickied roles", role_id)).await?;
        }
        Ok(false) => {
            msg.reply(ctx, format!("❌ Stickied roles already contain <@&{}>", role_id)).await?;
        }
        Err(e) => return report_store_error(ctx, msg, e).await,
    }

    Ok(())
}

#[command]
#[aliases("delete", "del")]
/// Remove a role from the stickied roles, or forget a user's remembered roles
pub async fn remove(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    if !require_staff(ctx, msg, &config).await? {
        return Ok(());
    }

    let arg = args.message().trim();
    let store = shared::<StickyRolesKey>(ctx).await?;

    // A bare id is a role if it is stickied, otherwise treated as a user
    let role_id = match parse_role_id(arg) {
        Some(id) if arg.starts_with("<@&") => Some(id),
        Some(id) => store.is_sticky(id).await.then_some(id),
        None => None,
    };

    if let Some(role_id) = role_id {
        match store.remove_role(role_id).await {
            Ok(true) => {
                msg.reply(ctx, format!("✅ Successfully removed <@&{}> from the stickied roles", role_id)).await?;
            }
            Ok(false) => {
                msg.reply(ctx, format!("❌ Stickied roles don't contain <@&{}>", role_id)).await?;
            }
            Err(e) => return report_store_error(ctx, msg, e).await,
        }
        return Ok(());
    }

    let Some(user_id) = parse_user_id(arg) else {
        msg.reply(ctx, "Usage: `sticky remove <@role|@user|id>`").await?;
        return Ok(());
    };

    match store.forget_user(user_id).await {
        Ok(true) => {
            msg.reply(ctx, format!("✅ Successfully removed <@{}> from the stickied users", user_id)).await?;
        }
        Ok(false) => {
            msg.reply(ctx, format!("❌ <@{}> doesn't seem to be stickied", user_id)).await?;
        }
        Err(e) => return report_store_error(ctx, msg, e).await,
    }

    Ok(())
}

#[command]
#[aliases("roles", "list")]
pub async fn values(ctx: &Context, msg: &Message) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    if !require_staff(ctx, msg, &config).await? {
        return Ok(());
    }

    let store = shared::<StickyRolesKey>(ctx).await?;
    let roles = store.roles().await;
    let remembered = store.user_count().await;

    let description = if roles.is_empty() {
        "No roles are stickied.".to_string()
    } else {
        roles
            .iter()
            .map(|r| format!("<@&{}> - ID: {}", r, r))
            .collect::<Vec<_>>()
            .join("\n")
    };

    msg.channel_id
        .send_message(&ctx.http, |m| {
            m.embed(|e| {
                e.title("Stickied Roles");
                e.description(description);
                e.footer(|f| f.text(format!("{} users remembered", remembered)));
                e.color(0x1F8B4C);
                e
            })
        })
        .await?;

    Ok(())
}
