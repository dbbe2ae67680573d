// badwords.rs - Word filter management commands (staff only)

use super::{report_store_error, require_staff, shared};
use crate::{ConfigKey, WordFilterKey};
use serenity::{
    client::Context,
    framework::standard::{macros::command, macros::group, Args, CommandResult},
    model::channel::Message,
};

#[group]
#[prefixes("badword", "badwords", "bw")]
#[commands(add, remove, list, check)]
pub struct BadWords;

#[command]
pub async fn add(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    if !require_staff(ctx, msg, &config).await? {
        return Ok(());
    }

    let word = args.message().trim();
    if word.is_empty() {
        msg.reply(ctx, "Usage: `badword add <word>`").await?;
        return Ok(());
    }

    let filter = shared::<WordFilterKey>(ctx).await?;
    match filter.add(word).await {
        Ok(true) => {
            msg.reply(ctx, format!("✅ Added ||{}|| to the banned words", word.to_lowercase())).await?;
        }
        Ok(false) => {
            msg.reply(ctx, format!("❌ ||{}|| is already banned", word.to_lowercase())).await?;
        }
        Err(e) => return report_store_error(ctx, msg, e).await,
    }

    Ok(())
}

#[command]
#[aliases("delete", "del")]
pub async fn remove(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    if !require_staff(ctx, msg, &config).await? {
        return Ok(());
    }

    let word = args.message().trim();
    if word.is_empty() {
        msg.reply(ctx, "Usage: `badword remove <word>`").await?;
        return Ok(());
    }

    let filter = shared::<WordFilterKey>(ctx).await?;
    match filter.remove(word).await {
        Ok(true) => {
            msg.reply(ctx, format!("✅ Removed ||{}|| from the banned words", word.to_lowercase())).await?;
        }
        Ok(false) => {
            msg.reply(ctx, format!("❌ ||{}|| isn't banned", word.to_lowercase())).await?;
        }
        Err(e) => return report_store_error(ctx, msg, e).await,
    }

    Ok(())
}

#[command]
#[aliases("all", "values")]
pub async fn list(ctx: &Context, msg: &Message) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    if !require_staff(ctx, msg, &config).await? {
        return Ok(());
    }

    let filter = shared::<WordFilterKey>(ctx).await?;
    let words = filter.words().await;
    if words.is_empty() {
        msg.reply(ctx, "No words are banned.").await?;
        return Ok(());
    }

    // Spoilered so the list itself doesn't become the offensive message
    let listed: Vec<String> = words.iter().map(|w| format!("||{}||", w)).collect();
    let description = crate::shell::truncate_output(&listed.join(", "), crate::shell::EMBED_DESCRIPTION_LIMIT);

    msg.channel_id
        .send_message(&ctx.http, |m| {
            m.embed(|e| {
                e.title(format!("Banned words ({})", words.len()));
                e.description(description);
                e.color(0xE74C3C);
                e
            })
        })
        .await?;

    Ok(())
}

#[command]
#[aliases("test")]
/// Tell whether a text would be removed by the filter
pub async fn check(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    if !require_staff(ctx, msg, &config).await? {
        return Ok(());
    }

    let text = args.message().trim();
    if text.is_empty() {
        msg.reply(ctx, "Usage: `badword check <text>`").await?;
        return Ok(());
    }

    let filter = shared::<WordFilterKey>(ctx).await?;
    let reply = if filter.contains(text).await {
        "🚫 That exact word is on the banned list."
    } else if filter.text_contains_any(text).await {
        "🚫 That text contains a banned word and would be deleted for non-staff members."
    } else {
        "✅ That text is clean."
    };
    msg.reply(ctx, reply).await?;

    Ok(())
}
