// tags.rs - Tag commands
// `.tag <name>` posts a stored response; the subcommands manage the store

use super::{report_store_error, require_staff, shared};
use crate::{ConfigKey, TagStoreKey};
use serenity::{
    client::Context,
    framework::standard::{macros::command, macros::group, Args, CommandResult},
    model::{channel::Message, Timestamp},
};

#[group]
#[prefixes("tag", "tags")]
#[default_command(show)]
#[commands(create, delete, edit, info, list)]
pub struct Tags;

#[command]
/// Post the content of a tag
pub async fn show(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let name = args.message().trim();
    if name.is_empty() {
        msg.reply(ctx, "Please provide a tag name! Usage: `tag <name>`, `tag list`").await?;
        return Ok(());
    }

    let store = shared::<TagStoreKey>(ctx).await?;
    match store.get_content_by_name(name).await {
        Ok(Some(content)) => {
            msg.channel_id.say(&ctx.http, content).await?;
        }
        Ok(None) => {
            msg.reply(ctx, format!("❌ Tag `{}` doesn't exist", name)).await?;
        }
        Err(e) => return report_store_error(ctx, msg, e).await,
    }

    Ok(())
}

#[command]
#[aliases("add", "new")]
pub async fn create(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    if !require_staff(ctx, msg, &config).await? {
        return Ok(());
    }

    let name = args.single::<String>().unwrap_or_default();
    let content = args.rest().trim();
    if name.is_empty() || content.is_empty() {
        msg.reply(ctx, "Usage: `tag create <name> <content>`").await?;
        return Ok(());
    }

    let store = shared::<TagStoreKey>(ctx).await?;
    match store.exists(&name).await {
        Ok(true) => {
            msg.reply(ctx, format!("❌ Tag `{}` already exists. Use `tag edit` to change it.", name.to_lowercase()))
                .await?;
            return Ok(());
        }
        Ok(false) => {}
        Err(e) => return report_store_error(ctx, msg, e).await,
    }

    // Still checked inside the store in case another create won the race
    match store.create(&name, content, &msg.author.name, msg.author.id.0).await {
        Ok(true) => {
            msg.reply(ctx, format!("✅ Created tag `{}`", name.to_lowercase())).await?;
        }
        Ok(false) => {
            msg.reply(ctx, format!("❌ Tag `{}` already exists. Use `tag edit` to change it.", name.to_lowercase()))
                .await?;
        }
        Err(e) => return report_store_error(ctx, msg, e).await,
    }

    Ok(())
}

#[command]
#[aliases("remove", "del")]
pub async fn delete(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    if !require_staff(ctx, msg, &config).await? {
        return Ok(());
    }

    let name = args.message().trim();
    if name.is_empty() {
        msg.reply(ctx, "Usage: `tag delete <name>`").await?;
        return Ok(());
    }

    let store = shared::<TagStoreKey>(ctx).await?;
    match store.delete_by_name(name).await {
        Ok(true) => {
            msg.reply(ctx, format!("🗑️ Deleted tag `{}`", name.to_lowercase())).await?;
        }
        Ok(false) => {
            msg.reply(ctx, format!("❌ Tag `{}` doesn't exist", name)).await?;
        }
        Err(e) => return report_store_error(ctx, msg, e).await,
    }

    Ok(())
}

#[command]
#[aliases("modify")]
pub async fn edit(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    if !require_staff(ctx, msg, &config).await? {
        return Ok(());
    }

    let name = args.single::<String>().unwrap_or_default();
    let content = args.rest().trim();
    if name.is_empty() || content.is_empty() {
        msg.reply(ctx, "Usage: `tag edit <name> <new content>`").await?;
        return Ok(());
    }

    let store = shared::<TagStoreKey>(ctx).await?;
    match store.edit(&name, content).await {
        Ok(true) => {
            msg.reply(ctx, format!("✏️ Updated tag `{}`", name.to_lowercase())).await?;
        }
        Ok(false) => {
            msg.reply(ctx, format!("❌ Tag `{}` doesn't exist", name)).await?;
        }
        Err(e) => return report_store_error(ctx, msg, e).await,
    }

    Ok(())
}

#[command]
#[aliases("owner")]
pub async fn info(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let name = args.message().trim();
    if name.is_empty() {
        msg.reply(ctx, "Usage: `tag info <name>`").await?;
        return Ok(());
    }

    let store = shared::<TagStoreKey>(ctx).await?;
    let tags = match store.get_tag(name).await {
        Ok(tags) => tags,
        Err(e) => return report_store_error(ctx, msg, e).await,
    };

    let Some(tag) = tags.first() else {
        msg.reply(ctx, format!("❌ Tag `{}` doesn't exist", name)).await?;
        return Ok(());
    };

    let created = Timestamp::from_unix_timestamp(tag.created_at).unwrap_or_else(|_| Timestamp::now());
    msg.channel_id
        .send_message(&ctx.http, |m| {
            m.embed(|e| {
                e.title(format!("Tag `{}`", tag.name));
                e.field("Owner", format!("{} (<@{}>)", tag.owner_name, tag.owner_id), true);
                e.field("Owner ID", tag.owner_id, true);
                e.field("Created", format!("<t:{}:F>", tag.created_at), false);
                e.color(0x2ECC71);
                e.timestamp(created);
                e
            })
        })
        .await?;

    Ok(())
}

#[command]
#[aliases("all")]
pub async fn list(ctx: &Context, msg: &Message) -> CommandResult {
    let store = shared::<TagStoreKey>(ctx).await?;
    let tags = match store.get_all().await {
        Ok(tags) => tags,
        Err(e) => return report_store_error(ctx, msg, e).await,
    };

    if tags.is_empty() {
        msg.reply(ctx, "There are no tags yet. Create one with `tag create <name> <content>`").await?;
        return Ok(());
    }

    let mut names: Vec<String> = tags.into_iter().map(|t| format!("`{}`", t.name)).collect();
    names.sort();
    names.dedup();

    let description = crate::shell::truncate_output(&names.join(", "), crate::shell::EMBED_DESCRIPTION_LIMIT);
    msg.channel_id
        .send_message(&ctx.http, |m| {
            m.embed(|e| {
                e.title(format!("Tags ({})", names.len()));
                e.description(description);
                e.color(0x2ECC71);
                e
            })
        })
        .await?;

    Ok(())
}
