// owner.rs - Administrative commands only the bot owner can use

use super::shared;
use crate::error::ShellError;
use crate::shell::{run_script, truncate_output, EMBED_DESCRIPTION_LIMIT};
use crate::ConfigKey;
use serenity::{
    client::Context,
    framework::standard::{macros::command, macros::group, Args, CommandResult},
    model::channel::Message,
};

#[group]
#[commands(update)]
pub struct Owner;

#[command]
#[aliases("pull")]
/// Run the configured update script and show its output
pub async fn update(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;

    if !config.is_owner(msg.author.id.0) {
        msg.reply(ctx, "❌ **Access Denied**\nThis command can only be used by the bot owner.").await?;
        return Ok(());
    }

    log::info!("[OWNER] Update requested by {} ({})", msg.author.name, msg.author.id);

    if !tokio::fs::try_exists(&config.update_script).await.unwrap_or(false) {
        msg.reply(
            ctx,
            format!("❌ `{}` doesn't exist. Add the update script first.", config.update_script.display()),
        )
        .await?;
        return Ok(());
    }

    let mut status = msg
        .channel_id
        .send_message(&ctx.http, |m| {
            m.embed(|e| e.title("Command output").description("Starting command..."))
        })
        .await?;

    let description = match run_script(&config.update_script).await {
        Ok(output) => truncate_output(&output, EMBED_DESCRIPTION_LIMIT),
        Err(ShellError::ScriptMissing(path)) => format!("❌ `{}` disappeared before it could run", path.display()),
        Err(e) => {
            log::error!("[OWNER] Update script failed: {}", e);
            format!("❌ {}", e)
        }
    };

    status
        .edit(&ctx.http, |m| {
            m.embed(|e| e.title("Command output").description(description))
        })
        .await?;

    Ok(())
}
