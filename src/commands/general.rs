// general.rs - ping and help

use super::shared;
use crate::ConfigKey;
use serenity::{
    client::Context,
    framework::standard::{macros::command, macros::group, Args, CommandResult},
    model::channel::Message,
};

#[group]
#[commands(ping, help)]
pub struct General;

#[command]
/// Measures the round trip of sending a reply
pub async fn ping(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    let start_time = std::time::Instant::now();

    let response_result = msg.reply(ctx, "Pong! Calculating delay...").await;
    let elapsed = start_time.elapsed();

    if let Ok(mut response_msg) = response_result {
        let updated_content = format!("Pong! Response time: {}ms", elapsed.as_millis());

        if let Err(e) = response_msg.edit(&ctx.http, |m| m.content(updated_content)).await {
            log::warn!("[PING] Failed to update ping message with delay: {}", e);
        }
    }

    Ok(())
}

pub fn help_text(prefix: &str) -> String {
    format!(
        "**🛡️ Moderation Bot - Command Help**\n\n\
        **📝 General:**\n\
        • `{p}ping` - Test connectivity\n\
        • `{p}help` - Show this help message\n\n\
        **🏷️ Tags:**\n\
        • `{p}tag <name>` - Post a tag\n\
        • `{p}tag list` - List all tags\n\
        • `{p}tag info <name>` - Who made a tag and when\n\
        • `{p}tag create <name> <content>` - Create a tag (staff)\n\
        • `{p}tag edit <name> <content>` - Change a tag (staff)\n\
        • `{p}tag delete <name>` - Delete a tag (staff)\n\n\
        **🚫 Word filter (staff):**\n\
        • `{p}badword add <word>` • `{p}badword remove <word>`\n\
        • `{p}badword list` • `{p}badword check <text>`\n\n\
        **📌 Sticky roles (staff):**\n\
        • `{p}sticky add <@role>` • `{p}sticky remove <@role|@user>`\n\
        • `{p}sticky values` - List stickied roles\n\n\
        **🔧 Owner:**\n\
        • `{p}update` - Run the update script",
        p = prefix
    )
}

#[command]
#[aliases("h", "commands")]
pub async fn help(ctx: &Context, msg: &Message) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    msg.reply(ctx, help_text(&config.prefix)).await?;
    Ok(())
}
