mod commands;
mod config;
mod error;
mod moderation;
mod shell;
mod sticky_roles;
mod storage;
mod tag_store;
mod word_filter;

use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    framework::standard::StandardFramework,
    model::{
        channel::Message,
        gateway::Ready,
        guild::Member,
        id::{GuildId, RoleId},
        user::User,
    },
    prelude::GatewayIntents,
    prelude::TypeMapKey,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;

use crate::config::{load_bot_config, BotConfig};
use crate::sticky_roles::StickyRoleStore;
use crate::tag_store::TagStore;
use crate::word_filter::WordFilter;

// TypeMap keys for the state commands need
pub struct ConfigKey;
impl TypeMapKey for ConfigKey {
    type Value = Arc<BotConfig>;
}

pub struct TagStoreKey;
impl TypeMapKey for TagStoreKey {
    type Value = Arc<TagStore>;
}

pub struct WordFilterKey;
impl TypeMapKey for WordFilterKey {
    type Value = Arc<WordFilter>;
}

pub struct StickyRolesKey;
impl TypeMapKey for StickyRolesKey {
    type Value = Arc<StickyRoleStore>;
}

// Event handler: word filter on every message, sticky roles on leave/join
struct Handler {
    config: Arc<BotConfig>,
    filter: Arc<WordFilter>,
    sticky: Arc<StickyRoleStore>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        log::info!("✅ Bot connected as {}! (ID: {})", ready.user.name, ready.user.id);
        log::info!("📊 Connected to {} guilds", ready.guilds.len());
        println!("✅ Bot connected as {}!", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        moderation::enforce_word_filter(&ctx, &msg, &self.config, &self.filter).await;
    }

    async fn guild_member_removal(
        &self,
        _ctx: Context,
        guild_id: GuildId,
        user: User,
        member_data_if_available: Option<Member>,
    ) {
        let Some(member) = member_data_if_available else {
            log::warn!("📌 {} ({}) left {} but was not cached, sticky roles not recorded", user.name, user.id, guild_id);
            return;
        };

        let held: Vec<u64> = member.roles.iter().map(|r| r.0).collect();
        if let Err(e) = self.sticky.remember_member(user.id.0, &held).await {
            log::error!("📌 Failed to record sticky roles of {} ({}): {}", user.name, user.id, e);
        }
    }

    async fn guild_member_addition(&self, ctx: Context, mut new_member: Member) {
        let roles = self.sticky.roles_for(new_member.user.id.0).await;
        if roles.is_empty() {
            return;
        }

        log::info!(
            "📌 Restoring {} sticky roles to {} ({})",
            roles.len(),
            new_member.user.name,
            new_member.user.id
        );

        for role in roles {
            if let Err(e) = new_member.add_role(&ctx.http, RoleId(role)).await {
                log::warn!("📌 Failed to restore role {} to {}: {}", role, new_member.user.id, e);
            }
        }
    }
}

/// What the stdin console needs to answer `status` and `commands`.
struct Console {
    started: Instant,
    data_dir: PathBuf,
    tags: Arc<TagStore>,
    filter: Arc<WordFilter>,
    sticky: Arc<StickyRoleStore>,
}

impl Console {
    async fn status(&self) {
        let tag_count = match self.tags.get_all().await {
            Ok(tags) => tags.len().to_string(),
            Err(e) => format!("unavailable ({})", e),
        };

        println!("🤖 Bot Status: Running");
        println!("⏱️  Uptime: {}s", self.started.elapsed().as_secs());
        println!("🏷️  Tags: {} ({})", tag_count, self.tags.path().display());
        println!("🚫 Banned words: {} ({})", self.filter.len().await, self.filter.path().display());
        println!("📌 Stickied roles: {} ({} users remembered)", self.sticky.roles().await.len(), self.sticky.user_count().await);
    }

    async fn commands(&self) {
        let listing = commands::describe_commands(&commands::GROUPS);
        println!("{}", listing);

        let path = self.data_dir.join("Commands.txt");
        if let Err(e) = tokio::fs::write(&path, &listing).await {
            eprintln!("❌ Failed to write {}: {}", path.display(), e);
        }
    }
}

async fn handle_command_line(console: Console, shutdown_tx: mpsc::Sender<String>) {
    use tokio::time::{sleep, Duration};

    println!("📝 Command line interface active. Type 'help' for available commands.");

    // Wait for bot to connect and show connection messages before showing prompt
    sleep(Duration::from_millis(1500)).await;

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin).lines();
    let mut stdout = io::stdout();

    if stdout.write_all(b"\n> ").await.is_err() || stdout.flush().await.is_err() {
        eprintln!("❌ Failed to write initial prompt");
        return;
    }

    loop {
        match reader.next_line().await {
            Ok(Some(line)) => {
                let command = line.trim().to_lowercase();

                match command.as_str() {
                    "quit" | "q" | "exit" | "stop" => {
                        println!("⏹️  Shutting down bot...");
                        if shutdown_tx.send(command.clone()).await.is_err() {
                            eprintln!("❌ Failed to send shutdown signal");
                        }
                        break;
                    }
                    "help" | "h" => {
                        println!("🤖 Available commands:");
                        println!("  quit, q, exit, stop - Stop the bot gracefully");
                        println!("  help, h             - Show this help message");
                        println!("  status              - Show bot status");
                        println!("  commands            - List chat commands and write them to Commands.txt");
                        println!("  clear               - Clear the terminal");
                    }
                    "status" => console.status().await,
                    "commands" => console.commands().await,
                    "clear" => {
                        // ANSI clear screen + cursor home
                        if stdout.write_all(b"\x1B[2J\x1B[1;1H").await.is_err() {
                            eprintln!("❌ Failed to clear the terminal");
                        }
                    }
                    "" => {}
                    _ => {
                        println!("❓ Unknown command: '{}'. Type 'help' for available commands.", command);
                    }
                }

                if stdout.write_all(b"> ").await.is_err() || stdout.flush().await.is_err() {
                    eprintln!("❌ Failed to write prompt");
                    break;
                }
            }
            Ok(None) => {
                // EOF reached
                break;
            }
            Err(e) => {
                eprintln!("❌ Error reading command line: {}", e);
                break;
            }
        }
    }
}

fn format_uptime(seconds: u64) -> String {
    let minutes = seconds as f64 / 60.0;
    let hours = minutes / 60.0;
    format!("{}s or {:.2}min or {:.2}h", seconds, minutes, hours)
}

#[tokio::main]
async fn main() {
    // Initialize logger - must be done before any logging calls
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let started = Instant::now();

    let config = match load_bot_config() {
        Ok((config, path)) => {
            println!("✅ Configuration loaded from {}", path);
            Arc::new(config)
        }
        Err(error) => {
            log::error!("❌ Failed to load botconfig.txt: {}", error);
            eprintln!("❌ Failed to load botconfig.txt: {}", error);
            eprintln!("Create a botconfig.txt file in the project root with: DISCORD_TOKEN=your_token_here and PREFIX=.");
            return;
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(&config.data_dir).await {
        log::error!("❌ Failed to create data directory {}: {}", config.data_dir.display(), e);
        return;
    }

    let tags = match TagStore::open(config.tags_path()).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("❌ Failed to open tag store: {}", e);
            return;
        }
    };

    let filter = match WordFilter::open(config.bad_words_path()).await {
        Ok(filter) => Arc::new(filter),
        Err(e) => {
            log::error!("❌ Failed to load banned words: {}", e);
            return;
        }
    };

    let sticky = match StickyRoleStore::open(config.sticky_roles_path()).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("❌ Failed to load sticky roles: {}", e);
            return;
        }
    };

    println!("🤖 Starting bot with prefix: '{}'", config.prefix);

    let mut framework = StandardFramework::new()
        .configure(|c| {
            c.prefix(&config.prefix)
                .case_insensitivity(true)
                .with_whitespace(true)
        })
        .after(|_ctx, msg, command_name, result| {
            Box::pin(async move {
                match result {
                    Ok(()) => log::debug!(
                        "✅ Command '{}' executed by {} ({})",
                        command_name,
                        msg.author.name,
                        msg.author.id
                    ),
                    Err(e) => log::error!(
                        "❌ Command '{}' failed for user {} ({}): {:?}",
                        command_name,
                        msg.author.name,
                        msg.author.id,
                        e
                    ),
                }
            })
        })
        .unrecognised_command(|_ctx, msg, unrecognised_command_name| {
            Box::pin(async move {
                log::debug!(
                    "❓ Unrecognised command '{}' attempted by {} ({})",
                    unrecognised_command_name,
                    msg.author.name,
                    msg.author.id
                );
            })
        });
    for group in commands::GROUPS {
        framework = framework.group(group);
    }

    // GUILD_MEMBERS is privileged and needed for the sticky role join/leave events
    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    let handler = Handler {
        config: Arc::clone(&config),
        filter: Arc::clone(&filter),
        sticky: Arc::clone(&sticky),
    };

    let mut client = match Client::builder(&config.token, intents)
        .event_handler(handler)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Error creating Discord client: {:?}", e);
            eprintln!("❌ Error creating Discord client: {:?}", e);
            eprintln!("Check your token in botconfig.txt file");
            return;
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<ConfigKey>(Arc::clone(&config));
        data.insert::<TagStoreKey>(Arc::clone(&tags));
        data.insert::<WordFilterKey>(Arc::clone(&filter));
        data.insert::<StickyRolesKey>(Arc::clone(&sticky));
    }

    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<String>(1);

    let console = Console {
        started,
        data_dir: config.data_dir.clone(),
        tags,
        filter,
        sticky,
    };
    let cmd_task = tokio::spawn(handle_command_line(console, shutdown_tx));

    log::info!("🚀 Startup completed in {}ms", started.elapsed().as_millis());
    println!("🚀 Bot is running...");
    println!("💡 Use 'quit' command to stop gracefully, or press Ctrl+C");

    let shard_manager = client.shard_manager.clone();
    tokio::select! {
        _ = signal::ctrl_c() => {
            println!("\n⏹️ Stopping bot gracefully...");
        }
        shutdown_signal = shutdown_rx.recv() => {
            if let Some(signal) = shutdown_signal {
                println!("📡 Received '{}' command, stopping bot gracefully...", signal);
            }
        }
        result = client.start() => {
            if let Err(why) = result {
                log::error!("❌ Client error: {:?}", why);
                eprintln!("❌ Client error: {:?}", why);
            }
        }
    }

    shard_manager.lock().await.shutdown_all().await;
    cmd_task.abort();

    log::info!("Bot uptime was {}", format_uptime(started.elapsed().as_secs()));
    println!("✅ Bot stopped");
}
