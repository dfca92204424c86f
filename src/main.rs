mod commands;
mod config;
mod constants;
mod db;
mod health;
mod messages;
mod models;
mod schedule;

use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    commands::{list_birthdays, remove_birthday, set_birthday},
    config::Config,
    constants::LOG_DIRECTIVE,
    db::Database,
    health::start_health_server,
    models::Data,
    schedule::start_announcement_loop,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    initialize_logging();

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Connect to database
    let db = match Database::new(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize bot data
    let data = Data::new(db);

    // Health server runs independently of the bot and the scheduler
    start_health_server(config.health_port);

    // Create and start the bot
    if let Err(e) = start_bot(config, data).await {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize the logging system
fn initialize_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(LOG_DIRECTIVE.parse().expect("valid log directive")),
        )
        .init();
}

/// Create and start the Discord bot
async fn start_bot(
    config: Config,
    data: Data,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let Config {
        discord_token,
        announce_channel_id,
        announce_hour,
        utc_offset_hours,
        dev_guild_id,
        ..
    } = config;

    // Wrap data in Arc for sharing with the scheduler
    let data_arc = Arc::new(data);
    let data_for_framework = Arc::clone(&data_arc);

    // Create framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![set_birthday(), remove_birthday(), list_birthdays()],
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            let http = ctx.http.clone();
            let data_clone = Arc::clone(&data_for_framework);

            // The gateway connection is ready at this point, so the
            // scheduler may begin ticking
            start_announcement_loop(
                http,
                data_clone,
                announce_channel_id,
                announce_hour,
                utc_offset_hours,
            );
            info!("Birthday scheduler task started");

            Box::pin(async move {
                // Register commands based on dev_guild_id
                if let Some(guild_id) = dev_guild_id {
                    let guild = serenity::GuildId::new(guild_id);
                    info!("Registering commands in development guild: {}", guild_id);
                    poise::builtins::register_in_guild(ctx, &framework.options().commands, guild)
                        .await?;
                    info!(
                        "Commands registered in guild {} (instant updates)",
                        guild_id
                    );
                } else {
                    info!("Registering commands globally (may take up to 1 hour)");
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    info!("Commands registered globally");
                }

                info!("Bot is ready!");

                // Return a new clone of the data
                Ok((*data_for_framework).clone())
            })
        })
        .build();

    // Create client with required intents
    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::ClientBuilder::new(discord_token, intents)
        .framework(framework)
        .await?;

    // Start the bot
    info!("Starting bot...");
    client.start().await?;

    Ok(())
}
