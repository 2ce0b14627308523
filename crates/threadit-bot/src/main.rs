//! Thread It
//!
//! Discord bot that moves replies into a thread on the message they answer,
//! then removes the original reply from the channel.

mod config;
mod convert;
mod errors;
mod handlers;
mod health;
mod logging;
mod platform;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use threadit_core::RelayStats;
use tracing::{error, info};

use crate::config::Config;
use crate::handlers::{Handler, RelayState};
use crate::health::AppState;

/// Thread It CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/threadit.toml")]
    config: String,

    /// Discord bot token (overrides config file)
    #[arg(long, env = "DISCORD_TOKEN")]
    bot_token: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO")]
    log_level: String,

    /// Health check server port
    #[arg(long, env = "HEALTH_CHECK_PORT", default_value = "3001")]
    health_port: u16,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = if std::path::Path::new(&args.config).exists() {
        info!("Loading config from file: {}", args.config);
        Config::from_file(&args.config)?
    } else if args.bot_token.is_some() {
        info!("Config file not found, using defaults");
        Config::default()
    } else {
        info!("Config file not found, loading from environment");
        Config::from_env()?
    };

    if let Some(bot_token) = &args.bot_token {
        config.discord.bot_token = bot_token.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    logging::init(&args.log_level);

    info!("Starting Thread It");

    let config = load_config(&args)?;

    let stats = Arc::new(RelayStats::new());
    let relay_state = RelayState {
        settings: config.relay.clone(),
        stats: stats.clone(),
        downloader: platform::attachment_downloader(platform::DOWNLOAD_TIMEOUT)
            .context("Failed to build attachment download client")?,
    };
    let health_state = AppState::new(stats);

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord.bot_token, intents)
        .event_handler(Handler)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

    {
        let mut data = client.data.write().await;
        data.insert::<RelayState>(relay_state);
        data.insert::<AppState>(health_state.clone());
    }

    let health_port = args.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::start_health_server(health_state, health_port).await {
            error!("Health server error: {}", e);
        }
    });

    // close all shards on SIGTERM or Ctrl+C
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping Discord client...");
        shard_manager.shutdown_all().await;
    });

    info!("Starting Discord gateway connection...");

    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Discord client error: {}", e))?;

    info!("Thread It stopped");
    Ok(())
}
