//! Serenity event handler implementation

use std::sync::Arc;

use serenity::async_trait;
use serenity::gateway::ActivityData;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::{Guild, UnavailableGuild};
use serenity::prelude::*;
use threadit_core::{BotIdentity, RelaySettings, RelayStats, ReplyRelay, SystemClock};
use tracing::{debug, error, info};

use crate::health::AppState;
use crate::platform::SerenityPlatform;

pub const ACTIVITY: &str = "for replies to convert to threads";

/// Everything the message handler needs to build a relay run.
#[derive(Clone)]
pub struct RelayState {
    pub settings: RelaySettings,
    pub stats: Arc<RelayStats>,
    pub downloader: reqwest::Client,
}

impl TypeMapKey for RelayState {
    type Value = RelayState;
}

pub struct Handler;

async fn health_state(ctx: &Context) -> Option<AppState> {
    let data = ctx.data.read().await;
    data.get::<AppState>().cloned()
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            "Logged in as {} (ID: {}) in {} guilds",
            ready.user.name,
            ready.user.id,
            ready.guilds.len()
        );

        if let Some(health) = health_state(&ctx).await {
            health.set_bot_username(ready.user.name.clone()).await;
            health.set_guild_count(ready.guilds.len());
        }

        ctx.set_activity(Some(ActivityData::watching(ACTIVITY)));
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: Option<bool>) {
        if is_new == Some(true) {
            info!("Joined guild: {} (ID: {})", guild.name, guild.id);
        }
        if let Some(health) = health_state(&ctx).await {
            health.set_guild_count(ctx.cache.guild_count());
        }
    }

    async fn guild_delete(&self, ctx: Context, incomplete: UnavailableGuild, full: Option<Guild>) {
        match full {
            Some(guild) => info!("Removed from guild: {} (ID: {})", guild.name, guild.id),
            None => info!("Removed from guild: {}", incomplete.id),
        }
        if let Some(health) = health_state(&ctx).await {
            health.set_guild_count(ctx.cache.guild_count());
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let state = {
            let data = ctx.data.read().await;
            match data.get::<RelayState>() {
                Some(s) => s.clone(),
                None => {
                    error!("RelayState not found in context data");
                    return;
                }
            }
        };

        let platform = SerenityPlatform::new(
            ctx.http.clone(),
            ctx.cache.clone(),
            state.downloader.clone(),
        );
        let bot = BotIdentity::new(platform.bot_user_id());
        let snapshot = platform.snapshot(&msg);

        let relay = ReplyRelay::new(platform, SystemClock, bot, state.settings, state.stats);
        let outcome = relay.handle(&snapshot).await;
        debug!("Message {} handled: {:?}", snapshot.id, outcome);
    }
}
