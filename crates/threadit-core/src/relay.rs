//! Per-message orchestration of the relocation stages.
//!
//! Stages report expected failures as `None`/`false` and the run stops at
//! the first one. A panic anywhere inside a run is caught here, logged with
//! the message and guild ids, and turned into [`RelayOutcome::Failed`].

#[path = "relay_tests.rs"]
mod relay_tests;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use threadit_types::MessageSnapshot;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::cleanup::cleanup;
use crate::clock::{Clock, SystemClock};
use crate::gather::gather;
use crate::metrics::{log_operation_metrics, RelayStats};
use crate::notice::suppress_thread_notice;
use crate::permissions::check_permissions;
use crate::platform::{BotIdentity, ChatPlatform};
use crate::repost::repost;
use crate::settings::RelaySettings;
use crate::thread::resolve_or_create;
use crate::validator::{is_eligible, Eligibility, IgnoreReason};

const RUN_OPERATION: &str = "process_reply_to_thread";

/// Stage at which a run stopped without relocating anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortStage {
    Permissions,
    GatherReplyInfo,
    ThreadUnavailable,
    Repost,
}

impl AbortStage {
    fn operation(&self) -> &'static str {
        match self {
            Self::Permissions => "permission_check",
            Self::GatherReplyInfo => "gather_reply_info",
            Self::ThreadUnavailable => "create_thread",
            Self::Repost => "repost_reply",
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::Permissions => "Missing required permissions",
            Self::GatherReplyInfo => "Failed to gather info",
            Self::ThreadUnavailable => "Failed to create or reuse thread",
            Self::Repost => "Failed to repost content",
        }
    }
}

/// What happened to one dispatched message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Ignored(IgnoreReason),
    /// The bot's own thread-created notice was removed
    NoticeSuppressed,
    Aborted(AbortStage),
    Relocated {
        thread_id: u64,
        /// Whether the redirect notice went out (only after the original was deleted)
        notice_sent: bool,
    },
    /// The run panicked
    Failed(String),
}

pub struct ReplyRelay<P, C = SystemClock> {
    platform: P,
    clock: C,
    bot: BotIdentity,
    settings: RelaySettings,
    stats: Arc<RelayStats>,
}

impl<P: ChatPlatform, C: Clock> ReplyRelay<P, C> {
    pub fn new(
        platform: P,
        clock: C,
        bot: BotIdentity,
        settings: RelaySettings,
        stats: Arc<RelayStats>,
    ) -> Self {
        Self {
            platform,
            clock,
            bot,
            settings,
            stats,
        }
    }

    pub fn stats(&self) -> &Arc<RelayStats> {
        &self.stats
    }

    /// Dispatch entry point for every created message.
    ///
    /// The bot's own thread-created notice is removed before eligibility is
    /// considered, since eligibility would drop it as bot-authored.
    pub async fn handle(&self, message: &MessageSnapshot) -> RelayOutcome {
        self.contained(message, async {
            if suppress_thread_notice(&self.platform, message, &self.bot).await {
                self.stats.record_notice_suppressed();
                return RelayOutcome::NoticeSuppressed;
            }
            self.run(message).await
        })
        .await
    }

    /// Run the relocation pipeline for one message.
    pub async fn process(&self, message: &MessageSnapshot) -> RelayOutcome {
        self.contained(message, self.run(message)).await
    }

    async fn contained<F>(&self, message: &MessageSnapshot, run: F) -> RelayOutcome
    where
        F: std::future::Future<Output = RelayOutcome>,
    {
        let start = self.clock.now();
        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                log_operation_metrics(
                    RUN_OPERATION,
                    false,
                    Some(self.elapsed(start)),
                    Some(&reason),
                );
                error!(
                    "Error processing reply to thread for message {} in guild {}: {}",
                    message.id,
                    message
                        .channel
                        .guild_id
                        .map_or_else(|| "none".to_string(), |id| id.to_string()),
                    reason
                );
                self.stats.record_failed();
                RelayOutcome::Failed(reason)
            }
        }
    }

    async fn run(&self, message: &MessageSnapshot) -> RelayOutcome {
        let start = self.clock.now();

        if let Eligibility::Ignored(reason) = is_eligible(message, &self.bot) {
            debug!("Ignoring message {}: {}", message.id, reason.describe());
            self.stats.record_ignored();
            return RelayOutcome::Ignored(reason);
        }

        debug!(
            "Processing reply from {} (ID: {}) in {}",
            message.author.username,
            message.author.id,
            message.channel.label()
        );

        let check = check_permissions(&self.platform, &message.channel);
        if !check.ok {
            error!(
                "Missing required permissions in {}: {}",
                message.channel.label(),
                check.missing.join(", ")
            );
            return self.abort(AbortStage::Permissions, start);
        }

        let Some(reply) = gather(&self.platform, message).await else {
            return self.abort(AbortStage::GatherReplyInfo, start);
        };

        let Some(thread) = resolve_or_create(&self.platform, &self.settings, &reply).await else {
            error!("Failed to create thread for reply {}", reply.message_id);
            return self.abort(AbortStage::ThreadUnavailable, start);
        };

        if !repost(&self.platform, &self.settings, &thread, &reply).await {
            error!("Failed to repost content in thread {}", thread.id);
            return self.abort(AbortStage::Repost, start);
        }

        let report = cleanup(&self.platform, &self.clock, &self.settings, &thread, &reply).await;

        log_operation_metrics(RUN_OPERATION, true, Some(self.elapsed(start)), None);
        info!(
            "Successfully processed reply: thread '{}', original deleted: {}, \
             notice sent: {}, author {}",
            thread.name, report.original_deleted, report.notice_sent, reply.author.username
        );
        self.stats.record_relocated();

        RelayOutcome::Relocated {
            thread_id: thread.id,
            notice_sent: report.notice_sent,
        }
    }

    fn abort(&self, stage: AbortStage, start: Instant) -> RelayOutcome {
        log_operation_metrics(
            stage.operation(),
            false,
            Some(self.elapsed(start)),
            Some(stage.reason()),
        );
        self.stats.record_aborted();
        RelayOutcome::Aborted(stage)
    }

    fn elapsed(&self, start: Instant) -> tokio::time::Duration {
        self.clock.now().saturating_duration_since(start)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

