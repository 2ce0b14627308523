//! Removal of the "started a thread" system message the platform posts
//! whenever the bot creates a thread.

use threadit_types::MessageSnapshot;
use tracing::{debug, error, warn};

use crate::platform::{BotIdentity, ChatPlatform};

/// True for a thread-created notice posted on behalf of the bot.
pub fn is_own_thread_notice(message: &MessageSnapshot, bot: &BotIdentity) -> bool {
    message.is_thread_created_notice() && message.author.id == bot.user_id
}

/// Delete `message` if it is the bot's own thread-created notice.
///
/// Returns `true` when the message was such a notice, whether or not the
/// deletion went through; the caller must not process it any further.
pub async fn suppress_thread_notice<P: ChatPlatform>(
    platform: &P,
    message: &MessageSnapshot,
    bot: &BotIdentity,
) -> bool {
    if !is_own_thread_notice(message, bot) {
        return false;
    }

    match platform.delete_message(message.channel.id, message.id).await {
        Ok(()) => debug!(
            "Deleted thread creation notice {} in {}",
            message.id,
            message.channel.label()
        ),
        Err(e) if e.is_forbidden() => warn!(
            "Missing permissions to delete thread creation notice in {}",
            message.channel.label()
        ),
        Err(e) => error!("Error deleting thread creation notice {}: {}", message.id, e),
    }

    true
}
