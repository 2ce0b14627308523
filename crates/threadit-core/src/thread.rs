//! Thread reuse or creation on the parent message.

use threadit_types::{PlatformError, ThreadHandle};
use tracing::{debug, error};

use crate::gather::ReplyInfo;
use crate::naming::thread_name;
use crate::platform::ChatPlatform;
use crate::settings::RelaySettings;

/// Return the parent's existing thread, or start a public one on it.
///
/// A parent carries at most one thread, so an existing one is always
/// reused. `None` means no thread is available and the run must stop.
pub async fn resolve_or_create<P: ChatPlatform>(
    platform: &P,
    settings: &RelaySettings,
    reply: &ReplyInfo,
) -> Option<ThreadHandle> {
    let parent = &reply.parent;

    if let Some(thread) = &parent.thread {
        debug!(
            "Reusing thread '{}' (ID: {}) on message {}",
            thread.name, thread.id, parent.id
        );
        return Some(thread.clone());
    }

    let name = thread_name(&parent.content, settings.max_thread_name_length);

    match platform
        .create_thread(
            parent.channel.id,
            parent.id,
            &name,
            settings.auto_archive_minutes,
        )
        .await
    {
        Ok(thread) => {
            debug!(
                "Created thread '{}' (ID: {}) on message {} in channel {}",
                thread.name,
                thread.id,
                parent.id,
                parent.channel.label()
            );
            Some(thread)
        }
        Err(e) if e.is_forbidden() => {
            error!(
                "Missing permissions to create thread on message {} in guild {}",
                parent.id,
                parent.channel.guild_id.unwrap_or_default()
            );
            None
        }
        Err(e @ (PlatformError::Unexpected(_) | PlatformError::Network(_))) => {
            error!(
                "Unexpected error creating thread on message {}: {}",
                parent.id, e
            );
            None
        }
        Err(e) => {
            error!("HTTP error creating thread on message {}: {}", parent.id, e);
            None
        }
    }
}
