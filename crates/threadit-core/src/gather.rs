//! Snapshot of everything needed to repost a reply.

use threadit_types::{AttachmentSnapshot, ChannelRef, EmbedSnapshot, MessageSnapshot, UserSnapshot};
use tracing::{debug, error, warn};

use crate::platform::ChatPlatform;

/// Built once per reply and never mutated. The attachment and embed lists
/// are copies, so they outlive the deletion of the original reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyInfo {
    pub content: String,
    pub author: UserSnapshot,
    pub attachments: Vec<AttachmentSnapshot>,
    pub embeds: Vec<EmbedSnapshot>,
    pub channel: ChannelRef,
    pub parent: MessageSnapshot,
    pub message_id: u64,
    pub created_at: String,
}

/// Resolve the parent of `message` and snapshot the reply.
///
/// Returns `None` when the parent cannot be fetched; the reason is logged here.
pub async fn gather<P: ChatPlatform>(platform: &P, message: &MessageSnapshot) -> Option<ReplyInfo> {
    let Some(parent_id) = message.referenced_message_id else {
        warn!("Could not retrieve parent message for reply {}", message.id);
        return None;
    };

    let parent = match platform.fetch_message(&message.channel, parent_id).await {
        Ok(parent) => parent,
        Err(e) if e.is_not_found() => {
            warn!(
                "Parent message {} not found for reply {}",
                parent_id, message.id
            );
            return None;
        }
        Err(e) if e.is_forbidden() => {
            warn!(
                "No permission to fetch parent message {} for reply {}",
                parent_id, message.id
            );
            return None;
        }
        Err(e) => {
            error!(
                "Error fetching parent message {} for reply {}: {}",
                parent_id, message.id, e
            );
            return None;
        }
    };

    let info = ReplyInfo {
        content: message.content.clone(),
        author: message.author.clone(),
        attachments: message.attachments.clone(),
        embeds: message.embeds.clone(),
        channel: message.channel.clone(),
        parent,
        message_id: message.id,
        created_at: message.timestamp.clone(),
    };

    debug!(
        "Gathered reply info: content_length={}, attachments={}, embeds={}, parent_author={}",
        info.content.len(),
        info.attachments.len(),
        info.embeds.len(),
        info.parent.author.username
    );

    Some(info)
}
