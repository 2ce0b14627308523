//! Live [`ChatPlatform`] backed by serenity's HTTP client and cache.

use std::sync::Arc;
use std::time::Duration;

use serenity::builder::CreateThread;
use serenity::cache::Cache;
use serenity::http::Http;
use serenity::model::channel::{AutoArchiveDuration, Message as SerenityMessage};
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use serenity::model::permissions::Permissions;
use threadit_core::{ChatPlatform, OutgoingMessage};
use threadit_types::{
    AttachmentSnapshot, Capability, ChannelKind, ChannelRef, MessageSnapshot, PermissionSet,
    PlatformError, SentMessage, ThreadHandle,
};

use crate::convert::{build_message, channel_kind, convert_message, convert_thread};
use crate::errors::{classify, classify_download};

/// Upper bound on one attachment download. A stalled CDN connection fails
/// the single attachment instead of holding up the repost.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client used to re-download attachments.
pub fn attachment_downloader(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

#[derive(Clone)]
pub struct SerenityPlatform {
    http: Arc<Http>,
    cache: Arc<Cache>,
    downloader: reqwest::Client,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>, downloader: reqwest::Client) -> Self {
        Self {
            http,
            cache,
            downloader,
        }
    }

    pub fn bot_user_id(&self) -> u64 {
        self.cache.current_user().id.get()
    }

    /// Resolve where a channel lives from the cache.
    ///
    /// Threads are looked up alongside regular channels. A guild channel
    /// missing from the cache keeps its guild id with an unknown kind, so it
    /// is ignored rather than mistaken for a DM.
    pub fn channel_ref(&self, channel_id: ChannelId, guild_id: Option<GuildId>) -> ChannelRef {
        let Some(guild_id) = guild_id else {
            return ChannelRef::direct(channel_id.get());
        };

        let resolved = self.cache.guild(guild_id).and_then(|guild| {
            guild
                .channels
                .get(&channel_id)
                .or_else(|| guild.threads.iter().find(|t| t.id == channel_id))
                .map(|c| (channel_kind(c.kind), Some(c.name.clone())))
        });

        let (kind, name) = resolved.unwrap_or((ChannelKind::Unknown, None));
        ChannelRef {
            id: channel_id.get(),
            guild_id: Some(guild_id.get()),
            kind,
            name,
        }
    }

    /// Guild-specific avatar of a cached member, if set.
    pub fn guild_avatar(&self, guild_id: GuildId, user_id: UserId) -> Option<String> {
        self.cache
            .member(guild_id, user_id)
            .and_then(|member| member.avatar_url())
    }

    /// Snapshot a gateway message.
    pub fn snapshot(&self, msg: &SerenityMessage) -> MessageSnapshot {
        let guild_avatar = msg
            .guild_id
            .and_then(|guild_id| self.guild_avatar(guild_id, msg.author.id));
        convert_message(
            msg,
            self.channel_ref(msg.channel_id, msg.guild_id),
            guild_avatar,
        )
    }
}

fn archive_duration(minutes: u16) -> AutoArchiveDuration {
    match minutes {
        60 => AutoArchiveDuration::OneHour,
        4320 => AutoArchiveDuration::ThreeDays,
        10080 => AutoArchiveDuration::OneWeek,
        _ => AutoArchiveDuration::OneDay,
    }
}

/// Translate serenity's permission bits into relay capabilities.
pub fn capabilities(perms: Permissions) -> PermissionSet {
    [
        (perms.view_channel(), Capability::ViewChannel),
        (perms.send_messages(), Capability::SendMessages),
        (perms.send_messages_in_threads(), Capability::SendMessagesInThreads),
        (perms.create_public_threads(), Capability::CreatePublicThreads),
        (perms.manage_messages(), Capability::ManageMessages),
        (perms.read_message_history(), Capability::ReadMessageHistory),
    ]
    .into_iter()
    .filter_map(|(granted, capability)| granted.then_some(capability))
    .collect()
}

impl ChatPlatform for SerenityPlatform {
    async fn fetch_message(
        &self,
        channel: &ChannelRef,
        message_id: u64,
    ) -> Result<MessageSnapshot, PlatformError> {
        // straight to the API so a deleted message is never served from cache
        let msg = self
            .http
            .get_message(ChannelId::new(channel.id), MessageId::new(message_id))
            .await
            .map_err(|e| classify(&e))?;
        Ok(convert_message(&msg, channel.clone(), None))
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError> {
        ChannelId::new(channel_id)
            .delete_message(&*self.http, MessageId::new(message_id))
            .await
            .map_err(|e| classify(&e))
    }

    async fn send_message(
        &self,
        channel_id: u64,
        message: OutgoingMessage,
    ) -> Result<SentMessage, PlatformError> {
        let sent = ChannelId::new(channel_id)
            .send_message(&*self.http, build_message(message))
            .await
            .map_err(|e| classify(&e))?;
        Ok(SentMessage {
            id: sent.id.get(),
            channel_id: sent.channel_id.get(),
        })
    }

    async fn create_thread(
        &self,
        channel_id: u64,
        message_id: u64,
        name: &str,
        auto_archive_minutes: u16,
    ) -> Result<ThreadHandle, PlatformError> {
        let builder =
            CreateThread::new(name).auto_archive_duration(archive_duration(auto_archive_minutes));
        let thread = ChannelId::new(channel_id)
            .create_thread_from_message(&*self.http, MessageId::new(message_id), builder)
            .await
            .map_err(|e| classify(&e))?;
        Ok(convert_thread(&thread))
    }

    async fn add_thread_member(&self, thread_id: u64, user_id: u64) -> Result<(), PlatformError> {
        ChannelId::new(thread_id)
            .add_thread_member(&*self.http, UserId::new(user_id))
            .await
            .map_err(|e| classify(&e))
    }

    async fn fetch_attachment(
        &self,
        attachment: &AttachmentSnapshot,
    ) -> Result<Vec<u8>, PlatformError> {
        let response = self
            .downloader
            .get(&attachment.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| classify_download(&e))?;
        let bytes = response.bytes().await.map_err(|e| classify_download(&e))?;
        Ok(bytes.to_vec())
    }

    fn bot_permissions(&self, channel: &ChannelRef) -> Option<PermissionSet> {
        let guild_id = GuildId::new(channel.guild_id?);
        let channel_id = ChannelId::new(channel.id);
        let bot_id = self.cache.current_user().id;

        // the guard is not Send; it must be dropped before any await
        let guild = self.cache.guild(guild_id)?;
        let guild_channel = guild.channels.get(&channel_id)?;
        let member = guild.members.get(&bot_id)?;
        Some(capabilities(guild.user_permissions_in(guild_channel, member)))
    }
}
