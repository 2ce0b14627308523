//! The remote chat platform as seen by the pipeline.
//!
//! Implemented by the serenity-backed client in the bot binary and by
//! [`MockPlatform`](crate::mock::MockPlatform) in tests.

use std::future::Future;

use threadit_types::{
    AttachmentSnapshot, ChannelRef, EmbedSnapshot, MessageSnapshot, PermissionSet,
    PlatformError, SentMessage, ThreadHandle,
};

/// The bot's own identity, passed explicitly into every pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotIdentity {
    pub user_id: u64,
}

impl BotIdentity {
    pub fn new(user_id: u64) -> Self {
        Self { user_id }
    }
}

/// A file to upload alongside a message
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingFile {
    pub filename: String,
    pub data: Vec<u8>,
    pub description: Option<String>,
}

/// Message the bot sends
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingMessage {
    pub content: Option<String>,
    pub embeds: Vec<EmbedSnapshot>,
    pub files: Vec<OutgoingFile>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

/// Remote operations the relay depends on. Each call is attempted once;
/// rate limiting is the implementation's concern.
pub trait ChatPlatform: Send + Sync {
    fn fetch_message(
        &self,
        channel: &ChannelRef,
        message_id: u64,
    ) -> impl Future<Output = Result<MessageSnapshot, PlatformError>> + Send;

    fn delete_message(
        &self,
        channel_id: u64,
        message_id: u64,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Send to a channel or thread.
    fn send_message(
        &self,
        channel_id: u64,
        message: OutgoingMessage,
    ) -> impl Future<Output = Result<SentMessage, PlatformError>> + Send;

    /// Start a public thread anchored on `message_id`.
    fn create_thread(
        &self,
        channel_id: u64,
        message_id: u64,
        name: &str,
        auto_archive_minutes: u16,
    ) -> impl Future<Output = Result<ThreadHandle, PlatformError>> + Send;

    fn add_thread_member(
        &self,
        thread_id: u64,
        user_id: u64,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    fn fetch_attachment(
        &self,
        attachment: &AttachmentSnapshot,
    ) -> impl Future<Output = Result<Vec<u8>, PlatformError>> + Send;

    /// Permissions of the bot's own member in `channel`.
    ///
    /// `None` when the member cannot be resolved (not in the guild, or not cached).
    fn bot_permissions(&self, channel: &ChannelRef) -> Option<PermissionSet>;
}
