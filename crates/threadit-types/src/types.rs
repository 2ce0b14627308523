//! Core message, channel and thread types
//!
//! These are snapshots: once built from a gateway event or a REST response
//! they are never mutated, and they stay readable after the live message
//! has been deleted.

use serde::{Deserialize, Serialize};

/// Discord user as seen by the relay
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSnapshot {
    pub id: u64,
    pub username: String,
    /// Guild nickname, else global name, else username
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub bot: bool,
}

impl UserSnapshot {
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// Channel type, reduced to what the relay needs to decide on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    GuildText,
    GuildNews,
    PublicThread,
    PrivateThread,
    NewsThread,
    GuildVoice,
    GuildForum,
    Dm,
    Unknown,
}

impl ChannelKind {
    pub fn is_thread(&self) -> bool {
        matches!(
            self,
            Self::PublicThread | Self::PrivateThread | Self::NewsThread
        )
    }

    /// Whether a thread can be started from a message in this channel.
    pub fn supports_message_threads(&self) -> bool {
        matches!(self, Self::GuildText | Self::GuildNews)
    }
}

/// Where a message lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelRef {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<u64>,
    pub kind: ChannelKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChannelRef {
    pub fn direct(id: u64) -> Self {
        Self {
            id,
            guild_id: None,
            kind: ChannelKind::Dm,
            name: None,
        }
    }

    /// `#name` when the name is known, the raw id otherwise. Used in log lines.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("#{}", name),
            None => self.id.to_string(),
        }
    }
}

/// A thread the relay posts into
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadHandle {
    pub id: u64,
    pub name: String,
    pub parent_channel_id: u64,
}

impl ThreadHandle {
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

/// Message attachment; the payload is fetched separately through `url`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttachmentSnapshot {
    pub id: u64,
    pub filename: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub size: u64,
}

/// Embed field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Embed author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Embed footer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Message embed
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbedSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
    /// ISO 8601 timestamp string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Message type, reduced to what the relay distinguishes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Regular,
    /// Inline reply to another message
    Reply,
    /// "X started a thread" system notice
    ThreadCreated,
    Other,
}

/// Discord message snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageSnapshot {
    pub id: u64,
    pub channel: ChannelRef,
    pub author: UserSnapshot,
    pub content: String,
    pub kind: MessageKind,
    /// RFC 3339 creation timestamp
    pub timestamp: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentSnapshot>,
    #[serde(default)]
    pub embeds: Vec<EmbedSnapshot>,
    /// Id of the message this one references, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_message_id: Option<u64>,
    /// Thread already started from this message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<ThreadHandle>,
}

impl MessageSnapshot {
    /// True for inline replies that still carry their parent reference.
    pub fn is_reply(&self) -> bool {
        self.kind == MessageKind::Reply && self.referenced_message_id.is_some()
    }

    pub fn is_thread_created_notice(&self) -> bool {
        self.kind == MessageKind::ThreadCreated
    }
}

/// Message successfully posted by the bot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentMessage {
    pub id: u64,
    pub channel_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserSnapshot {
        UserSnapshot {
            id: 42,
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            avatar_url: None,
            bot: false,
        }
    }

    fn message(kind: MessageKind, reference: Option<u64>) -> MessageSnapshot {
        MessageSnapshot {
            id: 1,
            channel: ChannelRef {
                id: 10,
                guild_id: Some(100),
                kind: ChannelKind::GuildText,
                name: Some("general".to_string()),
            },
            author: user(),
            content: "hi".to_string(),
            kind,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            attachments: vec![],
            embeds: vec![],
            referenced_message_id: reference,
            thread: None,
        }
    }

    #[test]
    fn test_mentions() {
        assert_eq!(user().mention(), "<@42>");
        let thread = ThreadHandle {
            id: 77,
            name: "t".to_string(),
            parent_channel_id: 10,
        };
        assert_eq!(thread.mention(), "<#77>");
    }

    #[test]
    fn test_channel_kind_threads() {
        assert!(ChannelKind::PublicThread.is_thread());
        assert!(ChannelKind::PrivateThread.is_thread());
        assert!(ChannelKind::NewsThread.is_thread());
        assert!(!ChannelKind::GuildText.is_thread());
    }

    #[test]
    fn test_channel_kind_supports_message_threads() {
        assert!(ChannelKind::GuildText.supports_message_threads());
        assert!(ChannelKind::GuildNews.supports_message_threads());
        assert!(!ChannelKind::GuildVoice.supports_message_threads());
        assert!(!ChannelKind::GuildForum.supports_message_threads());
        assert!(!ChannelKind::PublicThread.supports_message_threads());
        assert!(!ChannelKind::Dm.supports_message_threads());
        assert!(!ChannelKind::Unknown.supports_message_threads());
    }

    #[test]
    fn test_is_reply_requires_kind_and_reference() {
        assert!(message(MessageKind::Reply, Some(5)).is_reply());
        assert!(!message(MessageKind::Reply, None).is_reply());
        assert!(!message(MessageKind::Regular, None).is_reply());
        // thread-created notices carry a reference too
        assert!(!message(MessageKind::ThreadCreated, Some(5)).is_reply());
    }

    #[test]
    fn test_channel_label() {
        let msg = message(MessageKind::Regular, None);
        assert_eq!(msg.channel.label(), "#general");
        assert_eq!(ChannelRef::direct(9).label(), "9");
    }

    #[test]
    fn test_message_serde_skips_empty_optionals() {
        let msg = message(MessageKind::Reply, Some(5));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["kind"], "reply");
        assert_eq!(json["channel"]["kind"], "guild_text");
        assert!(json.get("thread").is_none());
        let back: MessageSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }
}
