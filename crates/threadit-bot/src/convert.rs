//! Conversions between serenity models and relay snapshots.

#[path = "convert_tests.rs"]
mod convert_tests;

use serenity::builder::{
    CreateAttachment, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage,
};
use serenity::model::channel::{
    Attachment as SerenityAttachment, ChannelType, Embed as SerenityEmbed, GuildChannel,
    Message as SerenityMessage, MessageType,
};
use serenity::model::user::User as SerenityUser;
use serenity::model::Timestamp;
use threadit_core::OutgoingMessage;
use threadit_types::{
    AttachmentSnapshot, ChannelKind, ChannelRef, EmbedAuthor, EmbedField, EmbedFooter,
    EmbedSnapshot, MessageKind, MessageSnapshot, ThreadHandle, UserSnapshot,
};

// ── serenity → snapshot ────────────────────────────────────────────────────

pub fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text => ChannelKind::GuildText,
        ChannelType::News => ChannelKind::GuildNews,
        ChannelType::PublicThread => ChannelKind::PublicThread,
        ChannelType::PrivateThread => ChannelKind::PrivateThread,
        ChannelType::NewsThread => ChannelKind::NewsThread,
        ChannelType::Voice | ChannelType::Stage => ChannelKind::GuildVoice,
        ChannelType::Forum => ChannelKind::GuildForum,
        ChannelType::Private => ChannelKind::Dm,
        _ => ChannelKind::Unknown,
    }
}

pub fn message_kind(kind: MessageType) -> MessageKind {
    match kind {
        MessageType::Regular => MessageKind::Regular,
        MessageType::InlineReply => MessageKind::Reply,
        MessageType::ThreadCreated => MessageKind::ThreadCreated,
        _ => MessageKind::Other,
    }
}

/// `nick` and `guild_avatar` come from the guild member when known and win
/// over the global name and avatar.
pub fn convert_user(
    user: &SerenityUser,
    nick: Option<&str>,
    guild_avatar: Option<String>,
) -> UserSnapshot {
    UserSnapshot {
        id: user.id.get(),
        username: user.name.clone(),
        display_name: nick.unwrap_or_else(|| user.display_name()).to_string(),
        avatar_url: Some(guild_avatar.unwrap_or_else(|| user.face())),
        bot: user.bot,
    }
}

pub fn convert_attachment(a: &SerenityAttachment) -> AttachmentSnapshot {
    AttachmentSnapshot {
        id: a.id.get(),
        filename: a.filename.clone(),
        url: a.url.clone(),
        description: a.description.clone(),
        content_type: a.content_type.clone(),
        size: u64::from(a.size),
    }
}

pub fn convert_embed(e: &SerenityEmbed) -> EmbedSnapshot {
    EmbedSnapshot {
        title: e.title.clone(),
        description: e.description.clone(),
        url: e.url.clone(),
        color: e.colour.map(|c| c.0),
        author: e.author.as_ref().map(|a| EmbedAuthor {
            name: a.name.clone(),
            url: a.url.clone(),
            icon_url: a.icon_url.clone(),
        }),
        footer: e.footer.as_ref().map(|f| EmbedFooter {
            text: f.text.clone(),
            icon_url: f.icon_url.clone(),
        }),
        image_url: e.image.as_ref().map(|i| i.url.clone()),
        thumbnail_url: e.thumbnail.as_ref().map(|t| t.url.clone()),
        fields: e
            .fields
            .iter()
            .map(|f| EmbedField {
                name: f.name.clone(),
                value: f.value.clone(),
                inline: f.inline,
            })
            .collect(),
        timestamp: e.timestamp.and_then(|t| t.to_rfc3339()),
    }
}

pub fn convert_thread(thread: &GuildChannel) -> ThreadHandle {
    ThreadHandle {
        id: thread.id.get(),
        name: thread.name.clone(),
        parent_channel_id: thread.parent_id.map_or(0, |p| p.get()),
    }
}

/// Snapshot `msg` as posted in `channel`.
///
/// The channel and the author's guild avatar are resolved by the caller:
/// REST responses carry no guild id, and neither payload carries the
/// channel type or the member's avatar.
pub fn convert_message(
    msg: &SerenityMessage,
    channel: ChannelRef,
    guild_avatar: Option<String>,
) -> MessageSnapshot {
    let nick = msg.member.as_ref().and_then(|m| m.nick.as_deref());

    MessageSnapshot {
        id: msg.id.get(),
        channel,
        author: convert_user(&msg.author, nick, guild_avatar),
        content: msg.content.clone(),
        kind: message_kind(msg.kind),
        timestamp: msg.timestamp.to_rfc3339().unwrap_or_default(),
        attachments: msg.attachments.iter().map(convert_attachment).collect(),
        embeds: msg.embeds.iter().map(convert_embed).collect(),
        referenced_message_id: msg
            .message_reference
            .as_ref()
            .and_then(|r| r.message_id)
            .map(|id| id.get()),
        thread: msg.thread.as_ref().map(convert_thread),
    }
}

// ── snapshot → serenity builders ───────────────────────────────────────────

pub fn build_embed(embed: &EmbedSnapshot) -> CreateEmbed {
    let mut out = CreateEmbed::new();
    if let Some(title) = &embed.title {
        out = out.title(title);
    }
    // Discord rejects empty descriptions
    if let Some(description) = embed.description.as_deref().filter(|d| !d.is_empty()) {
        out = out.description(description);
    }
    if let Some(url) = &embed.url {
        out = out.url(url);
    }
    if let Some(color) = embed.color {
        out = out.colour(color);
    }
    if let Some(author) = &embed.author {
        let mut a = CreateEmbedAuthor::new(&author.name);
        if let Some(url) = &author.url {
            a = a.url(url);
        }
        if let Some(icon) = &author.icon_url {
            a = a.icon_url(icon);
        }
        out = out.author(a);
    }
    if let Some(footer) = &embed.footer {
        let mut f = CreateEmbedFooter::new(&footer.text);
        if let Some(icon) = &footer.icon_url {
            f = f.icon_url(icon);
        }
        out = out.footer(f);
    }
    if let Some(image) = &embed.image_url {
        out = out.image(image);
    }
    if let Some(thumbnail) = &embed.thumbnail_url {
        out = out.thumbnail(thumbnail);
    }
    for field in &embed.fields {
        out = out.field(&field.name, &field.value, field.inline);
    }
    if let Some(ts) = embed
        .timestamp
        .as_deref()
        .and_then(|t| Timestamp::parse(t).ok())
    {
        out = out.timestamp(ts);
    }
    out
}

pub fn build_message(message: OutgoingMessage) -> CreateMessage {
    let mut out = CreateMessage::new();
    if let Some(content) = message.content {
        out = out.content(content);
    }
    if !message.embeds.is_empty() {
        out = out.embeds(message.embeds.iter().map(build_embed).collect());
    }
    for file in message.files {
        let mut attachment = CreateAttachment::bytes(file.data, file.filename);
        if let Some(description) = file.description {
            attachment = attachment.description(description);
        }
        out = out.add_file(attachment);
    }
    out
}
