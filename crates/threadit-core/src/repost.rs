//! Reposting a reply inside its thread with attribution.

use threadit_types::{EmbedAuthor, EmbedSnapshot, PlatformError, ThreadHandle};
use tracing::{debug, error, warn};

use crate::gather::ReplyInfo;
use crate::platform::{ChatPlatform, OutgoingFile, OutgoingMessage};
use crate::settings::RelaySettings;

/// Card crediting the original author: text as body, name and avatar as
/// byline, original timestamp.
pub fn attribution_card(reply: &ReplyInfo, accent_color: u32) -> EmbedSnapshot {
    EmbedSnapshot {
        description: Some(reply.content.clone()),
        color: Some(accent_color),
        author: Some(EmbedAuthor {
            name: reply.author.display_name.clone(),
            url: None,
            icon_url: reply.author.avatar_url.clone(),
        }),
        timestamp: Some(reply.created_at.clone()),
        ..EmbedSnapshot::default()
    }
}

/// Re-download every attachment. Failures are logged and skipped.
async fn rehost_attachments<P: ChatPlatform>(platform: &P, reply: &ReplyInfo) -> Vec<OutgoingFile> {
    let mut files = Vec::with_capacity(reply.attachments.len());
    for attachment in &reply.attachments {
        match platform.fetch_attachment(attachment).await {
            Ok(data) => files.push(OutgoingFile {
                filename: attachment.filename.clone(),
                data,
                description: attachment.description.clone(),
            }),
            Err(e) => warn!(
                "Failed to process attachment {}: {}",
                attachment.filename, e
            ),
        }
    }
    files
}

/// Post the reply into `thread`. `false` only when the message itself
/// could not be sent.
pub async fn repost<P: ChatPlatform>(
    platform: &P,
    settings: &RelaySettings,
    thread: &ThreadHandle,
    reply: &ReplyInfo,
) -> bool {
    let mut embeds = Vec::with_capacity(reply.embeds.len() + 1);
    embeds.push(attribution_card(reply, settings.accent_color));
    embeds.extend(reply.embeds.iter().cloned());
    let total_embeds = embeds.len();

    let files = rehost_attachments(platform, reply).await;
    let rehosted = files.len();

    let message = OutgoingMessage {
        content: None,
        embeds,
        files,
    };

    if let Err(e) = platform.send_message(thread.id, message).await {
        match e {
            _ if e.is_forbidden() => {
                error!("Missing permissions to send message in thread {}", thread.id);
            }
            PlatformError::Unexpected(_) => {
                error!("Unexpected error reposting in thread {}: {}", thread.id, e);
            }
            _ => error!("HTTP error sending message to thread {}: {}", thread.id, e),
        }
        return false;
    }

    let author = &reply.author;
    match platform.add_thread_member(thread.id, author.id).await {
        Ok(()) => debug!(
            "Added {} as participant to thread {}",
            author.display_name, thread.id
        ),
        Err(e) if e.is_forbidden() => warn!(
            "Missing permissions to add {} to thread {}",
            author.display_name, thread.id
        ),
        Err(e) => warn!(
            "Error adding {} to thread {}: {}",
            author.display_name, thread.id, e
        ),
    }

    debug!(
        "Reposted reply content in thread {} with embed attribution: content_length={}, \
         attachments={}/{}, original_embeds={}, total_embeds={}",
        thread.id,
        reply.content.len(),
        rehosted,
        reply.attachments.len(),
        reply.embeds.len(),
        total_embeds
    );

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::fixtures::{attachment, guild_channel, link_embed, parent, user};
    use crate::mock::{Call, MockPlatform, Op};

    fn thread() -> ThreadHandle {
        ThreadHandle {
            id: 500,
            name: "t".to_string(),
            parent_channel_id: 10,
        }
    }

    fn info() -> ReplyInfo {
        ReplyInfo {
            content: "my reply".to_string(),
            author: user(42, "Alice"),
            attachments: vec![],
            embeds: vec![],
            channel: guild_channel(),
            parent: parent(2, "q"),
            message_id: 1,
            created_at: "2024-01-01T00:05:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_attribution_card() {
        let card = attribution_card(&info(), 0x5865F2);
        assert_eq!(card.description.as_deref(), Some("my reply"));
        assert_eq!(card.color, Some(0x5865F2));
        let author = card.author.unwrap();
        assert_eq!(author.name, "Alice");
        assert_eq!(
            author.icon_url.as_deref(),
            Some("https://cdn.example/avatars/42.png")
        );
        assert_eq!(card.timestamp.as_deref(), Some("2024-01-01T00:05:00+00:00"));
    }

    #[test]
    fn test_attribution_card_empty_body() {
        let mut reply = info();
        reply.content.clear();
        assert_eq!(attribution_card(&reply, 1).description.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_card_precedes_original_embeds() {
        let mock = MockPlatform::new();
        let mut reply = info();
        reply.embeds = vec![link_embed("first"), link_embed("second")];

        assert!(repost(&mock, &RelaySettings::default(), &thread(), &reply).await);

        let sent = mock.sent_messages();
        assert_eq!(sent.len(), 1);
        let (channel_id, message) = &sent[0];
        assert_eq!(*channel_id, 500);
        let titles: Vec<_> = message.embeds.iter().map(|e| e.title.as_deref()).collect();
        assert_eq!(titles, vec![None, Some("first"), Some("second")]);
        assert_eq!(message.embeds[0].description.as_deref(), Some("my reply"));
        assert!(message.content.is_none());
    }

    #[tokio::test]
    async fn test_attachments_rehosted_with_name_and_description() {
        let mock = MockPlatform::new();
        let mut reply = info();
        let a = attachment(5, "a.png");
        mock.set_attachment_data(a.url.clone(), vec![1, 2, 3]);
        reply.attachments = vec![a];

        assert!(repost(&mock, &RelaySettings::default(), &thread(), &reply).await);

        let (_, message) = &mock.sent_messages()[0];
        assert_eq!(
            message.files,
            vec![OutgoingFile {
                filename: "a.png".to_string(),
                data: vec![1, 2, 3],
                description: Some("a.png description".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_failing_attachment_is_skipped() {
        let mock = MockPlatform::new();
        let mut reply = info();
        reply.attachments = vec![attachment(5, "a.png"), attachment(6, "b.png")];
        mock.fail_attachment("b.png", PlatformError::Network("reset".into()));

        assert!(repost(&mock, &RelaySettings::default(), &thread(), &reply).await);

        let (_, message) = &mock.sent_messages()[0];
        let names: Vec<_> = message.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["a.png"]);
        assert_eq!(mock.calls_of(Op::FetchAttachment).len(), 2);
    }

    #[tokio::test]
    async fn test_failure_of_first_attachment_does_not_affect_second() {
        let mock = MockPlatform::new();
        let mut reply = info();
        reply.attachments = vec![attachment(5, "a.png"), attachment(6, "b.png")];
        mock.fail_attachment("a.png", PlatformError::NotFound("gone".into()));

        assert!(repost(&mock, &RelaySettings::default(), &thread(), &reply).await);

        let (_, message) = &mock.sent_messages()[0];
        let names: Vec<_> = message.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["b.png"]);
    }

    #[tokio::test]
    async fn test_author_added_to_thread() {
        let mock = MockPlatform::new();
        assert!(repost(&mock, &RelaySettings::default(), &thread(), &info()).await);
        assert_eq!(
            mock.calls_of(Op::AddThreadMember),
            vec![Call::AddThreadMember {
                thread_id: 500,
                user_id: 42
            }]
        );
    }

    #[tokio::test]
    async fn test_add_member_failure_still_succeeds() {
        let mock = MockPlatform::new();
        mock.fail_next(Op::AddThreadMember, PlatformError::Forbidden("no".into()));
        assert!(repost(&mock, &RelaySettings::default(), &thread(), &info()).await);
    }

    #[tokio::test]
    async fn test_send_failure_returns_false_and_skips_add_member() {
        for err in [
            PlatformError::Forbidden("Missing Permissions".into()),
            PlatformError::Http {
                status: 500,
                code: 0,
                message: "boom".into(),
            },
            PlatformError::Unexpected("decode".into()),
        ] {
            let mock = MockPlatform::new();
            mock.fail_next(Op::SendMessage, err);
            assert!(!repost(&mock, &RelaySettings::default(), &thread(), &info()).await);
            assert!(mock.calls_of(Op::AddThreadMember).is_empty());
        }
    }
}
