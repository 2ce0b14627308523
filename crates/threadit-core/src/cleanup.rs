//! Removal of the original reply and the short-lived redirect notice.

use threadit_types::{PlatformError, ThreadHandle};
use tracing::{debug, error, warn};

use crate::clock::Clock;
use crate::gather::ReplyInfo;
use crate::platform::{ChatPlatform, OutgoingMessage};
use crate::settings::RelaySettings;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub original_deleted: bool,
    pub notice_sent: bool,
}

/// Delete the original reply, then point its author at the thread.
///
/// The notice is only posted when the deletion succeeded; otherwise the
/// reply would be visible twice.
pub async fn cleanup<P: ChatPlatform, C: Clock>(
    platform: &P,
    clock: &C,
    settings: &RelaySettings,
    thread: &ThreadHandle,
    reply: &ReplyInfo,
) -> CleanupReport {
    let original_deleted = delete_original_reply(platform, reply).await;
    let notice_sent = if original_deleted {
        send_temporary_notification(platform, clock, settings, thread, reply).await
    } else {
        false
    };
    CleanupReport {
        original_deleted,
        notice_sent,
    }
}

/// Re-fetch the reply by id and delete it. `true` only if it is gone because of us.
pub async fn delete_original_reply<P: ChatPlatform>(platform: &P, reply: &ReplyInfo) -> bool {
    let channel = &reply.channel;
    let message_id = reply.message_id;

    let result = match platform.fetch_message(channel, message_id).await {
        Ok(original) => platform.delete_message(original.channel.id, original.id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            debug!(
                "Deleted original reply message {} from {}",
                message_id,
                channel.label()
            );
            true
        }
        Err(e) if e.is_not_found() => {
            debug!(
                "Original reply message {} not found (already deleted?)",
                message_id
            );
            false
        }
        Err(e) if e.is_forbidden() => {
            warn!(
                "Missing permissions to delete original reply message {} in {}",
                message_id,
                channel.label()
            );
            false
        }
        Err(e @ PlatformError::Unexpected(_)) => {
            error!(
                "Unexpected error deleting original reply message {}: {}",
                message_id, e
            );
            false
        }
        Err(e) => {
            error!(
                "HTTP error deleting original reply message {}: {}",
                message_id, e
            );
            false
        }
    }
}

/// Post "continue in the thread", wait, delete it. Failures are only logged.
///
/// Returns whether the notice was posted.
pub async fn send_temporary_notification<P: ChatPlatform, C: Clock>(
    platform: &P,
    clock: &C,
    settings: &RelaySettings,
    thread: &ThreadHandle,
    reply: &ReplyInfo,
) -> bool {
    let channel = &reply.channel;
    let content = format!(
        "{}, please continue your conversation in {}.",
        reply.author.mention(),
        thread.mention()
    );

    let notice = match platform
        .send_message(channel.id, OutgoingMessage::text(content))
        .await
    {
        Ok(notice) => notice,
        Err(e) if e.is_forbidden() => {
            warn!(
                "Missing permissions to send notification message in {}",
                channel.label()
            );
            return false;
        }
        Err(e) => {
            error!("Error sending notification message in {}: {}", channel.label(), e);
            return false;
        }
    };

    debug!(
        "Sent temporary notification to {} in {}, message will auto-delete in {}s",
        reply.author.username,
        channel.label(),
        settings.notice_delete_after_secs
    );

    clock.sleep(settings.notice_delay()).await;

    match platform.delete_message(notice.channel_id, notice.id).await {
        Ok(()) => debug!(
            "Auto-deleted notification message {} in {}",
            notice.id,
            channel.label()
        ),
        Err(e) => error!("Error deleting notification message {}: {}", notice.id, e),
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::mock::fixtures::{guild_channel, parent, reply, user, CHANNEL_ID};
    use crate::mock::{Call, MockPlatform, Op};
    use tokio::time::Duration;

    fn thread() -> ThreadHandle {
        ThreadHandle {
            id: 500,
            name: "t".to_string(),
            parent_channel_id: CHANNEL_ID,
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

    /// Mock holding the original reply (id 1) so it can be deleted.
    fn platform_with_original() -> MockPlatform {
        let mock = MockPlatform::new();
        mock.insert_message(reply(1, 2));
        mock
    }

    #[tokio::test]
    async fn test_deletes_original_then_posts_and_removes_notice() {
        let mock = platform_with_original();
        let clock = MockClock::new();

        let report = cleanup(&mock, &clock, &RelaySettings::default(), &thread(), &info()).await;

        assert_eq!(
            report,
            CleanupReport {
                original_deleted: true,
                notice_sent: true
            }
        );
        assert!(!mock.has_message(1));

        let calls = mock.calls();
        assert_eq!(
            calls[0],
            Call::FetchMessage {
                channel_id: CHANNEL_ID,
                message_id: 1
            }
        );
        assert_eq!(
            calls[1],
            Call::DeleteMessage {
                channel_id: CHANNEL_ID,
                message_id: 1
            }
        );
        let Call::SendMessage {
            channel_id,
            message,
        } = &calls[2]
        else {
            panic!("expected notice send, got {:?}", calls[2]);
        };
        assert_eq!(*channel_id, CHANNEL_ID);
        assert_eq!(
            message.content.as_deref(),
            Some("<@42>, please continue your conversation in <#500>.")
        );
        assert!(matches!(
            calls[3],
            Call::DeleteMessage {
                channel_id: CHANNEL_ID,
                ..
            }
        ));
        assert_eq!(calls.len(), 4);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(8)]);
    }

    #[tokio::test]
    async fn test_already_deleted_original_sends_no_notice() {
        let mock = MockPlatform::new();
        let clock = MockClock::new();

        let report = cleanup(&mock, &clock, &RelaySettings::default(), &thread(), &info()).await;

        assert!(!report.original_deleted);
        assert!(!report.notice_sent);
        assert!(mock.calls_of(Op::SendMessage).is_empty());
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_delete_not_found_sends_no_notice() {
        let mock = platform_with_original();
        mock.fail_next(Op::DeleteMessage, PlatformError::NotFound("Unknown Message".into()));

        let report = cleanup(
            &mock,
            &MockClock::new(),
            &RelaySettings::default(),
            &thread(),
            &info(),
        )
        .await;

        assert!(!report.notice_sent);
        assert!(mock.calls_of(Op::SendMessage).is_empty());
    }

    #[tokio::test]
    async fn test_delete_forbidden_sends_no_notice() {
        let mock = platform_with_original();
        mock.fail_next(Op::DeleteMessage, PlatformError::Forbidden("Missing Permissions".into()));

        let report = cleanup(
            &mock,
            &MockClock::new(),
            &RelaySettings::default(),
            &thread(),
            &info(),
        )
        .await;

        assert!(!report.original_deleted);
        assert!(mock.calls_of(Op::SendMessage).is_empty());
        assert!(mock.has_message(1));
    }

    #[tokio::test]
    async fn test_delete_http_error_sends_no_notice() {
        let mock = platform_with_original();
        mock.fail_next(
            Op::DeleteMessage,
            PlatformError::Http {
                status: 502,
                code: 0,
                message: "bad gateway".into(),
            },
        );

        let report = cleanup(
            &mock,
            &MockClock::new(),
            &RelaySettings::default(),
            &thread(),
            &info(),
        )
        .await;

        assert_eq!(report, CleanupReport::default());
    }

    #[tokio::test]
    async fn test_notice_send_failure_is_contained() {
        let mock = platform_with_original();
        let clock = MockClock::new();
        mock.fail_next(Op::SendMessage, PlatformError::Forbidden("no".into()));

        let report = cleanup(&mock, &clock, &RelaySettings::default(), &thread(), &info()).await;

        assert!(report.original_deleted);
        assert!(!report.notice_sent);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_notice_delete_failure_is_contained() {
        let mock = platform_with_original();
        // the first queued DeleteMessage failure hits the notice, not the
        // original, once the original delete has gone through
        let report = {
            assert!(delete_original_reply(&mock, &info()).await);
            mock.fail_next(Op::DeleteMessage, PlatformError::Network("reset".into()));
            send_temporary_notification(
                &mock,
                &MockClock::new(),
                &RelaySettings::default(),
                &thread(),
                &info(),
            )
            .await
        };

        assert!(report);
        assert_eq!(mock.calls_of(Op::DeleteMessage).len(), 2);
    }

    #[tokio::test]
    async fn test_custom_notice_delay() {
        let mock = platform_with_original();
        let clock = MockClock::new();
        let settings = RelaySettings {
            notice_delete_after_secs: 3,
            ..RelaySettings::default()
        };

        cleanup(&mock, &clock, &settings, &thread(), &info()).await;

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(3)]);
    }
}
