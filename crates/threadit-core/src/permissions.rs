use threadit_types::{ChannelRef, REQUIRED_CAPABILITIES};

use crate::platform::ChatPlatform;

/// Result of checking the bot's capabilities in a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
    pub ok: bool,
    /// Display names of everything missing, in check order
    pub missing: Vec<String>,
}

impl PermissionCheck {
    fn denied(reason: &str) -> Self {
        Self {
            ok: false,
            missing: vec![reason.to_string()],
        }
    }
}

/// Check every capability the relay needs in `channel`. Fails closed.
pub fn check_permissions<P: ChatPlatform>(platform: &P, channel: &ChannelRef) -> PermissionCheck {
    if channel.guild_id.is_none() {
        return PermissionCheck::denied("Not a guild channel");
    }

    let Some(granted) = platform.bot_permissions(channel) else {
        return PermissionCheck::denied("Bot not in guild");
    };

    let missing: Vec<String> = granted
        .missing(&REQUIRED_CAPABILITIES)
        .into_iter()
        .map(|c| c.display_name().to_string())
        .collect();

    PermissionCheck {
        ok: missing.is_empty(),
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::fixtures::guild_channel;
    use crate::mock::MockPlatform;
    use threadit_types::{Capability, PermissionSet};

    #[test]
    fn test_all_granted() {
        let mock = MockPlatform::new();
        let check = check_permissions(&mock, &guild_channel());
        assert!(check.ok);
        assert!(check.missing.is_empty());
    }

    #[test]
    fn test_reports_every_missing_capability_in_order() {
        let mock = MockPlatform::new();
        let mut perms = PermissionSet::all();
        perms.revoke(Capability::ReadMessageHistory);
        perms.revoke(Capability::CreatePublicThreads);
        perms.revoke(Capability::SendMessages);
        mock.set_permissions(Some(perms));

        let check = check_permissions(&mock, &guild_channel());

        assert!(!check.ok);
        assert_eq!(
            check.missing,
            vec![
                "Send Messages",
                "Create Public Threads",
                "Read Message History"
            ]
        );
    }

    #[test]
    fn test_no_permissions_at_all() {
        let mock = MockPlatform::new();
        mock.set_permissions(Some(PermissionSet::new()));
        let check = check_permissions(&mock, &guild_channel());
        assert_eq!(check.missing.len(), REQUIRED_CAPABILITIES.len());
    }

    #[test]
    fn test_unresolvable_member_fails_closed() {
        let mock = MockPlatform::new();
        mock.set_permissions(None);
        let check = check_permissions(&mock, &guild_channel());
        assert!(!check.ok);
        assert_eq!(check.missing, vec!["Bot not in guild"]);
    }

    #[test]
    fn test_dm_channel_fails_closed() {
        let mock = MockPlatform::new();
        let check = check_permissions(&mock, &ChannelRef::direct(55));
        assert!(!check.ok);
        assert_eq!(check.missing, vec!["Not a guild channel"]);
    }
}
