//! Eligibility of a message for relocation, from metadata alone.

use threadit_types::MessageSnapshot;

use crate::platform::BotIdentity;

/// Why a message is left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    AuthorIsBot,
    NotAReply,
    InThread,
    NotInGuild,
    ChannelUnsupported,
}

impl IgnoreReason {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::AuthorIsBot => "author is a bot",
            Self::NotAReply => "message is not a reply",
            Self::InThread => "message is already inside a thread",
            Self::NotInGuild => "message is not in a guild",
            Self::ChannelUnsupported => "channel does not support thread creation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ignored(IgnoreReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Decide whether `message` should be moved into a thread. Pure.
pub fn is_eligible(message: &MessageSnapshot, bot: &BotIdentity) -> Eligibility {
    let reason = if message.author.bot || message.author.id == bot.user_id {
        IgnoreReason::AuthorIsBot
    } else if !message.is_reply() {
        IgnoreReason::NotAReply
    } else if message.channel.kind.is_thread() {
        IgnoreReason::InThread
    } else if message.channel.guild_id.is_none() {
        IgnoreReason::NotInGuild
    } else if !message.channel.kind.supports_message_threads() {
        IgnoreReason::ChannelUnsupported
    } else {
        return Eligibility::Eligible;
    };
    Eligibility::Ignored(reason)
}
