//! Platform error taxonomy.
//!
//! Every remote call the relay makes fails with a [`PlatformError`]. The
//! variant is what pipeline stages branch on: not-found is benign,
//! forbidden is a permission problem, everything else is a failed call.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// High-level category of a Discord API error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Rate limit hit.
    RateLimit,
    /// Target resource (channel, message, user …) not found.
    NotFound,
    /// Insufficient bot permissions for the requested action.
    PermissionDenied,
    /// Request payload too large.
    PayloadTooLarge,
    /// Malformed or semantically invalid input.
    InvalidInput,
    /// Network or I/O error.
    Network,
    /// Unknown or uncategorised error.
    Unknown,
}

/// Discord JSON error code (subset relevant to the relay).
///
/// See <https://discord.com/developers/docs/topics/opcodes-and-status-codes#json>.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscordErrorCode {
    // ── Not found ─────────────────────────────────────────────────────────────
    /// 10003: Unknown channel.
    UnknownChannel,
    /// 10004: Unknown guild.
    UnknownGuild,
    /// 10007: Unknown member.
    UnknownMember,
    /// 10008: Unknown message (likely deleted).
    UnknownMessage,
    /// 10013: Unknown user.
    UnknownUser,

    // ── Permission errors ──────────────────────────────────────────────────────
    /// 50001: Missing access.
    MissingAccess,
    /// 50013: Missing permissions.
    MissingPermissions,

    // ── Rate limiting ──────────────────────────────────────────────────────────
    /// HTTP 429: Global or per-route rate limit.
    RateLimited,
    /// 20016: Action blocked by channel slowmode.
    SlowmodeRateLimit,
    /// 20028: Channel write rate limit reached.
    ChannelWriteRateLimit,

    // ── Message / thread errors ───────────────────────────────────────────────
    /// 50006: Cannot send an empty message.
    CannotSendEmptyMessage,
    /// 50035: Invalid form body (validation failed).
    InvalidFormBody,
    /// 160004: A thread has already been created for this message.
    ThreadAlreadyCreated,
    /// 160005 / 50083: Thread is locked or archived.
    ThreadLocked,

    // ── Resource limits ────────────────────────────────────────────────────────
    /// 40005 / HTTP 413: Request entity too large.
    RequestEntityTooLarge,

    // ── Server errors ──────────────────────────────────────────────────────────
    /// 130000: API resource overloaded.
    ApiOverloaded,

    // ── Catch-all ─────────────────────────────────────────────────────────────
    /// Any Discord JSON error code not listed above.
    Unknown,
}

impl DiscordErrorCode {
    /// Derive the code from a raw Discord JSON error code integer.
    pub fn from_raw(code: u32) -> Self {
        match code {
            10003 => Self::UnknownChannel,
            10004 => Self::UnknownGuild,
            10007 => Self::UnknownMember,
            10008 => Self::UnknownMessage,
            10013 => Self::UnknownUser,
            20016 => Self::SlowmodeRateLimit,
            20028 => Self::ChannelWriteRateLimit,
            40005 => Self::RequestEntityTooLarge,
            50001 => Self::MissingAccess,
            50006 => Self::CannotSendEmptyMessage,
            50013 => Self::MissingPermissions,
            50035 => Self::InvalidFormBody,
            160004 => Self::ThreadAlreadyCreated,
            50083 | 160005 => Self::ThreadLocked,
            130000 => Self::ApiOverloaded,
            _ => Self::Unknown,
        }
    }

    /// The high-level category for this code.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownChannel
            | Self::UnknownGuild
            | Self::UnknownMember
            | Self::UnknownMessage
            | Self::UnknownUser => ErrorCategory::NotFound,

            Self::MissingAccess | Self::MissingPermissions => ErrorCategory::PermissionDenied,

            Self::RateLimited | Self::SlowmodeRateLimit | Self::ChannelWriteRateLimit => {
                ErrorCategory::RateLimit
            }

            Self::RequestEntityTooLarge => ErrorCategory::PayloadTooLarge,

            Self::CannotSendEmptyMessage
            | Self::InvalidFormBody
            | Self::ThreadAlreadyCreated
            | Self::ThreadLocked => ErrorCategory::InvalidInput,

            Self::ApiOverloaded | Self::Unknown => ErrorCategory::Unknown,
        }
    }
}

/// Failure of a single remote call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("HTTP {status} (code {code}): {message}")]
    Http {
        status: u16,
        code: u32,
        message: String,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl PlatformError {
    /// Build from an unsuccessful Discord HTTP response.
    ///
    /// The JSON error code wins over the HTTP status when it is known;
    /// `raw_code` is 0 when the response carried none.
    pub fn from_discord(status: u16, raw_code: u32, message: impl Into<String>) -> Self {
        let message = message.into();
        let category = match DiscordErrorCode::from_raw(raw_code).category() {
            ErrorCategory::Unknown => match status {
                403 => ErrorCategory::PermissionDenied,
                404 => ErrorCategory::NotFound,
                429 => ErrorCategory::RateLimit,
                _ => ErrorCategory::Unknown,
            },
            other => other,
        };

        match category {
            ErrorCategory::NotFound => Self::NotFound(message),
            ErrorCategory::PermissionDenied => Self::Forbidden(message),
            ErrorCategory::RateLimit => Self::RateLimited(message),
            _ => Self::Http {
                status,
                code: raw_code,
                message,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}
