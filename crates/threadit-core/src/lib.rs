//! Reply relocation pipeline
//!
//! Moves replies posted in a guild channel into a thread on the message
//! they answer. Every remote call goes through [`ChatPlatform`], every
//! wait through [`Clock`], so the whole pipeline runs against
//! [`MockPlatform`] and [`MockClock`] in tests.

pub mod cleanup;
pub mod clock;
pub mod gather;
pub mod metrics;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod naming;
pub mod notice;
pub mod permissions;
pub mod platform;
pub mod relay;
pub mod repost;
pub mod settings;
pub mod thread;
pub mod validator;

pub use cleanup::CleanupReport;
pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use clock::MockClock;
pub use gather::ReplyInfo;
pub use metrics::{RelayStats, StatsSnapshot};
#[cfg(any(test, feature = "test-support"))]
pub use mock::{Call, MockPlatform, Op};
pub use permissions::PermissionCheck;
pub use platform::{BotIdentity, ChatPlatform, OutgoingFile, OutgoingMessage};
pub use relay::{AbortStage, RelayOutcome, ReplyRelay};
pub use settings::{RelaySettings, SettingsError};
pub use validator::{is_eligible, Eligibility, IgnoreReason};
