//! Shared types for the Thread It reply relay

pub mod errors;
pub mod permissions;
pub mod types;

pub use errors::{DiscordErrorCode, ErrorCategory, PlatformError};
pub use permissions::{Capability, PermissionSet, REQUIRED_CAPABILITIES};
pub use types::*;
