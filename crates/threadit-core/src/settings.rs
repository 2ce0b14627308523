//! Relay tuning knobs. The defaults are the production values.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Duration;

/// Auto-archive durations Discord accepts, in minutes.
pub const AUTO_ARCHIVE_CHOICES: [u16; 4] = [60, 1440, 4320, 10080];

/// Discord's hard limit on thread names.
pub const DISCORD_THREAD_NAME_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelaySettings {
    /// Minutes of inactivity before a created thread is archived
    pub auto_archive_minutes: u16,
    /// Upper bound on derived thread names, in characters
    pub max_thread_name_length: usize,
    /// Seconds the redirect notice stays visible
    pub notice_delete_after_secs: u64,
    /// Colour of the attribution card
    pub accent_color: u32,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            auto_archive_minutes: 1440,
            max_thread_name_length: DISCORD_THREAD_NAME_LIMIT,
            notice_delete_after_secs: 8,
            accent_color: 0x5865F2,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("auto_archive_minutes must be one of 60, 1440, 4320 or 10080 (got {0})")]
    AutoArchive(u16),

    #[error("max_thread_name_length must be between 4 and 100 (got {0})")]
    ThreadNameLength(usize),

    #[error("accent_color must be a 24-bit RGB value (got {0:#x})")]
    AccentColor(u32),
}

impl RelaySettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !AUTO_ARCHIVE_CHOICES.contains(&self.auto_archive_minutes) {
            return Err(SettingsError::AutoArchive(self.auto_archive_minutes));
        }
        // room for at least one character plus the ellipsis
        if !(4..=DISCORD_THREAD_NAME_LIMIT).contains(&self.max_thread_name_length) {
            return Err(SettingsError::ThreadNameLength(self.max_thread_name_length));
        }
        if self.accent_color > 0xFF_FFFF {
            return Err(SettingsError::AccentColor(self.accent_color));
        }
        Ok(())
    }

    pub fn notice_delay(&self) -> Duration {
        Duration::from_secs(self.notice_delete_after_secs)
    }
}
