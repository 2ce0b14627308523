//! Operation metric log lines and in-memory relay counters.
//!
//! Counters live only for the lifetime of the process.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::time::Duration;
use tracing::{info, warn};

/// Format the `METRICS:` line for an operation.
pub fn metric_line(
    operation: &str,
    success: bool,
    duration: Option<Duration>,
    error: Option<&str>,
) -> String {
    let mut line = format!(
        "METRICS: {} {}",
        operation,
        if success { "SUCCESS" } else { "FAILED" }
    );
    if let Some(duration) = duration {
        line.push_str(&format!(" ({:.2}s)", duration.as_secs_f64()));
    }
    if let Some(error) = error {
        line.push_str(&format!(" - {}", error));
    }
    line
}

/// Emit the metric line: info on success, warn on failure.
pub fn log_operation_metrics(
    operation: &str,
    success: bool,
    duration: Option<Duration>,
    error: Option<&str>,
) {
    let line = metric_line(operation, success, duration, error);
    if success {
        info!("{}", line);
    } else {
        warn!("{}", line);
    }
}

/// Outcome counters shared between the relay and the health endpoint
#[derive(Debug, Default)]
pub struct RelayStats {
    relocated: AtomicU64,
    aborted: AtomicU64,
    failed: AtomicU64,
    notices_suppressed: AtomicU64,
    ignored: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub relocated: u64,
    pub aborted: u64,
    pub failed: u64,
    pub notices_suppressed: u64,
    pub ignored: u64,
}

impl RelayStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_relocated(&self) {
        self.relocated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_aborted(&self) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
    }

    /// A run that panicked.
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notice_suppressed(&self) {
        self.notices_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            relocated: self.relocated.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            notices_suppressed: self.notices_suppressed.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
        }
    }
}
