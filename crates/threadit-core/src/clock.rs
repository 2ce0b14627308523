//! Clock trait abstraction for mocking time in tests.
//!
//! - `SystemClock`: delegates to real `tokio::time`
//! - `MockClock`: controllable instant, `sleep()` advances it instead of waiting

#[cfg(any(test, feature = "test-support"))]
use std::sync::{Arc, Mutex};
use std::future::Future;

use tokio::time::{Duration, Instant};

/// Abstraction over the system clock.
///
/// `sleep` must only suspend the calling task; other pipelines keep running.
pub trait Clock: Send + Sync + 'static {
    /// Return the current instant.
    fn now(&self) -> Instant;

    /// Suspend the current task for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Live implementation: delegates to real tokio time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Mock clock for unit tests.
/// - `now()` returns a fixed instant that moves only on `advance()` or `sleep()`
/// - `sleep()` returns immediately, advancing the clock and recording the duration
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone)]
pub struct MockClock {
    inner: Arc<Mutex<MockClockInner>>,
}

#[cfg(any(test, feature = "test-support"))]
struct MockClockInner {
    current: Instant,
    sleeps: Vec<Duration>,
}

#[cfg(any(test, feature = "test-support"))]
impl MockClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockClockInner {
                current: Instant::now(),
                sleeps: Vec::new(),
            })),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.inner.lock().unwrap().current += duration;
    }

    /// Every duration passed to `sleep()`, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner.lock().unwrap().sleeps.clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.inner.lock().unwrap().current
    }

    async fn sleep(&self, duration: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.current += duration;
        inner.sleeps.push(duration);
    }
}
