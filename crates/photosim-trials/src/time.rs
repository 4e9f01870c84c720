//! Wall-clock sources for event timestamps.
//!
//! Event timestamps are integer milliseconds. Production code reads the
//! system clock; tests and scripted sessions drive a [`ManualTimeSource`]
//! so that active durations are deterministic.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Something that can tell the current time in milliseconds.
pub trait TimeSource: Send + Sync + core::fmt::Debug {
    /// Current wall-clock time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// The real system clock, via `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A settable clock. Clones share the same underlying time.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    millis: Arc<AtomicI64>,
}

impl ManualTimeSource {
    /// Create a clock reading `start_ms`.
    pub fn new(start_ms: i64) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    /// Jump to an absolute time. Going backwards is allowed.
    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::Release);
    }

    /// Move the clock forward by `delta_ms` (saturating).
    pub fn advance(&self, delta_ms: i64) {
        let current = self.millis.load(Ordering::Acquire);
        self.millis
            .store(current.saturating_add(delta_ms), Ordering::Release);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> i64 {
        self.millis.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = ManualTimeSource::new(1_000);
        let handle = clock.clone();
        handle.advance(250);
        assert_eq!(clock.now_ms(), 1_250);
        clock.set(10);
        assert_eq!(handle.now_ms(), 10);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemTimeSource.now_ms() > 1_577_836_800_000);
    }
}
