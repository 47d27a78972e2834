//! Time sources for freshness checks.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

// == Clock ==
/// Supplies the current time as Unix epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

// == System Clock ==
/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // Clamp pre-epoch clocks to zero
        Utc::now().timestamp_millis().max(0) as u64
    }
}

// == Manual Clock ==
/// A clock that only moves when told to. Useful for deterministic scenarios.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    /// Jumps to an absolute time.
    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    /// Moves the clock forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }

    #[test]
    fn test_manual_clock_set_and_advance() {
        let clock = ManualClock::new(0);
        assert_eq!(clock.now_ms(), 0);

        clock.advance(120_000);
        assert_eq!(clock.now_ms(), 120_000);

        clock.set(5);
        assert_eq!(clock.now_ms(), 5);
    }
}
