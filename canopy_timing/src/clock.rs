// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::sync::atomic::{AtomicU64, Ordering};

/// Monotonic millisecond clock.
///
/// Nothing in Canopy reads wall time directly; every timestamp flows through
/// this trait so tests can drive time by hand.
pub trait Clock {
    /// Milliseconds since an unspecified epoch, never decreasing.
    fn now_ms(&self) -> u64;
}

/// Clock that only moves when told to.
///
/// Uses an atomic counter so a shared handle can be advanced from a test
/// while the code under test reads it.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a clock reading `start_ms`.
    #[must_use]
    pub const fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    /// Moves the clock forward by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        self.now.fetch_add(delta_ms, Ordering::Relaxed);
    }

    /// Jumps to `now_ms`. Earlier values are ignored so the clock stays monotonic.
    pub fn set(&self, now_ms: u64) {
        self.now.fetch_max(now_ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}

/// Real monotonic clock, counting from its creation.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: web_time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Starts a clock at `0` now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: web_time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_forward() {
        let clock = ManualClock::new(100);
        clock.advance(20);
        assert_eq!(clock.now_ms(), 120);
        clock.set(50);
        assert_eq!(clock.now_ms(), 120);
        clock.set(500);
        assert_eq!(clock.now_ms(), 500);
    }

    #[cfg(feature = "std")]
    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
