// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time abstraction so heartbeat, wait-timeout, and backoff logic can be
//! driven by virtual time in tests instead of real sleeps.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic time for timeout and backoff bookkeeping.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Current monotonic instant.
    fn now(&self) -> Instant;
}

/// Real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Controllable clock for deterministic tests.
///
/// Starts at an arbitrary fixed instant and only advances when [`FakeClock::advance`]
/// is called, so heartbeat-expiry and backoff tests never depend on wall-clock
/// scheduling.
#[derive(Debug, Clone)]
pub struct FakeClock {
    // Offset in milliseconds from the clock's epoch (`Instant::now()` captured
    // once at construction), shared across clones.
    offset_ms: Arc<AtomicU64>,
    epoch: Instant,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            offset_ms: Arc::new(AtomicU64::new(0)),
            epoch: Instant::now(),
        }
    }

    /// Advance the fake clock by `duration`.
    pub fn advance(&self, duration: Duration) {
        self.offset_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.epoch + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
