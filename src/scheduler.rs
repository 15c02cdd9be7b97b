//! Elapsed-time periodic tasks.
//!
//! Every recurring job in the main loop (blink, sensor sampling) is gated
//! by a [`PeriodicTask`]: "has at least `interval_ms` elapsed since the
//! last fire?"  Nothing sleeps; the loop polls each task once per tick.
//!
//! ```text
//!   clock (u32 ms, wraps ~49.7 days)
//!        │
//!        ▼
//!   now.wrapping_sub(last_fire) >= interval ──yes──▶ effect, last_fire = now
//!                                           └─no───▶ skip this tick
//! ```
//!
//! ## Wraparound
//!
//! The millisecond counter is a `u32` that rolls over to zero.  Elapsed
//! time is always `now.wrapping_sub(last_fire_ms)`: modular subtraction
//! yields the true small delta across the rollover.  Do not replace this
//! with signed arithmetic or `checked_sub`.
//!
//! ## Rearm policy
//!
//! On fire, `last_fire_ms` becomes `now`, not `last_fire_ms + interval`.
//! A late tick delays the next fire by the same amount (jitter
//! accumulates) but a long stall never produces a burst of catch-up fires.

/// A recurring action gated by an elapsed-time threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTask {
    interval_ms: u32,
    last_fire_ms: u32,
}

impl PeriodicTask {
    /// A task that first fires once `interval_ms` has elapsed after boot.
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_fire_ms: 0,
        }
    }

    /// A task armed at an arbitrary timestamp (used for tests and for
    /// tasks that start after boot).
    pub const fn armed_at(interval_ms: u32, last_fire_ms: u32) -> Self {
        Self {
            interval_ms,
            last_fire_ms,
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn last_fire_ms(&self) -> u32 {
        self.last_fire_ms
    }

    /// Milliseconds since the last fire, wraparound-safe.
    pub fn elapsed_ms(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.last_fire_ms)
    }

    /// Pure predicate: has the interval elapsed?  No side effects.
    pub fn should_fire(&self, now_ms: u32) -> bool {
        self.elapsed_ms(now_ms) >= self.interval_ms
    }

    /// Restart the interval from `now_ms`.
    pub fn rearm(&mut self, now_ms: u32) {
        self.last_fire_ms = now_ms;
    }

    /// Check and rearm in one step.  Returns `true` at most once per
    /// interval; the caller performs the effect when it does.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if self.should_fire(now_ms) {
            self.rearm(now_ms);
            true
        } else {
            false
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
