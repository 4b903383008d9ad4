/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pure conversions between milliseconds and scheduler ticks.
//!
//! These are free functions so they can be used and tested independently of
//! any backend.

/// How a task suspends at the end of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    /// Give the CPU to other ready tasks of equal priority, no minimum delay.
    Yield,
    /// Sleep for this many ticks (always ≥ 1).
    Ticks(u32),
}

impl Delay {
    /// Suspension policy for a slot with period `period_ms`.
    ///
    /// * `0` → [`Delay::Yield`]: run as fast as the scheduler allows.
    /// * a period shorter than one tick → `Ticks(1)`, never a busy loop.
    /// * otherwise → the truncated tick count.
    pub fn from_period(period_ms: u32, tick_rate_hz: u32) -> Self {
        if period_ms == 0 {
            return Delay::Yield;
        }
        Delay::Ticks(ms_to_ticks(period_ms, tick_rate_hz).max(1))
    }
}

/// `ms` converted to ticks at `tick_rate_hz`, truncating like the RTOS
/// `pdMS_TO_TICKS` macro.  Saturates at `u32::MAX`.
pub fn ms_to_ticks(ms: u32, tick_rate_hz: u32) -> u32 {
    let ticks = u64::from(ms) * u64::from(tick_rate_hz) / 1_000;
    u32::try_from(ticks).unwrap_or(u32::MAX)
}

/// Length of one tick in nanoseconds.  A zero tick rate is treated as 1 Hz.
pub fn tick_period_ns(tick_rate_hz: u32) -> u64 {
    1_000_000_000 / u64::from(tick_rate_hz.max(1))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ms_to_ticks_at_one_khz_is_identity() {
        assert_eq!(ms_to_ticks(1, 1_000), 1);
        assert_eq!(ms_to_ticks(250, 1_000), 250);
    }

    #[test]
    fn ms_to_ticks_truncates() {
        // 100 Hz → 10 ms per tick
        assert_eq!(ms_to_ticks(5, 100), 0);
        assert_eq!(ms_to_ticks(19, 100), 1);
        assert_eq!(ms_to_ticks(20, 100), 2);
    }

    #[test]
    fn ms_to_ticks_saturates() {
        assert_eq!(ms_to_ticks(u32::MAX, 1_000_000), u32::MAX);
    }

    #[test]
    fn zero_period_yields() {
        assert_eq!(Delay::from_period(0, 1_000), Delay::Yield);
        assert_eq!(Delay::from_period(0, 100), Delay::Yield);
    }

    #[test]
    fn sub_tick_period_clamps_to_one_tick() {
        assert_eq!(Delay::from_period(5, 100), Delay::Ticks(1));
        assert_eq!(Delay::from_period(1, 250), Delay::Ticks(1));
    }

    #[test]
    fn regular_period_converts_to_ticks() {
        assert_eq!(Delay::from_period(1, 1_000), Delay::Ticks(1));
        assert_eq!(Delay::from_period(100, 100), Delay::Ticks(10));
    }

    #[test]
    fn tick_period_ns_handles_zero_rate() {
        assert_eq!(tick_period_ns(1_000), 1_000_000);
        assert_eq!(tick_period_ns(0), 1_000_000_000);
    }
}
