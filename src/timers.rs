//! Tick-driven countdowns shared between the control loop and the tick task.
//!
//! # Rules
//!
//! - Only the control loop re-arms, and only inside a critical section
//!   (`arm` takes the token as proof).
//! - Only the tick handler decrements, one field at a time.
//! - Countdowns saturate at zero and never wrap.

use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::CriticalSection;

/// Saturating tick countdown.
///
/// Stored in an `AtomicU32` so the decrement is a plain CAS on every
/// supported core; values never exceed `u16::MAX`.
#[derive(Debug)]
pub struct Countdown {
    remaining: AtomicU32,
}

impl Countdown {
    pub const fn new() -> Self {
        Self {
            remaining: AtomicU32::new(0),
        }
    }

    /// Restart the countdown at `ticks`. Zero cancels it.
    #[inline]
    pub fn arm(&self, _cs: CriticalSection<'_>, ticks: u16) {
        self.remaining.store(ticks as u32, Ordering::Release);
    }

    /// Decrement by one tick.
    ///
    /// Returns `true` only on the tick that reaches zero.
    #[inline]
    pub fn tick(&self) -> bool {
        match self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(previous) => previous == 1,
            Err(_) => false,
        }
    }

    #[inline]
    pub fn remaining(&self) -> u16 {
        self.remaining.load(Ordering::Acquire) as u16
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.remaining() == 0
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Power-on ramp of the idle output level.
///
/// Raises the level by one every `step_ticks` ticks until it reaches
/// `target`. A motor coil fed a sudden mid-scale DC offset jolts the mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartupRamp {
    step_ticks: u16,
    countdown: u16,
    level: u8,
    target: u8,
}

impl StartupRamp {
    /// Ramp from 0 to `target`. `step_ticks == 0` starts at `target`.
    pub const fn new(step_ticks: u16, target: u8) -> Self {
        Self {
            step_ticks,
            countdown: step_ticks,
            level: if step_ticks == 0 { target } else { 0 },
            target,
        }
    }

    /// Advance one tick.
    #[inline]
    pub fn tick(&mut self) {
        if self.level >= self.target {
            return;
        }
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.level += 1;
            self.countdown = self.step_ticks;
        }
    }

    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.level >= self.target
    }
}
