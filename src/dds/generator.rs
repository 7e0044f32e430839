//! DDS sine generator: phase accumulator + quarter-wave table lookup
//!
//! The accumulator uses `26 + EXTRA_BITS` effective bits and one waveform
//! period is one wrap of those bits. The ten bits starting at
//! `16 + EXTRA_BITS` select the output sample:
//!
//! ```text
//!   bit 9      bit 8       bits 7..0
//!   sign       mirror      table index
//!   (Q3, Q4)   (Q2, Q4)
//! ```
//!
//! The sign bit flips exactly at the 0 and π crossings. Amplitude table
//! changes are held back until it flips, so a new gain never steps the
//! output mid-slope. Frequency changes only bend the slope and apply at once.

use super::sine::SineTable;

/// Upper bound for `EXTRA_BITS`: the sign bit must stay inside a u32.
pub const MAX_EXTRA_BITS: u32 = 6;

/// Base accumulator width without extra accuracy bits.
pub const BASE_PHASE_BITS: u32 = 26;

/// Largest magnitude the lookup will use, keeping samples in 1..=254.
pub const MAX_MAGNITUDE: u8 = 126;

/// Mid-scale output; samples above it are the positive half-wave.
pub const ZERO_LINE: u8 = 128;

/// Output sample for a 10-bit table position.
///
/// `position` bit 9 selects the negative half, bit 8 mirrors the index.
#[inline]
pub fn sample_at(table: &SineTable, position: u16) -> u8 {
    let mut index = (position & 0xFF) as u8;
    if position & 0x100 != 0 {
        // 2nd and 4th quarters walk the table backwards
        index = 255 - index;
    }
    let magnitude = table.get(index).min(MAX_MAGNITUDE);
    if position & 0x200 != 0 {
        (ZERO_LINE - 1) - magnitude
    } else {
        ZERO_LINE + magnitude
    }
}

/// DDS generator state.
///
/// Written by the controller (increment, pending table) under a critical
/// section; advanced only by the tick handler through [`Generator::generate`].
#[derive(Debug, Clone)]
pub struct Generator<const EXTRA_BITS: u32 = { crate::config::PHASE_EXTRA_BITS }> {
    /// Phase accumulator, wraps modulo 2^(26 + EXTRA_BITS)
    phase: u32,
    /// Added to `phase` once per tick
    increment: u32,
    /// Table the next sample is read from
    active: &'static SineTable,
    /// Table to switch to at the next zero crossing
    pending: &'static SineTable,
}

impl<const EXTRA_BITS: u32> Generator<EXTRA_BITS> {
    const VALID: () = assert!(EXTRA_BITS <= MAX_EXTRA_BITS, "at most 6 extra accuracy bits");

    /// Effective accumulator width.
    pub const PHASE_BITS: u32 = BASE_PHASE_BITS + EXTRA_BITS;

    /// Phase value of one full waveform period (as u64: 2^32 at 6 extra bits).
    pub const PERIOD: u64 = 1u64 << Self::PHASE_BITS;

    /// The accumulator bit that toggles at the 0 and π crossings.
    pub const CROSSING_BIT: u32 = 1 << (Self::PHASE_BITS - 1);

    const PHASE_MASK: u32 = u32::MAX >> (32 - Self::PHASE_BITS);

    /// New generator at phase 0, increment 0, with `table` active and pending.
    pub const fn new(table: &'static SineTable) -> Self {
        let () = Self::VALID;
        Self {
            phase: 0,
            increment: 0,
            active: table,
            pending: table,
        }
    }

    /// Restart at phase 0. Table selection is left alone.
    #[inline]
    pub fn init(&mut self) {
        self.phase = 0;
    }

    /// Takes effect on the next tick's advance.
    #[inline]
    pub fn set_phase_increment(&mut self, increment: u32) {
        self.increment = increment;
    }

    /// Request an amplitude table.
    ///
    /// At the restart point (phase 0) the table applies at once; otherwise
    /// it becomes active at the next zero crossing.
    #[inline]
    pub fn set_sine_table(&mut self, table: &'static SineTable) {
        self.pending = table;
        if self.phase & Self::PHASE_MASK == 0 {
            self.active = table;
        }
    }

    /// Produce the sample for the current phase, then advance.
    ///
    /// The returned value is computed *before* the advance; the advance and
    /// any deferred table swap prepare the next call.
    #[inline]
    pub fn generate(&mut self) -> u8 {
        let half = self.phase & Self::CROSSING_BIT;
        let sample = sample_at(self.active, Self::position(self.phase));

        self.phase = self.phase.wrapping_add(self.increment);
        if self.phase & Self::CROSSING_BIT != half {
            self.active = self.pending;
        }

        sample
    }

    /// 10-bit table position (sign, mirror, index) of a phase value.
    #[inline]
    pub const fn position(phase: u32) -> u16 {
        ((phase >> (Self::PHASE_BITS - 10)) & 0x3FF) as u16
    }

    #[inline]
    pub fn phase(&self) -> u32 {
        self.phase & Self::PHASE_MASK
    }

    #[inline]
    pub fn phase_increment(&self) -> u32 {
        self.increment
    }

    #[inline]
    pub fn active_table(&self) -> &'static SineTable {
        self.active
    }

    #[inline]
    pub fn pending_table(&self) -> &'static SineTable {
        self.pending
    }

    /// True while a requested table is waiting for a zero crossing.
    #[inline]
    pub fn swap_pending(&self) -> bool {
        !core::ptr::eq(self.active, self.pending)
    }
}
