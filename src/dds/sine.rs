//! Quarter-wave sine tables for the DDS generator
//!
//! 256 entries covering the first quarter of one period. Entry `i` is
//! sampled at the *midpoint* of its sub-interval, `(i + 0.5) · π/512`, not
//! at the edge. Mirroring the index gives the 2nd quarter and flipping around
//! mid-scale gives the 3rd and 4th, so the four quarters join without
//! repeated or missing samples and cover the full 8-bit range:
//!
//! ```text
//!    1   2   3   4
//!   --- --- --- ---
//!   0 1 1 0 0 1 1 0        table index (two samples per quarter)
//!     * *
//!   *_____*________        128 line
//!           *     *
//!             * *
//! ```
//!
//! Tables are generated at compile time and pre-scaled by a gain.

use crate::config::{FAST_GAIN_PERCENT, NORMAL_GAIN_PERCENT, SLOW_GAIN_PERCENT};

/// Number of entries in one quarter-wave table
pub const TABLE_SIZE: usize = 256;

/// Peak magnitude of a full-gain table before truncation
pub const PEAK: f64 = 127.5;

/// One quarter of a sine period, magnitudes 0-127.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SineTable([u8; TABLE_SIZE]);

impl SineTable {
    /// Build a table scaled to `gain_percent` of full scale.
    ///
    /// `value[i] = trunc(gain · 127.5 · sin((i + 0.5) · π / 512))`
    pub const fn with_gain(gain_percent: u8) -> Self {
        assert!(gain_percent <= 100, "gain above full scale would clip");

        let gain = gain_percent as f64 / 100.0;
        let mut samples = [0u8; TABLE_SIZE];
        let mut i = 0;
        while i < TABLE_SIZE {
            let angle = (i as f64 + 0.5) * core::f64::consts::FRAC_PI_2 / TABLE_SIZE as f64;
            samples[i] = (gain * PEAK * quarter_sin(angle)) as u8;
            i += 1;
        }
        Self(samples)
    }

    /// Wrap raw magnitudes (e.g. a measured or hand-tuned profile).
    pub const fn from_samples(samples: [u8; TABLE_SIZE]) -> Self {
        Self(samples)
    }

    /// Magnitude at `index`.
    #[inline]
    pub fn get(&self, index: u8) -> u8 {
        self.0[index as usize]
    }

    /// Largest magnitude in the table.
    pub fn peak(&self) -> u8 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    pub fn samples(&self) -> &[u8; TABLE_SIZE] {
        &self.0
    }
}

/// sin(x) for x in [0, π/2], Taylor series usable in const context.
///
/// Truncated after the x¹¹ term: error below 1e-7 over the quarter, far
/// under one LSB at 127.5 scale.
const fn quarter_sin(x: f64) -> f64 {
    let x2 = x * x;
    let x3 = x2 * x;
    let x5 = x3 * x2;
    let x7 = x5 * x2;
    let x9 = x7 * x2;
    let x11 = x9 * x2;

    x - x3 / 6.0 + x5 / 120.0 - x7 / 5040.0 + x9 / 362_880.0 - x11 / 39_916_800.0
}

/// Reduced amplitude for the slow guide rate.
pub static SINE_SLOW: SineTable = SineTable::with_gain(SLOW_GAIN_PERCENT);

/// Tracking amplitude (sidereal, lunar, solar).
pub static SINE_NORMAL: SineTable = SineTable::with_gain(NORMAL_GAIN_PERCENT);

/// Full amplitude: fast guide rate and the boost window.
pub static SINE_FAST: SineTable = SineTable::with_gain(FAST_GAIN_PERCENT);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_is_half_step_in() {
        // sin(π/1024) · 127.5 ≈ 0.391, truncates to 0 at every gain
        assert_eq!(SINE_SLOW.get(0), 0);
        assert_eq!(SINE_NORMAL.get(0), 0);
        assert_eq!(SINE_FAST.get(0), 0);
        assert_eq!(SINE_FAST.get(1), 1);
    }

    #[test]
    fn test_peaks() {
        // 127.499 · gain, truncated
        assert_eq!(SINE_FAST.get(255), 127);
        assert_eq!(SINE_NORMAL.get(255), 101);
        assert_eq!(SINE_SLOW.get(255), 76);
        assert_eq!(SINE_FAST.peak(), 127);
    }

    #[test]
    fn test_monotonic_quarter() {
        for table in [&SINE_SLOW, &SINE_NORMAL, &SINE_FAST] {
            for pair in table.samples().windows(2) {
                assert!(pair[0] <= pair[1], "quarter wave must rise");
            }
        }
    }

    #[test]
    fn test_known_midpoints() {
        // 127.5 · sin(128.5 · π/512) = 90.432
        assert_eq!(SINE_FAST.get(128), 90);
        // 127.5 · sin(64.5 · π/512) = 49.153
        assert_eq!(SINE_FAST.get(64), 49);
    }

    #[test]
    fn test_tables_are_distinct() {
        assert_ne!(SINE_SLOW, SINE_NORMAL);
        assert_ne!(SINE_NORMAL, SINE_FAST);
    }
}
