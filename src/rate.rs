//! Drive rates and their DDS profiles.
//!
//! A rate maps to a phase increment (frequency) and a sine table
//! (amplitude). Increments are computed at compile time from the configured
//! oscillator, PWM period and target frequency; a frequency the accumulator
//! cannot represent fails the build.

use crate::config::{
    FAST_HZ, LUNAR_HZ, OSC_HZ, PHASE_EXTRA_BITS, PWM_PERIOD, SIDEREAL_HZ, SLOW_HZ, SOLAR_HZ,
};
use crate::dds::generator::BASE_PHASE_BITS;
use crate::dds::sine::{SineTable, SINE_FAST, SINE_NORMAL, SINE_SLOW};

/// Logical drive rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Rate {
    /// Output disabled.
    Off = 0,
    /// Guide rate, slower than sidereal.
    Slow = 1,
    /// Star tracking.
    Sidereal = 2,
    /// Moon tracking.
    Lunar = 3,
    /// Sun tracking.
    Solar = 4,
    /// Guide rate, faster than sidereal.
    Fast = 5,
}

impl Rate {
    pub const ALL: [Rate; 6] = [
        Rate::Off,
        Rate::Slow,
        Rate::Sidereal,
        Rate::Lunar,
        Rate::Solar,
        Rate::Fast,
    ];

    /// Convert from raw u8 value. Unknown values map to `Off`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Rate::Slow,
            2 => Rate::Sidereal,
            3 => Rate::Lunar,
            4 => Rate::Solar,
            5 => Rate::Fast,
            _ => Rate::Off,
        }
    }

    #[inline]
    pub fn is_off(self) -> bool {
        self == Rate::Off
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rate::Off => "off",
            Rate::Slow => "slow",
            Rate::Sidereal => "sidereal",
            Rate::Lunar => "lunar",
            Rate::Solar => "solar",
            Rate::Fast => "fast",
        }
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::Off
    }
}

/// Phase increment for `freq_hz`, rounded to nearest.
///
/// increment = round(freq · pwm_period · 2^(26 + extra_bits) / osc_hz)
pub const fn phase_increment(freq_hz: f64, pwm_period: u32, osc_hz: u32, extra_bits: u32) -> u32 {
    let scale = (1u64 << (BASE_PHASE_BITS + extra_bits)) as f64;
    let exact = freq_hz * pwm_period as f64 * scale;
    ((exact + (osc_hz / 2) as f64) / osc_hz as f64) as u32
}

/// Frequency actually produced by `increment`, in Hz.
pub fn output_frequency(increment: u32, pwm_period: u32, osc_hz: u32, extra_bits: u32) -> f64 {
    let scale = (1u64 << (BASE_PHASE_BITS + extra_bits)) as f64;
    increment as f64 * osc_hz as f64 / (pwm_period as f64 * scale)
}

/// DDS settings for one rate.
#[derive(Clone, Copy, Debug)]
pub struct RateProfile {
    /// Phase increment per tick
    pub increment: u32,
    /// Amplitude once any boost is over
    pub table: &'static SineTable,
}

impl RateProfile {
    /// Profile for `freq_hz` under the build configuration.
    ///
    /// Fails the build if the increment is zero or reaches half a period
    /// (the crossing bit would no longer flip exactly twice per period).
    pub const fn new(freq_hz: f64, table: &'static SineTable) -> Self {
        let increment = phase_increment(freq_hz, PWM_PERIOD, OSC_HZ, PHASE_EXTRA_BITS);
        assert!(increment > 0, "rate frequency too low for the accumulator");
        assert!(
            (increment as u64) < (1u64 << (BASE_PHASE_BITS + PHASE_EXTRA_BITS - 1)),
            "rate frequency above half the tick rate"
        );
        Self { increment, table }
    }

    /// Frequency this profile produces, in Hz.
    pub fn frequency(&self) -> f64 {
        output_frequency(self.increment, PWM_PERIOD, OSC_HZ, PHASE_EXTRA_BITS)
    }
}

/// Static mapping from rate to profile. `Off` has no profile.
#[derive(Clone, Copy, Debug)]
pub struct RateTable {
    pub slow: RateProfile,
    pub sidereal: RateProfile,
    pub lunar: RateProfile,
    pub solar: RateProfile,
    pub fast: RateProfile,
    /// Table driven during the boost window
    pub boost: &'static SineTable,
}

impl RateTable {
    #[inline]
    pub fn profile(&self, rate: Rate) -> Option<&RateProfile> {
        match rate {
            Rate::Off => None,
            Rate::Slow => Some(&self.slow),
            Rate::Sidereal => Some(&self.sidereal),
            Rate::Lunar => Some(&self.lunar),
            Rate::Solar => Some(&self.solar),
            Rate::Fast => Some(&self.fast),
        }
    }
}

/// Build rate table.
pub static RATE_TABLE: RateTable = RateTable {
    slow: RateProfile::new(SLOW_HZ, &SINE_SLOW),
    sidereal: RateProfile::new(SIDEREAL_HZ, &SINE_NORMAL),
    lunar: RateProfile::new(LUNAR_HZ, &SINE_NORMAL),
    solar: RateProfile::new(SOLAR_HZ, &SINE_NORMAL),
    fast: RateProfile::new(FAST_HZ, &SINE_FAST),
    boost: &SINE_FAST,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_u8() {
        for rate in Rate::ALL {
            assert_eq!(Rate::from_u8(rate as u8), rate);
        }
        assert_eq!(Rate::from_u8(200), Rate::Off);
    }

    #[test]
    fn test_sidereal_increment() {
        // 50.1369 · 256 · 2^32 / 8e6 = 6 890 763.07
        assert_eq!(phase_increment(50.1369, 256, 8_000_000, 6), 6_890_763);
        assert_eq!(RATE_TABLE.sidereal.increment, 6_890_763);
    }

    #[test]
    fn test_increment_scales_with_extra_bits() {
        let coarse = phase_increment(50.0, 256, 8_000_000, 0);
        let fine = phase_increment(50.0, 256, 8_000_000, 6);
        assert!((fine as i64 - coarse as i64 * 64).abs() <= 64);
    }

    #[test]
    fn test_profile_frequency_accuracy() {
        for (rate, hz) in [
            (Rate::Slow, SLOW_HZ),
            (Rate::Sidereal, SIDEREAL_HZ),
            (Rate::Lunar, LUNAR_HZ),
            (Rate::Solar, SOLAR_HZ),
            (Rate::Fast, FAST_HZ),
        ] {
            let profile = RATE_TABLE.profile(rate).unwrap();
            // One increment LSB is ~7.3 µHz at 6 extra bits
            assert!((profile.frequency() - hz).abs() < 1e-5, "{:?}", rate);
        }
    }

    #[test]
    fn test_off_has_no_profile() {
        assert!(RATE_TABLE.profile(Rate::Off).is_none());
    }

    #[test]
    fn test_profile_tables() {
        assert!(core::ptr::eq(RATE_TABLE.slow.table, &SINE_SLOW));
        assert!(core::ptr::eq(RATE_TABLE.sidereal.table, &SINE_NORMAL));
        assert!(core::ptr::eq(RATE_TABLE.fast.table, &SINE_FAST));
        assert!(core::ptr::eq(RATE_TABLE.boost, &SINE_FAST));
    }
}
