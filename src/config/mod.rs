//! Module: config
//!
//! Purpose: Compile-time configuration for SiderealDrive.
//!
//! There is no runtime-mutable or persisted configuration. Every value here
//! is a constant, and the `const _: () = assert!(..)` items reject a bad
//! combination at build time.
//!
//! Timing model: the PWM carrier runs at `OSC_HZ / PWM_PERIOD`, and the tick
//! handler runs once per carrier period. All durations are expressed in ticks.

/// Clock feeding the PWM counter, in Hz.
pub const OSC_HZ: u32 = 8_000_000;

/// PWM period length in counter steps (8-bit duty resolution).
pub const PWM_PERIOD: u32 = 256;

/// Tick rate = PWM carrier frequency (31 250 Hz with the defaults).
pub const TICK_HZ: u32 = OSC_HZ / PWM_PERIOD;

/// Extra phase accumulator bits beyond the base 26 (0-6).
pub const PHASE_EXTRA_BITS: u32 = 6;

/// Multiplier applied to every drive frequency (gear ratio trim).
pub const SPEED_FACTOR: f64 = 1.0;

/// Drive frequencies in Hz for a 50 Hz synchronous motor.
pub const SLOW_HZ: f64 = SPEED_FACTOR * 37.5;
pub const SIDEREAL_HZ: f64 = SPEED_FACTOR * 50.1369;
pub const LUNAR_HZ: f64 = SPEED_FACTOR * 48.3018;
pub const SOLAR_HZ: f64 = SPEED_FACTOR * 50.0;
pub const FAST_HZ: f64 = SPEED_FACTOR * 62.5;

/// Amplitude of each sine table, in percent of full scale.
pub const SLOW_GAIN_PERCENT: u8 = 60;
pub const NORMAL_GAIN_PERCENT: u8 = 80;
pub const FAST_GAIN_PERCENT: u8 = 100;

/// Rotary switch settle time. Turning the knob briefly opens every contact
/// before it locks into the next detent.
pub const DEBOUNCE_MS: u32 = 100;

/// Max-amplitude drive after leaving Off, to break static friction.
pub const BOOST_MS: u32 = if cfg!(feature = "boost") { 1000 } else { 0 };

/// Power-on ramp of the idle output from 0 to mid-scale.
pub const STARTUP_RAMP_MS: u32 = if cfg!(feature = "startup-ramp") { 4000 } else { 0 };

/// Idle PWM level: the generator's zero line.
pub const MID_SCALE: u8 = 128;

/// Task watchdog timeout. The tick task feeds it every carrier period.
pub const WATCHDOG_TIMEOUT_MS: u32 = 100;

/// Convert milliseconds to ticks, rounding to nearest.
///
/// Fails the build if the result does not fit a u16 countdown.
pub const fn ms_to_ticks(ms: u32) -> u16 {
    let ticks = (TICK_HZ as u64 * ms as u64 + 500) / 1000;
    assert!(ticks <= u16::MAX as u64, "duration does not fit a u16 countdown");
    ticks as u16
}

/// Ticks between two ramp steps so `target` steps span `ms`.
///
/// Returns 0 (ramp disabled) when `ms` is 0.
pub const fn ramp_step_ticks(ms: u32, target: u8) -> u16 {
    if ms == 0 || target == 0 {
        return 0;
    }
    let step = (TICK_HZ as u64 * ms as u64 / 1000) / target as u64;
    assert!(step <= u16::MAX as u64, "ramp step does not fit a u16 countdown");
    if step == 0 {
        1
    } else {
        step as u16
    }
}

/// Timing configuration shared by the controller and the tick scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriveConfig {
    /// Ticks the rotary position must hold before it is committed.
    pub debounce_ticks: u16,
    /// Boost window length in ticks (0 = no boost).
    pub boost_ticks: u16,
    /// Ticks per startup ramp step (0 = no ramp, idle output starts at target).
    pub ramp_step_ticks: u16,
    /// Idle output level the ramp ends at.
    pub ramp_target: u8,
}

impl DriveConfig {
    /// Config with every optional sequence disabled and no debounce.
    pub const fn immediate() -> Self {
        Self {
            debounce_ticks: 0,
            boost_ticks: 0,
            ramp_step_ticks: 0,
            ramp_target: MID_SCALE,
        }
    }

    #[inline]
    pub const fn boost_enabled(&self) -> bool {
        self.boost_ticks > 0
    }

    #[inline]
    pub const fn ramp_enabled(&self) -> bool {
        self.ramp_step_ticks > 0
    }

    /// Total ramp duration in ticks.
    pub const fn ramp_ticks(&self) -> u32 {
        self.ramp_step_ticks as u32 * self.ramp_target as u32
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        CONFIG
    }
}

/// Build configuration.
pub const CONFIG: DriveConfig = DriveConfig {
    debounce_ticks: ms_to_ticks(DEBOUNCE_MS),
    boost_ticks: ms_to_ticks(BOOST_MS),
    ramp_step_ticks: ramp_step_ticks(STARTUP_RAMP_MS, MID_SCALE),
    ramp_target: MID_SCALE,
};

const _: () = assert!(OSC_HZ % PWM_PERIOD == 0, "PWM period must divide the oscillator");
const _: () = assert!(PWM_PERIOD <= 256, "duty values are 8-bit");
const _: () = assert!(PHASE_EXTRA_BITS <= 6, "at most 6 extra accuracy bits");
const _: () = assert!(SPEED_FACTOR > 0.0);
const _: () = assert!(CONFIG.debounce_ticks > 0 || DEBOUNCE_MS == 0);
