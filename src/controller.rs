//! Rate controller: switch debounce and boost sequencing.
//!
//! Runs in the cooperative control loop. Reads the switch, decides the rate,
//! and pushes (increment, table, enabled) into [`SharedDrive`] as one unit.
//! Pure logic over the capability traits, fully testable on host.
//!
//! # Sequencing
//!
//! - The rotary position must hold for the debounce window before it is
//!   committed. Any change inside the window restarts it.
//! - Leaving Off starts the boost window: the max-amplitude table is driven
//!   until the boost countdown ends, then the rate's own table takes over
//!   at the next zero crossing.
//! - Guide lines (fast/slow) apply on the next poll, without debounce, and
//!   only while a tracking rate is active.
//! - Nothing happens until the startup ramp has finished.

use crate::config::DriveConfig;
use crate::drive::{DriveCommand, SharedDrive};
use crate::logging::LogRing;
use crate::port::SwitchInput;
use crate::rate::{Rate, RateTable, RATE_TABLE};
use crate::switch::{SwitchMap, DEFAULT_SWITCH_MAP};
use crate::{rt_debug, rt_info};

/// Observable controller state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    /// Startup ramp still running; the switch is not read.
    Starting,
    /// Output off.
    Disabled,
    /// A new rotary position is waiting out the debounce window.
    Debouncing(Rate),
    /// Driving a tracking rate (possibly overridden by a guide line).
    Active(Rate),
}

/// Rate selection state machine.
///
/// # Example
///
/// ```
/// use sidereal_drive::config::DriveConfig;
/// use sidereal_drive::controller::RateController;
/// use sidereal_drive::dds::SINE_NORMAL;
/// use sidereal_drive::drive::SharedDrive;
/// use sidereal_drive::logging::LogRing;
/// use sidereal_drive::rate::Rate;
///
/// let drive = SharedDrive::new(DriveConfig::immediate(), &SINE_NORMAL);
/// let log: LogRing = LogRing::new();
///
/// // Rotary switch on "sidereal", no guide lines
/// let mut controller = RateController::new(&drive, || 0b0100, &log, DriveConfig::immediate());
/// controller.poll();
///
/// assert_eq!(controller.active_rate(), Rate::Sidereal);
/// assert!(drive.output_enabled());
/// ```
pub struct RateController<'a, I: SwitchInput> {
    drive: &'a SharedDrive,
    input: I,
    log: &'a LogRing,
    config: DriveConfig,
    map: SwitchMap,
    rates: &'a RateTable,

    /// Raw pattern seen by the last processed poll
    last_raw: Option<u8>,
    /// Rotary position waiting out the debounce window
    candidate: Rate,
    /// Committed rotary position
    active: Rate,
    /// Rate the generator is currently driven at
    driven: Rate,
}

impl<'a, I: SwitchInput> RateController<'a, I> {
    pub fn new(drive: &'a SharedDrive, input: I, log: &'a LogRing, config: DriveConfig) -> Self {
        Self {
            drive,
            input,
            log,
            config,
            map: DEFAULT_SWITCH_MAP,
            rates: &RATE_TABLE,
            last_raw: None,
            candidate: Rate::Off,
            active: Rate::Off,
            driven: Rate::Off,
        }
    }

    /// Use a different switch wiring.
    pub fn with_switch_map(mut self, map: SwitchMap) -> Self {
        self.map = map;
        self
    }

    /// Use a different rate table.
    pub fn with_rate_table(mut self, rates: &'a RateTable) -> Self {
        self.rates = rates;
        self
    }

    /// One control-loop iteration.
    ///
    /// Recomputes the drive only when the raw pattern changed, a pending
    /// position has settled, or the boost window just ended.
    pub fn poll(&mut self) {
        if !self.drive.ramp_complete() {
            return;
        }

        let raw = self.input.read();
        let boost_finished = self.drive.take_boost_finished();
        let settled = self.candidate != self.active && self.drive.debounce_expired();

        if self.last_raw == Some(raw) && !settled && !boost_finished {
            return;
        }
        self.last_raw = Some(raw);

        let reading = self.map.decode(raw);
        let now = self.drive.elapsed_ticks();

        if reading.position != self.candidate {
            self.candidate = reading.position;
            self.drive.arm_debounce(self.config.debounce_ticks);
            rt_debug!(self.log, now, "switch {}, settling", self.candidate.as_str());
        }

        if self.candidate != self.active && self.drive.debounce_expired() {
            if self.active.is_off() && self.config.boost_enabled() {
                self.drive.arm_boost(self.config.boost_ticks);
                rt_info!(self.log, now, "boost for {} ticks", self.config.boost_ticks);
            }
            rt_info!(
                self.log,
                now,
                "rate {} -> {}",
                self.active.as_str(),
                self.candidate.as_str()
            );
            self.active = self.candidate;
        }

        if boost_finished {
            rt_info!(self.log, now, "boost finished");
        }

        let target = match reading.guide {
            Some(guide) if !self.active.is_off() => guide,
            _ => self.active,
        };
        if target != self.driven && target != self.active {
            rt_debug!(self.log, now, "guide {}", target.as_str());
        }
        self.apply(target);
    }

    /// Commit `rate` to the generator.
    fn apply(&mut self, rate: Rate) {
        let command = match self.rates.profile(rate) {
            Some(profile) => DriveCommand::Run {
                profile: *profile,
                boost_table: self.rates.boost,
            },
            None => DriveCommand::Stop,
        };
        self.drive.commit(command);
        self.driven = rate;
    }

    /// Committed rotary rate.
    #[inline]
    pub fn active_rate(&self) -> Rate {
        self.active
    }

    /// Rotary rate waiting out the debounce window (equals the active rate
    /// when nothing is pending).
    #[inline]
    pub fn candidate_rate(&self) -> Rate {
        self.candidate
    }

    /// Rate the generator is driven at, guide overrides included.
    #[inline]
    pub fn driven_rate(&self) -> Rate {
        self.driven
    }

    #[inline]
    pub fn is_boosting(&self) -> bool {
        self.drive.boost_active()
    }

    pub fn state(&self) -> ControllerState {
        if !self.drive.ramp_complete() {
            ControllerState::Starting
        } else if self.candidate != self.active {
            ControllerState::Debouncing(self.candidate)
        } else if self.active.is_off() {
            ControllerState::Disabled
        } else {
            ControllerState::Active(self.driven)
        }
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dds::{SINE_FAST, SINE_NORMAL};
    use core::cell::Cell;

    const SIDEREAL: u8 = 0b0100;
    const SOLAR: u8 = 0b1100;

    fn config() -> DriveConfig {
        DriveConfig {
            debounce_ticks: 10,
            boost_ticks: 0,
            ..DriveConfig::immediate()
        }
    }

    #[test]
    fn test_starts_disabled() {
        let drive = SharedDrive::new(config(), &SINE_NORMAL);
        let log = LogRing::new();
        let mut controller = RateController::new(&drive, || 0, &log, config());
        controller.poll();

        assert_eq!(controller.state(), ControllerState::Disabled);
        assert!(!drive.output_enabled());
    }

    #[test]
    fn test_commit_waits_for_debounce() {
        let drive = SharedDrive::new(config(), &SINE_NORMAL);
        let log = LogRing::new();
        let raw = Cell::new(SIDEREAL);
        let mut controller = RateController::new(&drive, || raw.get(), &log, config());

        controller.poll();
        assert_eq!(controller.state(), ControllerState::Debouncing(Rate::Sidereal));
        assert_eq!(controller.active_rate(), Rate::Off);

        for _ in 0..9 {
            drive.age_timers();
            controller.poll();
        }
        assert_eq!(controller.active_rate(), Rate::Off);

        drive.age_timers();
        controller.poll();
        assert_eq!(controller.active_rate(), Rate::Sidereal);
        assert!(drive.output_enabled());
    }

    #[test]
    fn test_guide_overrides_only_while_tracking() {
        let drive = SharedDrive::new(DriveConfig::immediate(), &SINE_NORMAL);
        let log = LogRing::new();
        let raw = Cell::new(0b0010);
        let mut controller =
            RateController::new(&drive, || raw.get(), &log, DriveConfig::immediate());

        // Fast guide line with the knob on Off: nothing
        controller.poll();
        assert_eq!(controller.driven_rate(), Rate::Off);
        assert!(!drive.output_enabled());

        raw.set(SOLAR | 0b0010);
        controller.poll();
        assert_eq!(controller.active_rate(), Rate::Solar);
        assert_eq!(controller.driven_rate(), Rate::Fast);
        assert_eq!(
            drive.inspect(|g| g.phase_increment()),
            RATE_TABLE.fast.increment
        );

        raw.set(SOLAR);
        controller.poll();
        assert_eq!(controller.driven_rate(), Rate::Solar);
        assert_eq!(
            drive.inspect(|g| g.phase_increment()),
            RATE_TABLE.solar.increment
        );
    }

    #[test]
    fn test_boost_table_at_enable() {
        let config = DriveConfig {
            boost_ticks: 5,
            ..DriveConfig::immediate()
        };
        let drive = SharedDrive::new(config, &SINE_NORMAL);
        let log = LogRing::new();
        let mut controller = RateController::new(&drive, || SIDEREAL, &log, config);

        controller.poll();
        assert!(controller.is_boosting());
        drive.inspect(|g| assert!(core::ptr::eq(g.active_table(), &SINE_FAST)));

        for _ in 0..5 {
            drive.age_timers();
        }
        controller.poll();
        assert!(!controller.is_boosting());
        drive.inspect(|g| assert!(core::ptr::eq(g.pending_table(), &SINE_NORMAL)));
    }

    #[test]
    fn test_unchanged_input_is_skipped() {
        let drive = SharedDrive::new(DriveConfig::immediate(), &SINE_NORMAL);
        let log = LogRing::new();
        let mut controller =
            RateController::new(&drive, || SIDEREAL, &log, DriveConfig::immediate());

        controller.poll();
        while log.drain().is_some() {}

        for _ in 0..100 {
            controller.poll();
        }
        assert_eq!(log.pending(), 0);
    }

    #[test]
    fn test_logs_transition() {
        let drive = SharedDrive::new(DriveConfig::immediate(), &SINE_NORMAL);
        let log = LogRing::new();
        let mut controller =
            RateController::new(&drive, || SOLAR, &log, DriveConfig::immediate());
        controller.poll();

        let mut found = false;
        while let Some(entry) = log.drain() {
            found |= entry.message() == "rate off -> solar";
        }
        assert!(found);
    }
}
