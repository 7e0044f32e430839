//! State shared between the control loop and the tick task.
//!
//! ```text
//! Control loop             SharedDrive                 Tick task
//! ────────────             ───────────                 ─────────
//! commit() ──CS──▶  [increment, table, enabled]  ──CS──▶ next_sample()
//! arm_*()  ──CS──▶  [debounce, boost countdowns] ◀────── age_timers()
//! take_boost_finished() ◀── [boost_finished flag] ◀───── age_timers()
//! ```
//!
//! CS = `critical_section::with`. Every multi-field write from the control
//! loop happens inside one critical section, so the tick task never sees a
//! half-applied rate change.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;

use crate::config::DriveConfig;
use crate::dds::{Generator, SineTable};
use crate::rate::RateProfile;
use crate::timers::{Countdown, StartupRamp};

/// One atomic update of the generator triple.
#[derive(Clone, Copy, Debug)]
pub enum DriveCommand {
    /// Enable output at `profile`, using `boost_table` while the boost
    /// countdown runs.
    Run {
        profile: RateProfile,
        boost_table: &'static SineTable,
    },
    /// Disable output and rewind the generator to phase 0.
    Stop,
}

/// Fields guarded by the critical section.
#[derive(Debug)]
struct DriveState {
    generator: Generator,
    output_enabled: bool,
    ramp: StartupRamp,
}

/// The one object both execution contexts hold a reference to.
pub struct SharedDrive {
    state: Mutex<RefCell<DriveState>>,
    debounce: Countdown,
    boost: Countdown,
    boost_finished: AtomicBool,
    elapsed: AtomicU32,
}

impl SharedDrive {
    /// Boot state: phase 0, output disabled, idle level at the ramp start.
    ///
    /// `initial_table` is active until the first commit replaces it.
    pub const fn new(config: DriveConfig, initial_table: &'static SineTable) -> Self {
        Self {
            state: Mutex::new(RefCell::new(DriveState {
                generator: Generator::new(initial_table),
                output_enabled: false,
                ramp: StartupRamp::new(config.ramp_step_ticks, config.ramp_target),
            })),
            debounce: Countdown::new(),
            boost: Countdown::new(),
            boost_finished: AtomicBool::new(false),
            elapsed: AtomicU32::new(0),
        }
    }

    // --- Control loop side ---

    /// Apply increment, table and enable flag as one unit.
    ///
    /// The table choice (boost or normal) is made inside the same critical
    /// section as the boost countdown read.
    pub fn commit(&self, command: DriveCommand) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            match command {
                DriveCommand::Run { profile, boost_table } => {
                    let table = if self.boost.is_expired() {
                        profile.table
                    } else {
                        boost_table
                    };
                    state.output_enabled = true;
                    state.generator.set_phase_increment(profile.increment);
                    state.generator.set_sine_table(table);
                }
                DriveCommand::Stop => {
                    state.output_enabled = false;
                    state.generator.init();
                }
            }
        });
    }

    /// Restart the debounce window.
    pub fn arm_debounce(&self, ticks: u16) {
        critical_section::with(|cs| self.debounce.arm(cs, ticks));
    }

    /// Start (or cancel, with 0) the boost window.
    pub fn arm_boost(&self, ticks: u16) {
        critical_section::with(|cs| {
            self.boost.arm(cs, ticks);
            self.boost_finished.store(false, Ordering::Release);
        });
    }

    #[inline]
    pub fn debounce_expired(&self) -> bool {
        self.debounce.is_expired()
    }

    #[inline]
    pub fn boost_active(&self) -> bool {
        !self.boost.is_expired()
    }

    /// Consume the "boost just ended" flag.
    #[inline]
    pub fn take_boost_finished(&self) -> bool {
        self.boost_finished.swap(false, Ordering::AcqRel)
    }

    /// Remaining debounce and boost ticks.
    pub fn countdowns(&self) -> (u16, u16) {
        (self.debounce.remaining(), self.boost.remaining())
    }

    pub fn ramp_complete(&self) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).ramp.is_complete())
    }

    /// Level written to the PWM while output is disabled.
    pub fn baseline(&self) -> u8 {
        critical_section::with(|cs| self.state.borrow_ref(cs).ramp.level())
    }

    pub fn output_enabled(&self) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).output_enabled)
    }

    /// Ticks since boot (wraps after ~38 h at 31.25 kHz).
    #[inline]
    pub fn elapsed_ticks(&self) -> u32 {
        self.elapsed.load(Ordering::Relaxed)
    }

    /// Read-only look at the generator.
    pub fn inspect<R>(&self, f: impl FnOnce(&Generator) -> R) -> R {
        critical_section::with(|cs| f(&self.state.borrow_ref(cs).generator))
    }

    // --- Tick side ---

    /// Sample for this tick: generator output, or the idle level.
    #[inline]
    pub(crate) fn next_sample(&self) -> u8 {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if state.output_enabled {
                state.generator.generate()
            } else {
                state.ramp.level()
            }
        })
    }

    /// Age the countdowns by one tick.
    #[inline]
    pub(crate) fn age_timers(&self) {
        self.elapsed.fetch_add(1, Ordering::Relaxed);
        self.debounce.tick();
        if self.boost.tick() {
            self.boost_finished.store(true, Ordering::Release);
        }
    }

    /// Advance the startup ramp. Returns `true` once it is complete.
    #[inline]
    pub(crate) fn advance_ramp(&self) -> bool {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.ramp.tick();
            state.ramp.is_complete()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dds::{SINE_FAST, SINE_NORMAL, SINE_SLOW};
    use crate::rate::RATE_TABLE;

    fn run(profile: RateProfile) -> DriveCommand {
        DriveCommand::Run {
            profile,
            boost_table: &SINE_FAST,
        }
    }

    #[test]
    fn test_boot_state() {
        let drive = SharedDrive::new(DriveConfig::immediate(), &SINE_NORMAL);
        assert!(!drive.output_enabled());
        assert!(drive.ramp_complete());
        assert_eq!(drive.baseline(), 128);
        assert_eq!(drive.next_sample(), 128);
        assert_eq!(drive.inspect(|g| g.phase()), 0);
    }

    #[test]
    fn test_commit_run_sets_triple() {
        let drive = SharedDrive::new(DriveConfig::immediate(), &SINE_NORMAL);
        drive.commit(run(RATE_TABLE.slow));

        assert!(drive.output_enabled());
        drive.inspect(|g| {
            assert_eq!(g.phase_increment(), RATE_TABLE.slow.increment);
            assert!(core::ptr::eq(g.active_table(), &SINE_SLOW));
        });
    }

    #[test]
    fn test_commit_uses_boost_table_while_boosting() {
        let drive = SharedDrive::new(DriveConfig::immediate(), &SINE_NORMAL);
        drive.arm_boost(10);
        drive.commit(run(RATE_TABLE.sidereal));
        drive.inspect(|g| assert!(core::ptr::eq(g.active_table(), &SINE_FAST)));
    }

    #[test]
    fn test_commit_stop_rewinds() {
        let drive = SharedDrive::new(DriveConfig::immediate(), &SINE_NORMAL);
        drive.commit(run(RATE_TABLE.sidereal));
        for _ in 0..10 {
            drive.next_sample();
        }
        assert_ne!(drive.inspect(|g| g.phase()), 0);

        drive.commit(DriveCommand::Stop);
        assert!(!drive.output_enabled());
        assert_eq!(drive.inspect(|g| g.phase()), 0);
    }

    #[test]
    fn test_boost_finished_flag() {
        let drive = SharedDrive::new(DriveConfig::immediate(), &SINE_NORMAL);
        drive.arm_boost(2);
        drive.age_timers();
        assert!(!drive.take_boost_finished());
        drive.age_timers();
        assert!(drive.take_boost_finished());
        // Consumed
        assert!(!drive.take_boost_finished());
        assert!(!drive.boost_active());
    }

    #[test]
    fn test_ramp_baseline() {
        let config = DriveConfig {
            ramp_step_ticks: 2,
            ramp_target: 3,
            ..DriveConfig::immediate()
        };
        let drive = SharedDrive::new(config, &SINE_NORMAL);
        assert_eq!(drive.next_sample(), 0);
        assert!(!drive.ramp_complete());

        for _ in 0..6 {
            drive.advance_ramp();
        }
        assert!(drive.ramp_complete());
        assert_eq!(drive.next_sample(), 3);
    }
}
