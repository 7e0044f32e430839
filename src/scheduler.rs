//! Tick scheduler: runs once per PWM carrier period.
//!
//! Pure sequencing over [`SharedDrive`] and the board capabilities. Each
//! tick does a fixed amount of work: no loops, no allocation, no logging,
//! no blocking.

use crate::drive::SharedDrive;
use crate::port::{SampleSink, TickSource, Watchdog};

/// Periodic producer of PWM samples.
///
/// # Example
///
/// ```ignore
/// static DRIVE: SharedDrive = SharedDrive::new(CONFIG, &SINE_NORMAL);
///
/// let mut scheduler = TickScheduler::new(&DRIVE, ledc_sink, task_watchdog);
/// scheduler.run(&mut timer_ticks);
/// ```
pub struct TickScheduler<'a, S: SampleSink, W: Watchdog> {
    drive: &'a SharedDrive,
    sink: S,
    watchdog: W,
    /// Cleared once the startup ramp is done, so later ticks skip it.
    ramp_pending: bool,
}

impl<'a, S: SampleSink, W: Watchdog> TickScheduler<'a, S, W> {
    pub fn new(drive: &'a SharedDrive, sink: S, watchdog: W) -> Self {
        Self {
            drive,
            sink,
            watchdog,
            ramp_pending: true,
        }
    }

    /// One tick, in order:
    ///
    /// 1. Emit a sample (generator output, or the idle level)
    /// 2. Feed the watchdog
    /// 3. Age the debounce countdown
    /// 4. Age the boost countdown, flagging when it ends
    /// 5. Advance the startup ramp
    #[inline]
    pub fn tick(&mut self) {
        let sample = self.drive.next_sample();
        self.sink.write_duty(sample);

        self.watchdog.feed();

        self.drive.age_timers();

        if self.ramp_pending {
            self.ramp_pending = !self.drive.advance_ramp();
        }
    }

    /// Tick on every beat of `source` until it stops.
    ///
    /// Hardware sources never stop.
    pub fn run<T: TickSource>(&mut self, source: &mut T) {
        while source.wait_tick() {
            self.tick();
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriveConfig;
    use crate::dds::{SINE_FAST, SINE_NORMAL};
    use crate::drive::DriveCommand;
    use crate::rate::RATE_TABLE;

    #[derive(Default)]
    struct Record(Vec<u8>);

    impl SampleSink for Record {
        fn write_duty(&mut self, duty: u8) {
            self.0.push(duty);
        }
    }

    #[derive(Default)]
    struct Beats(u32);

    impl Watchdog for Beats {
        fn feed(&mut self) {
            self.0 += 1;
        }
    }

    struct Budget(u32);

    impl TickSource for Budget {
        fn wait_tick(&mut self) -> bool {
            if self.0 == 0 {
                return false;
            }
            self.0 -= 1;
            true
        }
    }

    #[test]
    fn test_idle_ticks_emit_baseline_and_feed() {
        let drive = SharedDrive::new(DriveConfig::immediate(), &SINE_NORMAL);
        let mut scheduler = TickScheduler::new(&drive, Record::default(), Beats::default());

        scheduler.run(&mut Budget(10));

        assert_eq!(scheduler.sink().0, vec![128; 10]);
        assert_eq!(scheduler.watchdog().0, 10);
        assert_eq!(drive.elapsed_ticks(), 10);
    }

    #[test]
    fn test_enabled_ticks_emit_waveform() {
        let drive = SharedDrive::new(DriveConfig::immediate(), &SINE_NORMAL);
        drive.commit(DriveCommand::Run {
            profile: RATE_TABLE.fast,
            boost_table: &SINE_FAST,
        });
        let mut scheduler = TickScheduler::new(&drive, Record::default(), Beats::default());

        scheduler.run(&mut Budget(1000));

        let samples = &scheduler.sink().0;
        assert_eq!(samples[0], 128);
        assert!(samples.iter().any(|&s| s > 200));
        assert!(samples.iter().any(|&s| s < 56));
    }

    #[test]
    fn test_ramp_runs_during_ticks() {
        let config = DriveConfig {
            ramp_step_ticks: 4,
            ramp_target: 10,
            ..DriveConfig::immediate()
        };
        let drive = SharedDrive::new(config, &SINE_NORMAL);
        let mut scheduler = TickScheduler::new(&drive, Record::default(), Beats::default());

        scheduler.run(&mut Budget(config.ramp_ticks() + 5));

        let samples = &scheduler.sink().0;
        assert_eq!(samples[0], 0);
        assert!(samples.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*samples.last().unwrap(), 10);
        assert!(drive.ramp_complete());
    }

    #[test]
    fn test_countdowns_age() {
        let drive = SharedDrive::new(DriveConfig::immediate(), &SINE_NORMAL);
        drive.arm_debounce(3);
        drive.arm_boost(5);
        let mut scheduler = TickScheduler::new(&drive, Record::default(), Beats::default());

        scheduler.run(&mut Budget(3));
        assert_eq!(drive.countdowns(), (0, 2));
        assert!(!drive.take_boost_finished());

        scheduler.run(&mut Budget(2));
        assert!(drive.take_boost_finished());
    }
}
