//! Host simulation harness: virtual clock, recording sink, counting watchdog.

#![allow(dead_code)]

use sidereal_drive::controller::RateController;
use sidereal_drive::port::{SampleSink, SwitchInput, TickSource, Watchdog};
use sidereal_drive::rate::Rate;
use sidereal_drive::scheduler::TickScheduler;
use sidereal_drive::switch::DEFAULT_SWITCH_MAP;

/// Ticks between controller polls (1 ms control loop at 31.25 kHz).
pub const POLL_EVERY: u64 = 31;

/// Tick source that yields a granted number of ticks, then stops.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: u64,
    budget: u64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `ticks` more ticks before `wait_tick` returns `false`.
    pub fn grant(&mut self, ticks: u64) -> &mut Self {
        self.budget += ticks;
        self
    }

    /// Ticks elapsed so far.
    pub fn now(&self) -> u64 {
        self.now
    }
}

impl TickSource for VirtualClock {
    fn wait_tick(&mut self) -> bool {
        if self.budget == 0 {
            return false;
        }
        self.budget -= 1;
        self.now += 1;
        true
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub samples: Vec<u8>,
}

impl RecordingSink {
    /// Samples recorded from tick `from` on.
    pub fn since(&self, from: usize) -> &[u8] {
        &self.samples[from.min(self.samples.len())..]
    }
}

impl SampleSink for RecordingSink {
    fn write_duty(&mut self, duty: u8) {
        self.samples.push(duty);
    }
}

#[derive(Debug, Default)]
pub struct CountingWatchdog {
    pub feeds: u64,
}

impl Watchdog for CountingWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

/// Raw switch pattern for a knob position plus an optional guide line.
pub fn pattern(position: Rate, guide: Option<Rate>) -> u8 {
    let map = DEFAULT_SWITCH_MAP;
    let knob = map.encode_position(position).expect("position not on the knob");
    match guide {
        Some(Rate::Slow) => knob | map.slow_mask,
        Some(Rate::Fast) => knob | map.fast_mask,
        _ => knob,
    }
}

/// Run `ticks` ticks with a controller poll every [`POLL_EVERY`] ticks.
///
/// Returns every change of the committed rate as `(tick, new rate)`.
pub fn run_loop<S, W, I>(
    scheduler: &mut TickScheduler<'_, S, W>,
    controller: &mut RateController<'_, I>,
    clock: &mut VirtualClock,
    ticks: u64,
) -> Vec<(u64, Rate)>
where
    S: SampleSink,
    W: Watchdog,
    I: SwitchInput,
{
    let mut changes = Vec::new();
    let mut remaining = ticks;
    while remaining > 0 {
        let step = remaining.min(POLL_EVERY);
        scheduler.run(clock.grant(step));
        remaining -= step;

        let before = controller.active_rate();
        controller.poll();
        if controller.active_rate() != before {
            changes.push((clock.now(), controller.active_rate()));
        }
    }
    changes
}

/// Tick indices at which the waveform crosses the zero line upwards.
pub fn upward_crossings(samples: &[u8]) -> Vec<usize> {
    samples
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0] < 128 && pair[1] >= 128)
        .map(|(i, _)| i + 1)
        .collect()
}
