//! Capability interfaces between the drive core and the board.
//!
//! Production builds implement these over timer/LEDC/TWDT/GPIO drivers
//! (see `hal`); host tests use a virtual clock and recording sinks.

/// Accepts one PWM duty value per tick.
pub trait SampleSink {
    fn write_duty(&mut self, duty: u8);
}

/// Liveness signal. Missing it longer than the timeout resets the board.
pub trait Watchdog {
    fn feed(&mut self);
}

/// Fixed-cadence tick source.
pub trait TickSource {
    /// Block until the next tick. Returns `false` once the source has stopped.
    fn wait_tick(&mut self) -> bool;
}

/// Raw switch/override pattern, read once per control-loop iteration.
pub trait SwitchInput {
    fn read(&mut self) -> u8;
}

impl<T: SampleSink + ?Sized> SampleSink for &mut T {
    #[inline]
    fn write_duty(&mut self, duty: u8) {
        (**self).write_duty(duty)
    }
}

impl<T: Watchdog + ?Sized> Watchdog for &mut T {
    #[inline]
    fn feed(&mut self) {
        (**self).feed()
    }
}

impl<F: FnMut() -> u8> SwitchInput for F {
    #[inline]
    fn read(&mut self) -> u8 {
        self()
    }
}
