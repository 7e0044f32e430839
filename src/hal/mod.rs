//! ESP-IDF implementations of the [`port`](crate::port) traits.
//!
//! Thin wrappers, no logic. Everything here is I/O.

pub mod pwm;
pub mod switch;
pub mod tick;
pub mod watchdog;

pub use pwm::LedcSink;
pub use switch::GpioSwitch;
pub use tick::TimerTick;
pub use watchdog::TaskWatchdog;
