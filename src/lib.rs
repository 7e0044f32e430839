//! # SiderealDrive
//!
//! Telescope mount drive: a DDS sine generator feeding an 8-bit PWM,
//! a rate controller reading a selector switch, and a fixed-rate tick
//! scheduler tying the two together.
//!
//! ## Architecture
//!
//! Two execution contexts share one [`SharedDrive`]:
//! - Tick task (31.25 kHz): sample out, watchdog fed, countdowns aged.
//!   Never blocks, never formats, never allocates.
//! - Control loop: switch polling, debounce/boost sequencing, log drain.
//!   Every rate change is committed in one critical section.
//!
//! The core is `no_std` and talks to hardware only through the traits in
//! [`port`]; the ESP-IDF implementations live in `hal`.

#![cfg_attr(not(any(test, target_os = "espidf")), no_std)]

pub mod config;
pub mod controller;
pub mod dds;
pub mod drive;
pub mod logging;
pub mod port;
pub mod rate;
pub mod scheduler;
pub mod switch;
pub mod timers;
pub mod uart_logger;

#[cfg(target_os = "espidf")]
pub mod hal;

pub use config::{DriveConfig, CONFIG};
pub use controller::{ControllerState, RateController};
pub use dds::{Generator, SineTable};
pub use drive::{DriveCommand, SharedDrive};
pub use logging::{LogLevel, LogRing};
pub use port::{SampleSink, SwitchInput, TickSource, Watchdog};
pub use rate::{Rate, RateProfile, RATE_TABLE};
pub use scheduler::TickScheduler;
pub use switch::{SwitchMap, SwitchReading, DEFAULT_SWITCH_MAP};
