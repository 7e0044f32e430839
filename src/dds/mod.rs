//! Direct digital synthesis of the motor drive waveform
//!
//! Architecture:
//! - Quarter-wave sine tables at three gains, generated at compile time
//! - 32-bit phase accumulator, one sample per PWM carrier period
//! - Amplitude table swaps deferred to zero crossings

pub mod sine;
pub mod generator;

pub use generator::{sample_at, Generator, MAX_MAGNITUDE, ZERO_LINE};
pub use sine::{SineTable, SINE_FAST, SINE_NORMAL, SINE_SLOW, TABLE_SIZE};
