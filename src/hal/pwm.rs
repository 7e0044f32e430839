//! LEDC PWM output.

use esp_idf_svc::hal::gpio::OutputPin;
use esp_idf_svc::hal::ledc::{self, config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::EspError;

use crate::config::{PWM_PERIOD, TICK_HZ};
use crate::port::SampleSink;

/// LEDC timer running the PWM carrier at the tick rate, 8-bit resolution.
pub fn carrier_timer<'d, T: ledc::LedcTimer + 'd>(
    timer: impl Peripheral<P = T> + 'd,
) -> Result<LedcTimerDriver<'d, T>, EspError> {
    const _: () = assert!(PWM_PERIOD == 256, "LEDC resolution is fixed at 8 bits");

    let config = TimerConfig::default()
        .frequency(Hertz(TICK_HZ))
        .resolution(Resolution::Bits8);
    LedcTimerDriver::new(timer, &config)
}

/// One LEDC channel driven with one duty value per tick.
pub struct LedcSink<'d> {
    channel: LedcDriver<'d>,
}

impl<'d> LedcSink<'d> {
    pub fn new<C: ledc::LedcChannel<SpeedMode = T::SpeedMode>, T: ledc::LedcTimer + 'd>(
        channel: impl Peripheral<P = C> + 'd,
        timer: &'d LedcTimerDriver<'d, T>,
        pin: impl Peripheral<P = impl OutputPin> + 'd,
    ) -> Result<Self, EspError> {
        let mut channel = LedcDriver::new(channel, timer, pin)?;
        channel.set_duty(0)?;
        channel.enable()?;
        Ok(Self { channel })
    }
}

impl SampleSink for LedcSink<'_> {
    #[inline]
    fn write_duty(&mut self, duty: u8) {
        // A failed duty update keeps the previous duty for one more period.
        let _ = self.channel.set_duty(duty as u32);
    }
}
