//! Selector switch and guide buttons on GPIO.
//!
//! Four pulled-up, active-low inputs packed into the raw pattern the
//! [`SwitchMap`](crate::switch::SwitchMap) decodes:
//!
//! | bit | input              |
//! |-----|--------------------|
//! | 0   | slow guide button  |
//! | 1   | fast guide button  |
//! | 2   | rotary switch, A   |
//! | 3   | rotary switch, B   |

use esp_idf_svc::hal::gpio::{AnyIOPin, Input, PinDriver, Pull};
use esp_idf_svc::sys::EspError;

use crate::port::SwitchInput;

pub struct GpioSwitch<'d> {
    /// Indexed by bit position.
    pins: [PinDriver<'d, AnyIOPin, Input>; 4],
}

impl<'d> GpioSwitch<'d> {
    pub fn new(
        slow: AnyIOPin,
        fast: AnyIOPin,
        rotary_a: AnyIOPin,
        rotary_b: AnyIOPin,
    ) -> Result<Self, EspError> {
        Ok(Self {
            pins: [
                pulled_up(slow)?,
                pulled_up(fast)?,
                pulled_up(rotary_a)?,
                pulled_up(rotary_b)?,
            ],
        })
    }
}

fn pulled_up<'d>(pin: AnyIOPin) -> Result<PinDriver<'d, AnyIOPin, Input>, EspError> {
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(Pull::Up)?;
    Ok(driver)
}

impl SwitchInput for GpioSwitch<'_> {
    fn read(&mut self) -> u8 {
        self.pins
            .iter()
            .enumerate()
            .filter(|(_, pin)| pin.is_low())
            .fold(0, |raw, (bit, _)| raw | 1 << bit)
    }
}
