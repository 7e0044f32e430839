//! Task watchdog (TWDT) subscription for the tick task.

use core::time::Duration;

use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::task::watchdog::{TWDTConfig, TWDTDriver, WatchdogSubscription, TWDT};
use esp_idf_svc::sys::EspError;

use crate::config::WATCHDOG_TIMEOUT_MS;
use crate::port::Watchdog;

/// Configure the TWDT to reset the board after [`WATCHDOG_TIMEOUT_MS`]
/// without a feed.
pub fn driver<'d>(twdt: impl Peripheral<P = TWDT> + 'd) -> Result<TWDTDriver<'d>, EspError> {
    let config = TWDTConfig {
        duration: Duration::from_millis(WATCHDOG_TIMEOUT_MS as u64),
        panic_on_trigger: true,
        ..Default::default()
    };
    TWDTDriver::new(twdt, &config)
}

/// The calling task's TWDT subscription.
pub struct TaskWatchdog<'s> {
    subscription: WatchdogSubscription<'s>,
}

impl<'s> TaskWatchdog<'s> {
    /// Subscribe the current task. Call from the tick task.
    pub fn subscribe(driver: &'s mut TWDTDriver<'_>) -> Result<Self, EspError> {
        Ok(Self {
            subscription: driver.watch_current_task()?,
        })
    }
}

impl Watchdog for TaskWatchdog<'_> {
    #[inline]
    fn feed(&mut self) {
        // Only fails if the task is not subscribed, which `subscribe` rules out.
        let _ = self.subscription.feed();
    }
}
