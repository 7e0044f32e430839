//! Hardware timer tick source.
//!
//! The timer ISR only notifies the tick task; all work happens in task
//! context, where the task watchdog can be fed.

use core::num::NonZeroU32;

use esp_idf_svc::hal::delay;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::task::notification::Notification;
use esp_idf_svc::hal::timer::{self, config::Config, TimerDriver};
use esp_idf_svc::sys::EspError;

use crate::config::TICK_HZ;
use crate::port::TickSource;

/// General-purpose timer alarm at [`TICK_HZ`], delivered as task
/// notifications.
///
/// Must be created on the task that will call [`TickSource::wait_tick`].
pub struct TimerTick<'d> {
    // Kept alive: dropping it stops the alarm.
    _timer: TimerDriver<'d>,
    notification: Notification,
}

impl<'d> TimerTick<'d> {
    pub fn new<T: timer::Timer>(timer: impl Peripheral<P = T> + 'd) -> Result<Self, EspError> {
        let mut timer = TimerDriver::new(timer, &Config::new().auto_reload(true))?;
        timer.set_alarm(timer.tick_hz() / TICK_HZ as u64)?;

        let notification = Notification::new();
        let notifier = notification.notifier();

        // SAFETY: the callback only posts a task notification, which is
        // ISR-safe, and captures nothing borrowed.
        unsafe {
            timer.subscribe(move || {
                notifier.notify_and_yield(NonZeroU32::MIN);
            })?;
        }

        timer.enable_interrupt()?;
        timer.enable_alarm(true)?;
        timer.enable(true)?;

        Ok(Self {
            _timer: timer,
            notification,
        })
    }
}

impl TickSource for TimerTick<'_> {
    /// Blocks until the next alarm. Missed alarms coalesce into one tick.
    #[inline]
    fn wait_tick(&mut self) -> bool {
        self.notification.wait(delay::BLOCK);
        true
    }
}
