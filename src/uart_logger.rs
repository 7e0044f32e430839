//! UART log output.
//!
//! Drains the control loop's [`LogRing`] to a TX-only UART. Runs from the
//! main loop between controller polls; writing may block, which is fine
//! there and never happens on the tick task.
//!
//! Line format: `[    1234 ms] INFO: message`

use core::fmt::Write;

use crate::config::TICK_HZ;
use crate::logging::{LogEntry, LogRing, SliceWriter};

#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripheral::Peripheral;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::uart::{self, UartTxDriver};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::EspError;

/// Longest formatted line.
pub const LINE_LEN: usize = 96;

/// UART configuration for logging.
pub struct UartLoggerConfig {
    pub baud_rate: u32,
    /// Report dropped messages at most this often.
    pub drop_report_ticks: u32,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            drop_report_ticks: TICK_HZ * 10,
        }
    }
}

/// Tick count to milliseconds since boot.
#[inline]
pub fn ticks_to_ms(tick: u32) -> u64 {
    tick as u64 * 1000 / TICK_HZ as u64
}

/// Format a log entry as one line. Returns the number of bytes written.
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    let mut writer = SliceWriter::new(buf);
    let _ = write!(
        writer,
        "[{:8} ms] {}: {}\n",
        ticks_to_ms(entry.tick),
        entry.level.as_str(),
        entry.message()
    );
    writer.len()
}

/// Format the periodic dropped-messages notice.
pub fn format_drop_report(dropped: u32, buf: &mut [u8]) -> usize {
    let mut writer = SliceWriter::new(buf);
    let _ = write!(writer, "[WARN] log ring dropped {} messages\n", dropped);
    writer.len()
}

/// Log drain bound to a UART transmitter.
#[cfg(target_os = "espidf")]
pub struct UartLogger<'d> {
    uart: UartTxDriver<'d>,
    drop_report_ticks: u32,
    last_drop_report: u32,
}

#[cfg(target_os = "espidf")]
impl<'d> UartLogger<'d> {
    /// TX-only UART1 on `tx_pin`.
    pub fn new(
        uart: impl Peripheral<P = uart::UART1> + 'd,
        tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
        config: &UartLoggerConfig,
    ) -> Result<Self, EspError> {
        let uart_config = uart::config::Config::default()
            .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

        let uart = UartTxDriver::new(
            uart,
            tx_pin,
            Option::<gpio::AnyIOPin>::None, // CTS
            Option::<gpio::AnyIOPin>::None, // RTS
            &uart_config,
        )?;

        Ok(Self {
            uart,
            drop_report_ticks: config.drop_report_ticks,
            last_drop_report: 0,
        })
    }

    /// Write every pending entry. Returns `true` if anything was written.
    pub fn drain<const N: usize>(&mut self, ring: &LogRing<N>, now_tick: u32) -> bool {
        let mut line = [0u8; LINE_LEN];
        let mut work_done = false;

        while let Some(entry) = ring.drain() {
            let len = format_log_entry(&entry, &mut line);
            let _ = self.uart.write(&line[..len]);
            work_done = true;
        }

        if now_tick.wrapping_sub(self.last_drop_report) >= self.drop_report_ticks {
            let dropped = ring.take_dropped();
            if dropped > 0 {
                let len = format_drop_report(dropped, &mut line);
                let _ = self.uart.write(&line[..len]);
            }
            self.last_drop_report = now_tick;
        }

        work_done
    }
}

/// Host-side drain into any `core::fmt::Write` (used by tests and tools).
pub fn drain_to<const N: usize>(ring: &LogRing<N>, out: &mut impl Write) -> usize {
    let mut line = [0u8; LINE_LEN];
    let mut count = 0;
    while let Some(entry) = ring.drain() {
        let len = format_log_entry(&entry, &mut line);
        if let Ok(text) = core::str::from_utf8(&line[..len]) {
            let _ = out.write_str(text);
        }
        count += 1;
    }
    count
}
