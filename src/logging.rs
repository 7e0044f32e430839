//! RT-safe logging for SiderealDrive.
//!
//! ```text
//! Control loop           LogRing              Log drain
//! ────────────           ───────              ─────────
//!
//! rt_info!() ─────────▶ [L0][L1][L2] ──────▶ UART TX
//! stack format           lock-free            blocking ok
//! never blocks           ring buffer          background loop
//! ```
//!
//! # Rules
//!
//! - The tick handler never logs. Its budget is a few microseconds.
//! - The control loop logs through the `rt_*!` macros only.
//! - A full ring drops the message and counts it; the producer never waits.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 64;

/// Default ring capacity (entries).
pub const LOG_RING_SIZE: usize = 32;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Tick count when the entry was written.
    pub tick: u32,
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        tick: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text. Truncation may split a UTF-8 sequence; the valid prefix
    /// is returned in that case.
    pub fn message(&self) -> &str {
        let bytes = &self.msg[..self.len as usize];
        match core::str::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Single-producer, single-consumer log ring.
///
/// The control loop is the only producer; the log drain is the only
/// consumer.
pub struct LogRing<const N: usize = LOG_RING_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: one producer and one consumer. A slot is written only while it is
// outside [read_idx, write_idx), and published by the Release store of
// write_idx; the consumer reads it after an Acquire load.
unsafe impl<const N: usize> Sync for LogRing<N> {}
unsafe impl<const N: usize> Send for LogRing<N> {}

impl<const N: usize> LogRing<N> {
    const MASK: usize = N - 1;

    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log ring size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue a message. Returns `false` if the ring was full.
    #[inline]
    pub fn push(&self, tick: u32, level: LogLevel, msg: &[u8]) -> bool {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let len = msg.len().min(MAX_MSG_LEN);

        // SAFETY: single producer, slot not visible to the consumer yet
        unsafe {
            let entry = &mut (*self.entries.get())[write as usize & Self::MASK];
            entry.tick = tick;
            entry.level = level;
            entry.len = len as u8;
            entry.msg[..len].copy_from_slice(&msg[..len]);
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Take the oldest entry.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        // SAFETY: single consumer, slot published by the producer
        let entry = unsafe { (*self.entries.get())[read as usize & Self::MASK] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Number of entries waiting.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    /// Dropped message count since the last call; resets it.
    #[inline]
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }
}

impl<const N: usize> Default for LogRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format `args` into `buf`, truncating. Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    let mut writer = SliceWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// `core::fmt::Write` over a byte slice; silently truncates.
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }
}

impl core::fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let to_write = bytes.len().min(self.buf.len() - self.pos);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// RT-safe log macro.
///
/// ```ignore
/// rt_log!(LogLevel::Info, LOG, drive.elapsed_ticks(), "rate {}", rate.as_str());
/// ```
#[macro_export]
macro_rules! rt_log {
    ($level:expr, $ring:expr, $tick:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $ring.push($tick, $level, &buf[..len]);
    }};
}

#[macro_export]
macro_rules! rt_info {
    ($ring:expr, $tick:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Info, $ring, $tick, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_warn {
    ($ring:expr, $tick:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Warn, $ring, $tick, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_error {
    ($ring:expr, $tick:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Error, $ring, $tick, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_debug {
    ($ring:expr, $tick:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Debug, $ring, $tick, $($arg)*)
    };
}
