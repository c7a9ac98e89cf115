// nt_sbi/src/console.rs

//! Firmware console.
//!
//! The platform installs its UART (or any byte sink) with [`set_device`].
//! `print!`/`println!` write to it, and [`init_logger`] routes the `log`
//! macros through it with a coloured level tag and the calling hart.
//! Output before a device is installed is dropped.

use crate::trap::infrastructure::low_level;
use crate::trap::{SbiError, SbiResult};
use core::fmt;
use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::Mutex;

/// A byte-oriented output device.
pub trait ConsoleDevice: Send + Sync {
    fn putc(&self, ch: u8);

    fn puts(&self, s: &str) {
        for b in s.bytes() {
            self.putc(b);
        }
    }
}

static DEVICE: Mutex<Option<&'static dyn ConsoleDevice>> = Mutex::new(None);

/// Installs the console device, replacing any previous one.
pub fn set_device(device: &'static dyn ConsoleDevice) {
    *DEVICE.lock() = Some(device);
}

pub fn has_device() -> bool {
    DEVICE.lock().is_some()
}

struct Stdout<'a>(&'a dyn ConsoleDevice);

impl fmt::Write for Stdout<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.puts(s);
        Ok(())
    }
}

/// Formatted output. The device lock is held for the whole call so lines
/// from different harts do not interleave.
pub fn print(args: fmt::Arguments) {
    use core::fmt::Write;
    let device = DEVICE.lock();
    if let Some(dev) = *device {
        let _ = Stdout(dev).write_fmt(args);
    }
}

pub fn print_str(s: &str) {
    if let Some(dev) = *DEVICE.lock() {
        dev.puts(s);
    }
}

/// Formatted output to the firmware console.
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::console::print(format_args!($($arg)*))
    };
}

/// Formatted output to the firmware console, followed by a newline.
#[macro_export]
macro_rules! println {
    () => {
        $crate::print!("\n")
    };
    ($($arg:tt)*) => {
        $crate::print!("{}\n", format_args!($($arg)*))
    };
}

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

fn level_color(level: Level) -> u8 {
    match level {
        Level::Error => 31,
        Level::Warn => 33,
        Level::Info => 32,
        Level::Debug => 36,
        Level::Trace => 90,
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        crate::println!(
            "\x1b[{}m[{:>5}][hart {}] {}\x1b[0m",
            level_color(record.level()),
            record.level(),
            low_level::current_hart(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Routes the `log` macros to the console.
///
/// Fails with `AlreadyAvailable` if a logger is already installed.
pub fn init_logger(level: LevelFilter) -> SbiResult<()> {
    log::set_logger(&LOGGER).map_err(|_| SbiError::AlreadyAvailable)?;
    log::set_max_level(level);
    Ok(())
}
