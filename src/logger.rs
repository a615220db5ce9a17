//! Console logger for hosted runs.
//!
//! Implements the [`log`] facade, writing one line per record to stderr:
//!
//! ```text
//! INFO [   12.345s] petbot_core::robot - cycle 40: eat
//! ```
//!
//! Embedded builds install their own logger instead; the crate itself only
//! ever talks to the `log` macros.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Metadata, Record, SetLoggerError};

/// Stderr logger stamped with the time since [`init`].
pub struct ConsoleLogger {
    started: Instant,
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = self.started.elapsed().as_secs_f64();
        let mut err = std::io::stderr().lock();
        let _ = writeln!(
            err,
            "{} [{:>10.3}s] {} - {}",
            record.level(),
            elapsed,
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<ConsoleLogger> = OnceLock::new();

/// Install the console logger at `level`.
///
/// # Errors
///
/// Returns [`SetLoggerError`] if another logger is already installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| ConsoleLogger {
        started: Instant::now(),
    });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}
