//! Minimal stderr logger for the `log` facade.
//!
//! Every line carries a `YYYYMMDD HH:MM:SS` local timestamp. The level
//! comes from `-v` flags unless `REGTRIM_LOG` names one.

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record};

pub const LOG_ENV: &str = "REGTRIM_LOG";

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let now = chrono::Local::now().format("%Y%m%d %H:%M:%S");
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{now} {:<5} {}", record.level(), record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger;

/// `warn` by default, `-v` → `info`, `-vv` and up → `debug`. A valid
/// level in the environment wins.
pub fn level_for(verbose: u8, env: Option<&str>) -> LevelFilter {
    if let Some(level) = env.and_then(|v| v.trim().parse::<LevelFilter>().ok()) {
        return level;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Install the logger. Safe to call more than once.
pub fn init(verbose: u8) {
    let level = level_for(verbose, std::env::var(LOG_ENV).ok().as_deref());
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
