use std::{io::Write, sync::Mutex};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

use crate::settings::LogFormat;

static FORMAT: Mutex<LogFormat> = Mutex::new(LogFormat::Text);

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl Entry {
    fn new(record: &Record) -> Self {
        Self {
            time: Local::now().format("%b %d %H:%M:%S").to_string(),
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        }
    }

    fn format(&self, format: LogFormat) -> String {
        match format {
            LogFormat::Text => format!(
                "{} {:<5} {}: {}",
                self.time, self.level, self.target, self.message
            ),
            LogFormat::Json => serde_json::to_string(self).unwrap_or_else(|_| self.message.clone()),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
pub enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

static LOGGER: Logger = Logger;

/// # Errors
///
/// Returns an error if the logger has already been initialized.
pub fn init(level: LevelFilter, format: LogFormat) -> Result<(), SetLoggerError> {
    if let Ok(mut current) = FORMAT.lock() {
        *current = format;
    }
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let format = FORMAT.lock().map_or(LogFormat::Text, |format| *format);
            // Nowhere left to report a failing stderr.
            write_entry(&mut std::io::stderr().lock(), &Entry::new(record), format).ok();
        }
    }

    fn flush(&self) {
        std::io::stderr().flush().ok();
    }
}

fn write_entry(out: &mut impl Write, entry: &Entry, format: LogFormat) -> std::io::Result<()> {
    writeln!(out, "{}", entry.format(format))
}
