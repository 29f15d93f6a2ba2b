//! Crate logger
//!
//! Every module logs through the standard `log` macros. Applications that do
//! not bring their own logger can install this one:
//!
//! ```rust,no_run
//! use casket_core::logging::{init_logging, LoggingConfig};
//!
//! let config = LoggingConfig::production().with_context_field("node", "cas-1");
//! init_logging(&config).unwrap();
//!
//! log::info!("Session store ready");
//! ```
//!
//! Session resolution steps are logged at `trace`, cookie decisions and
//! discarded cookies at `debug`.

pub mod config;
pub mod formatter;

pub use config::{LogLevel, LogOutput, LoggingConfig};
pub use formatter::{LogEntry, LogFormat};

use serde_json::Value;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Install the crate logger as the global `log` backend.
///
/// Only the first call has any effect. Fails if another logger was installed
/// first.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = install(config);
    });
    result
}

fn install(config: &LoggingConfig) -> anyhow::Result<()> {
    log::set_boxed_logger(Box::new(CasketLogger::new(config)))
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;
    log::set_max_level(config.level.to_level_filter());
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Stream {
    Stdout,
    Stderr,
}

struct ConsoleWriter {
    stream: Stream,
    format: LogFormat,
}

impl ConsoleWriter {
    fn write(&self, entry: &LogEntry) -> std::io::Result<()> {
        let line = self.format.format_entry(entry);
        match self.stream {
            Stream::Stdout => writeln!(std::io::stdout().lock(), "{}", line),
            Stream::Stderr => writeln!(std::io::stderr().lock(), "{}", line),
        }
    }

    fn flush(&self) -> std::io::Result<()> {
        match self.stream {
            Stream::Stdout => std::io::stdout().flush(),
            Stream::Stderr => std::io::stderr().flush(),
        }
    }
}

/// `log::Log` implementation writing formatted entries to the console
struct CasketLogger {
    level: log::Level,
    context_fields: Vec<(String, Value)>,
    writers: Vec<ConsoleWriter>,
}

impl CasketLogger {
    fn new(config: &LoggingConfig) -> Self {
        let mut writers: Vec<ConsoleWriter> = config
            .outputs
            .iter()
            .map(|output| match output {
                LogOutput::Stdout { format } => ConsoleWriter {
                    stream: Stream::Stdout,
                    format: format.clone().unwrap_or_else(|| config.format.clone()),
                },
                LogOutput::Stderr { format } => ConsoleWriter {
                    stream: Stream::Stderr,
                    format: format.clone().unwrap_or_else(|| config.format.clone()),
                },
            })
            .collect();

        if writers.is_empty() {
            writers.push(ConsoleWriter { stream: Stream::Stdout, format: config.format.clone() });
        }

        let context_fields = config
            .context_fields
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();

        Self { level: config.level.into(), context_fields, writers }
    }

    fn entry(&self, record: &log::Record<'_>) -> LogEntry {
        self.context_fields
            .iter()
            .fold(LogEntry::from_record(record), |entry, (key, value)| entry.with_field(key.clone(), value.clone()))
    }
}

impl log::Log for CasketLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = self.entry(record);
        for writer in &self.writers {
            let _ = writer.write(&entry);
        }
    }

    fn flush(&self) {
        for writer in &self.writers {
            let _ = writer.flush();
        }
    }
}
