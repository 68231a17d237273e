/*
================================================================================
                            Face Overlay Logging
================================================================================

Standard application logging through the `log` crate (debug!, info!, etc.).

- `CompositeLogger`: console output (env_logger) plus in-memory capture
- `BufferLogger`: keeps the last MAX_LOG_LINES crate log lines for export
- `setup_logger()`: installs the composite logger with crate-only filters
- `setup_panic_hook()`: writes panic location and recent log lines to panic.log
- `export_debug_logs()`: writes the captured log lines to debug.log

Log levels:
- RUST_LOG set: used as-is
- Debug builds: DEBUG and above for this crate
- Release builds: ERROR only
Other crates are filtered out.

Files go to `<data dir>/face-overlay/logs/` unless a directory is given.
================================================================================
*/

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use env_logger::fmt::{Color, Formatter};
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::OnceCell;

const MAX_LOG_LINES: usize = 1000;
const LOG_TARGET_PREFIX: &str = "face_overlay";

pub type LogBuffer = Arc<Mutex<VecDeque<String>>>;

// Buffer of the installed logger; set once
static SHARED_LOG_BUFFER: OnceCell<LogBuffer> = OnceCell::new();

struct BufferLogger {
    log_buffer: LogBuffer,
}

impl BufferLogger {
    fn new() -> Self {
        Self {
            log_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_LINES))),
        }
    }

    fn log_to_buffer(&self, message: &str, target: &str, line: Option<u32>) {
        let mut buffer = self.log_buffer.lock().unwrap_or_else(PoisonError::into_inner);
        if buffer.len() == MAX_LOG_LINES {
            buffer.pop_front();
        }

        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ");
        let formatted_message = if let Some(line_num) = line {
            format!("{timestamp} {target}:{line_num} {message}")
        } else {
            format!("{timestamp} {target} {message}")
        };

        buffer.push_back(formatted_message);
    }

    fn get_shared_buffer(&self) -> LogBuffer {
        Arc::clone(&self.log_buffer)
    }
}

impl log::Log for BufferLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with(LOG_TARGET_PREFIX) && metadata.level() <= LevelFilter::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("{:<5} {}", record.level(), record.args());
            self.log_to_buffer(&message, record.target(), record.line());
        }
    }

    fn flush(&self) {}
}

struct CompositeLogger {
    console_logger: env_logger::Logger,
    buffer_logger: BufferLogger,
}

impl log::Log for CompositeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console_logger.enabled(metadata) || self.buffer_logger.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.console_logger.enabled(record.metadata()) {
            self.console_logger.log(record);
        }
        if self.buffer_logger.enabled(record.metadata()) {
            self.buffer_logger.log(record);
        }
    }

    fn flush(&self) {
        self.console_logger.flush();
        self.buffer_logger.flush();
    }
}

/// Install the console + buffer logger. Returns the capture buffer.
///
/// Calling this twice keeps the first logger; the second call only returns
/// the existing buffer.
pub fn setup_logger() -> LogBuffer {
    if let Some(buffer) = SHARED_LOG_BUFFER.get() {
        return Arc::clone(buffer);
    }

    let buffer_logger = BufferLogger::new();
    let shared_buffer = buffer_logger.get_shared_buffer();

    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        // Filter out all other crates' logs
        builder.filter(None, LevelFilter::Off);
        if cfg!(debug_assertions) {
            builder.filter(Some(LOG_TARGET_PREFIX), LevelFilter::Debug);
        } else {
            builder.filter(Some(LOG_TARGET_PREFIX), LevelFilter::Error);
        }
    }

    builder.format(|buf: &mut Formatter, record: &Record| {
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ");

        let module_info = match (record.module_path(), record.line()) {
            (Some(module), Some(line)) => format!("{module}:{line}"),
            (Some(module), None) => module.to_string(),
            (None, Some(line)) => format!("line:{line}"),
            (None, None) => "unknown".to_string(),
        };

        let mut level_style = buf.style();
        let mut meta_style = buf.style();

        match record.level() {
            Level::Error => level_style.set_color(Color::Red).set_bold(true),
            Level::Warn => level_style.set_color(Color::Yellow).set_bold(true),
            Level::Info => level_style.set_color(Color::Green).set_bold(true),
            Level::Debug => level_style.set_color(Color::Blue).set_bold(true),
            Level::Trace => level_style.set_color(Color::White),
        };

        #[cfg(target_os = "macos")]
        {
            // Color::Rgb does not render on the macOS terminal
            meta_style.set_color(Color::Blue);
        }

        #[cfg(not(target_os = "macos"))]
        {
            meta_style.set_color(Color::Rgb(120, 120, 120));
        }

        writeln!(
            buf,
            "{} {} {} {}",
            meta_style.value(timestamp),
            level_style.value(record.level()),
            meta_style.value(module_info),
            record.args()
        )
    });

    let composite_logger = CompositeLogger {
        console_logger: builder.build(),
        buffer_logger,
    };

    if log::set_boxed_logger(Box::new(composite_logger)).is_err() {
        eprintln!("A logger is already installed; log capture is disabled");
    }

    // Always set the maximum level to Trace so that per-logger filtering works
    log::set_max_level(LevelFilter::Trace);

    let _ = SHARED_LOG_BUFFER.set(Arc::clone(&shared_buffer));
    shared_buffer
}

pub fn get_log_directory(app_name: &str) -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join(app_name).join("logs")
}

/// Write the captured log lines to `<dir>/debug.log`
pub fn export_debug_logs(dir: &Path, log_buffer: &LogBuffer) -> Result<PathBuf, std::io::Error> {
    std::fs::create_dir_all(dir)?;
    let debug_log_path = dir.join("debug.log");

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&debug_log_path)?;

    let buffer = log_buffer.lock().unwrap_or_else(PoisonError::into_inner);
    writeln!(file, "# Exported {} at {}", buffer.len(), Utc::now().to_rfc3339())?;
    for line in buffer.iter() {
        writeln!(file, "{line}")?;
    }

    Ok(debug_log_path)
}

pub fn setup_panic_hook(app_name: &str, log_buffer: LogBuffer) {
    let log_file_path = get_log_directory(app_name).join("panic.log");

    panic::set_hook(Box::new(move |info| {
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ");
        let location = match info.location() {
            Some(location) => format!("{}:{}", location.file(), location.line()),
            None => "unknown location".to_string(),
        };
        let header_msg = format!("[PANIC] at {location} - {info}");

        eprintln!("\n{header_msg}");

        // The hook must not panic itself, so write failures are only reported
        let written = (|| -> std::io::Result<()> {
            if let Some(parent) = log_file_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&log_file_path)?;

            writeln!(file, "{timestamp} {header_msg}")?;
            writeln!(file)?;
            writeln!(file, "{timestamp} [PANIC] Last {MAX_LOG_LINES} log entries:")?;

            let buffer = log_buffer.lock().unwrap_or_else(PoisonError::into_inner);
            for log in buffer.iter() {
                writeln!(file, "{log}")?;
            }
            Ok(())
        })();

        match written {
            Ok(()) => eprintln!("A crash log has been written to: {}", log_file_path.display()),
            Err(e) => eprintln!("Failed to write crash log {}: {e}", log_file_path.display()),
        }
    }));
}
