//! Bridge from the `log` facade to a host-provided logger.
//!
//! The cipher only ever logs sizes, identifiers and error kinds. Records from
//! other crates are forwarded at `info` and above; their `debug`/`trace`
//! records are dropped.

use std::sync::{Arc, OnceLock};

/// Receives log lines emitted by this crate.
///
/// Implemented by the host app (Swift/Kotlin through `UniFFI`, or Rust).
///
/// ```rust
/// use donakit_core::logger::{LogLevel, Logger};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         eprintln!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Kotlin
///
/// ```kotlin
/// object DonakitLogBridge : Logger {
///     override fun log(level: LogLevel, message: String) {
///         Log.println(level.toPriority(), "donakit", message)
///     }
/// }
///
/// // Once, in Application.onCreate
/// setLogger(DonakitLogBridge)
/// ```
#[cfg_attr(feature = "ffi", uniffi::export(with_foreign))]
pub trait Logger: Sync + Send {
    /// Records one formatted message.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a forwarded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum LogLevel {
    /// Very detailed tracing.
    Trace,
    /// Key lifecycle and payload sizes.
    Debug,
    /// Informational.
    Info,
    /// Rejected envelopes and skipped profile fields.
    Warn,
    /// Failures.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

struct ForeignLogger;

impl ForeignLogger {
    fn forwards(level: log::Level, module_path: Option<&str>) -> bool {
        let verbose = matches!(level, log::Level::Debug | log::Level::Trace);
        let ours = module_path.is_some_and(|path| path.starts_with("donakit"));
        !verbose || ours
    }
}

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if !Self::forwards(record.level(), record.module_path()) {
            return;
        }
        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(record.level().into(), record.args().to_string());
        }
    }

    fn flush(&self) {}
}

/// Registers the host logger and installs the `log` bridge.
///
/// Only the first registration takes effect; later calls are ignored.
#[cfg_attr(feature = "ffi", uniffi::export)]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        log::warn!("logger already set, ignoring");
        return;
    }
    if let Err(err) = init_logger() {
        eprintln!("donakit: failed to install log bridge: {err}");
    }
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
