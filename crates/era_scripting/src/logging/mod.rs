//! Script logging facade
//!
//! `log`, `warning` and `error` tag a message with a [`Severity`] and forward
//! it to the bridge's `log_message`. A minimum-severity filter and optional
//! background delivery keep logging from stalling the frame loop.
//!
//! Components and the scheduler log through the [`ScriptLogger`] owned by the
//! world. Script glue that has no world at hand can use the process-wide
//! facade: [`install`] once at startup, then the free functions below.

mod logger;
mod severity;

use std::sync::OnceLock;

pub use logger::{ScriptLogger, SCRIPT_LOG_TARGET};
pub use severity::Severity;

static GLOBAL: OnceLock<ScriptLogger> = OnceLock::new();

/// Install the process-wide logger
///
/// Returns the logger back if one was already installed.
pub fn install(logger: ScriptLogger) -> Result<(), ScriptLogger> {
    GLOBAL.set(logger)
}

/// The process-wide logger, if installed
pub fn global() -> Option<&'static ScriptLogger> {
    GLOBAL.get()
}

/// Log through the process-wide logger
///
/// Before [`install`] the message only reaches the host `log` facade.
pub fn log_with(severity: Severity, message: &str) {
    match GLOBAL.get() {
        Some(logger) => logger.log_with(severity, message),
        None => log::log!(target: SCRIPT_LOG_TARGET, severity.as_log_level(), "{}", message),
    }
}

/// Informational message through the process-wide logger
pub fn log(message: &str) {
    log_with(Severity::Normal, message);
}

/// Warning through the process-wide logger
pub fn warning(message: &str) {
    log_with(Severity::Warning, message);
}

/// Error through the process-wide logger
pub fn error(message: &str) {
    log_with(Severity::Error, message);
}
