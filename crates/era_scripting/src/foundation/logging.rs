//! Host-side logging initialisation
//!
//! Script diagnostics go through [`crate::logging::ScriptLogger`] to the native
//! engine. Everything the scripting core itself reports (registration,
//! escalation, bridge failures) goes through the `log` facade initialised here.

/// Initialize the logging system with a default level
///
/// `level` uses `env_logger` filter syntax (`"info"`, `"era_scripting=debug"`).
/// `RUST_LOG` still overrides it when set. Calling this twice is harmless.
pub fn init_with_level(level: &str) {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
    if result.is_err() {
        log::debug!("Logger already initialised, keeping existing configuration");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_keeps_first_logger() {
        init_with_level("warn");
        init_with_level("debug");
        log::warn!("host logger initialised");
    }
}
