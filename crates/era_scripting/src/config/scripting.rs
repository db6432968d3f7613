//! # Scripting Configuration
//!
//! Top-level settings for the scripting core, grouped per subsystem the same
//! way the file on disk is laid out:
//!
//! ```toml
//! [engine]
//! log_level = "info"
//!
//! [logging]
//! min_severity = "Warning"
//! delivery = "Background"
//! queue_capacity = 1024
//!
//! [scheduler]
//! fault_escalation_threshold = 3
//! ```

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::logging::Severity;

/// Host-side engine behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Filter passed to `env_logger` for host-side diagnostics
    pub log_level: String,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }

    /// Set log level
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// How script log messages reach the native sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Call the bridge on the calling thread
    Immediate,
    /// Queue messages for a worker thread; a full queue drops instead of blocking
    Background,
}

/// Script logging facade settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Messages below this severity are discarded before reaching the bridge
    pub min_severity: Severity,
    /// Delivery strategy
    pub delivery: DeliveryMode,
    /// Capacity of the background queue
    pub queue_capacity: usize,
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self {
            min_severity: Severity::Normal,
            delivery: DeliveryMode::Immediate,
            queue_capacity: 1024,
        }
    }

    /// Set the minimum severity
    #[must_use]
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Use background delivery with the given queue capacity
    #[must_use]
    pub fn with_background_delivery(mut self, queue_capacity: usize) -> Self {
        self.delivery = DeliveryMode::Background;
        self.queue_capacity = queue_capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delivery == DeliveryMode::Background && self.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "logging.queue_capacity must be at least 1 for background delivery".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// System scheduler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Consecutive faulting frames after which a system is deregistered
    pub fault_escalation_threshold: u32,
}

impl SchedulerConfig {
    /// Create a new scheduler configuration
    pub fn new() -> Self {
        Self {
            fault_escalation_threshold: 3,
        }
    }

    /// Set the escalation threshold
    #[must_use]
    pub fn with_fault_escalation_threshold(mut self, frames: u32) -> Self {
        self.fault_escalation_threshold = frames;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fault_escalation_threshold == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.fault_escalation_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Scripting Configuration
///
/// This is the main configuration structure hosts should use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptingConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Script logging configuration
    pub logging: LoggingConfig,
    /// Scheduler configuration
    pub scheduler: SchedulerConfig,
}

impl ScriptingConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logging.validate()?;
        self.scheduler.validate()?;
        Ok(())
    }
}

impl Config for ScriptingConfig {}
