//! Severity levels understood by the native log sink

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity tag carried by every script log message
///
/// The discriminants are the wire codes passed to `log_message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Severity {
    /// Informational message
    Normal = 0,
    /// Something unexpected that did not stop the frame
    Warning = 1,
    /// A failure the native side should surface
    Error = 2,
}

impl Severity {
    /// Wire code used by the native bridge
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Decode a wire code
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Normal),
            1 => Some(Self::Warning),
            2 => Some(Self::Error),
            _ => None,
        }
    }

    /// Matching level for the host-side `log` facade
    pub const fn as_log_level(self) -> log::Level {
        match self {
            Self::Normal => log::Level::Info,
            Self::Warning => log::Level::Warn,
            Self::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes() {
        assert_eq!(Severity::Normal.code(), 0);
        assert_eq!(Severity::Warning.code(), 1);
        assert_eq!(Severity::Error.code(), 2);
        assert_eq!(Severity::from_code(1), Some(Severity::Warning));
        assert_eq!(Severity::from_code(3), None);
    }

    #[test]
    fn test_ordering() {
        assert!(Severity::Normal < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }
}
