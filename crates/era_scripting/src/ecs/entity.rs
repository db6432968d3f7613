//! Entity handles

use std::fmt;

/// Opaque identifier of a native-owned entity
///
/// The native engine mints and destroys entities; scripting code only stores
/// and forwards the handle. A handle can outlive its entity, in which case the
/// bridge reports it as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityHandle(i32);

impl EntityHandle {
    /// Wrap a handle received from the native side
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw value passed across the boundary
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl From<i32> for EntityHandle {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
