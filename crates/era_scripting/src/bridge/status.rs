//! Call outcomes and status decoding

use std::fmt;

use thiserror::Error;

use crate::ecs::EntityHandle;

/// Bridge calling convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BridgeVersion {
    /// Fire-and-forget calls, no status is returned
    V1,
    /// Every call returns an `i32` status code
    V2,
}

/// Identifies a bridge entry point in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeCall {
    /// `log_message`
    LogMessage,
    /// `initializeSphereCollider`
    InitializeSphereCollider,
    /// `initializeBoxCollider`
    InitializeBoxCollider,
}

impl fmt::Display for NativeCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LogMessage => "log_message",
            Self::InitializeSphereCollider => "initializeSphereCollider",
            Self::InitializeBoxCollider => "initializeBoxCollider",
        };
        f.write_str(name)
    }
}

/// What the engine told us about a call that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeCallOutcome {
    /// The engine reported success
    Confirmed,
    /// The call was issued but the engine cannot report its outcome
    Unconfirmed,
}

impl NativeCallOutcome {
    /// Whether the engine explicitly reported success
    pub const fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Failures reported by the bridge
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The handle does not name a live native entity
    #[error("{call} refused: entity {entity} is destroyed or was never created")]
    StaleHandle {
        /// Entry point that was called
        call: NativeCall,
        /// Offending handle
        entity: EntityHandle,
    },

    /// The engine returned a non-zero status
    #[error("{call} failed with native status {code}")]
    Rejected {
        /// Entry point that was called
        call: NativeCall,
        /// Raw status code
        code: i32,
    },

    /// The message does not fit the native `u32` length parameter
    #[error("log message of {0} bytes exceeds the native length limit")]
    MessageTooLong(usize),
}

/// Result of a bridge call
pub type BridgeResult = Result<NativeCallOutcome, BridgeError>;

/// Raw status returned by status-returning entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeStatus(pub i32);

impl NativeStatus {
    /// Call succeeded
    pub const OK: Self = Self(0);
    /// Entity handle is not live
    pub const STALE_HANDLE: Self = Self(1);

    /// Decode into a bridge result
    ///
    /// `entity` is the handle the call was made with, if any. A stale-handle
    /// status on a call without an entity is reported as a plain rejection.
    pub fn into_result(self, call: NativeCall, entity: Option<EntityHandle>) -> BridgeResult {
        match (self, entity) {
            (Self::OK, _) => Ok(NativeCallOutcome::Confirmed),
            (Self::STALE_HANDLE, Some(entity)) => Err(BridgeError::StaleHandle { call, entity }),
            (Self(code), _) => Err(BridgeError::Rejected { call, code }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_decoding() {
        let entity = EntityHandle::from_raw(4);
        let call = NativeCall::InitializeSphereCollider;

        assert_eq!(NativeStatus::OK.into_result(call, Some(entity)), Ok(NativeCallOutcome::Confirmed));
        assert_eq!(
            NativeStatus::STALE_HANDLE.into_result(call, Some(entity)),
            Err(BridgeError::StaleHandle { call, entity })
        );
        assert_eq!(
            NativeStatus(-3).into_result(call, Some(entity)),
            Err(BridgeError::Rejected { call, code: -3 })
        );
    }

    #[test]
    fn test_stale_without_entity_is_rejection() {
        let result = NativeStatus::STALE_HANDLE.into_result(NativeCall::LogMessage, None);
        assert_eq!(result, Err(BridgeError::Rejected { call: NativeCall::LogMessage, code: 1 }));
    }

    #[test]
    fn test_error_messages_name_the_call() {
        let err = BridgeError::StaleHandle {
            call: NativeCall::InitializeSphereCollider,
            entity: EntityHandle::from_raw(9),
        };
        assert_eq!(
            err.to_string(),
            "initializeSphereCollider refused: entity #9 is destroyed or was never created"
        );
    }
}
