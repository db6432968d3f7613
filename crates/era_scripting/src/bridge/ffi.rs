//! Bridges backed by the engine's exported C symbols
//!
//! This is the only module allowed to use `unsafe`. Each call passes plain
//! scalars or a pointer/length pair that stays valid for the duration of the
//! call; the engine copies what it keeps.
//!
//! Each symbol set sits behind its own cargo feature so a host only links
//! what its engine exports: `native-host-v1` for the legacy fire-and-forget
//! symbols ([`LegacyFfiBridge`]), `native-host-v2` for the status-returning
//! ones ([`FfiBridge`]).

#![allow(unsafe_code)]

use super::{BridgeResult, BridgeVersion, NativeBridge};
use crate::ecs::EntityHandle;
use crate::foundation::math::Vec3;
use crate::logging::Severity;

#[cfg(feature = "native-host-v1")]
mod legacy_symbols {
    #[link(name = "EraScriptingCPPDecls")]
    extern "C" {
        pub(super) fn log_message(mode: u32, message: *const u8, length: u32);
        #[link_name = "initializeSphereCollider"]
        pub(super) fn initialize_sphere_collider(id: i32, radius: f32);
        #[link_name = "initializeBoxCollider"]
        pub(super) fn initialize_box_collider(id: i32, hx: f32, hy: f32, hz: f32);
    }
}

#[cfg(feature = "native-host-v2")]
mod status_symbols {
    #[link(name = "EraScriptingCPPDecls")]
    extern "C" {
        pub(super) fn era_log_message_v2(mode: u32, message: *const u8, length: u32) -> i32;
        pub(super) fn era_initialize_sphere_collider_v2(id: i32, radius: f32) -> i32;
        pub(super) fn era_initialize_box_collider_v2(id: i32, hx: f32, hy: f32, hz: f32) -> i32;
    }
}

/// Bridge calling the legacy symbols, which report nothing back
///
/// Every successful call answers [`super::NativeCallOutcome::Unconfirmed`].
#[cfg(feature = "native-host-v1")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyFfiBridge;

#[cfg(feature = "native-host-v1")]
impl LegacyFfiBridge {
    /// Bridge over the legacy symbol set
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(feature = "native-host-v1")]
impl NativeBridge for LegacyFfiBridge {
    fn version(&self) -> BridgeVersion {
        BridgeVersion::V1
    }

    fn log_message(&self, severity: Severity, message: &str) -> BridgeResult {
        let length = super::checked_message_len(message)?;
        // SAFETY: ptr/length describe a live UTF-8 buffer for the whole call.
        unsafe { legacy_symbols::log_message(severity.code(), message.as_ptr(), length) };
        Ok(super::NativeCallOutcome::Unconfirmed)
    }

    fn initialize_sphere_collider(&self, entity: EntityHandle, radius: f32) -> BridgeResult {
        // SAFETY: scalar arguments only.
        unsafe { legacy_symbols::initialize_sphere_collider(entity.raw(), radius) };
        Ok(super::NativeCallOutcome::Unconfirmed)
    }

    fn initialize_box_collider(&self, entity: EntityHandle, half_extents: Vec3) -> BridgeResult {
        // SAFETY: scalar arguments only.
        unsafe {
            legacy_symbols::initialize_box_collider(entity.raw(), half_extents.x, half_extents.y, half_extents.z);
        };
        Ok(super::NativeCallOutcome::Unconfirmed)
    }
}

/// Bridge calling the status-returning symbols
#[cfg(feature = "native-host-v2")]
#[derive(Debug, Default, Clone, Copy)]
pub struct FfiBridge;

#[cfg(feature = "native-host-v2")]
impl FfiBridge {
    /// Bridge over the status-returning symbol set
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(feature = "native-host-v2")]
impl NativeBridge for FfiBridge {
    fn version(&self) -> BridgeVersion {
        BridgeVersion::V2
    }

    fn log_message(&self, severity: Severity, message: &str) -> BridgeResult {
        let length = super::checked_message_len(message)?;
        // SAFETY: ptr/length describe a live UTF-8 buffer for the whole call.
        let status = unsafe { status_symbols::era_log_message_v2(severity.code(), message.as_ptr(), length) };
        super::NativeStatus(status).into_result(super::NativeCall::LogMessage, None)
    }

    fn initialize_sphere_collider(&self, entity: EntityHandle, radius: f32) -> BridgeResult {
        // SAFETY: scalar arguments only.
        let status = unsafe { status_symbols::era_initialize_sphere_collider_v2(entity.raw(), radius) };
        super::NativeStatus(status).into_result(super::NativeCall::InitializeSphereCollider, Some(entity))
    }

    fn initialize_box_collider(&self, entity: EntityHandle, half_extents: Vec3) -> BridgeResult {
        // SAFETY: scalar arguments only.
        let status = unsafe {
            status_symbols::era_initialize_box_collider_v2(entity.raw(), half_extents.x, half_extents.y, half_extents.z)
        };
        super::NativeStatus(status).into_result(super::NativeCall::InitializeBoxCollider, Some(entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only constructs the bridges; calling them needs the engine library at runtime.
    #[cfg(feature = "native-host-v1")]
    #[test]
    fn test_legacy_bridge_reports_v1() {
        assert_eq!(LegacyFfiBridge::new().version(), BridgeVersion::V1);
    }

    #[cfg(feature = "native-host-v2")]
    #[test]
    fn test_status_bridge_reports_v2() {
        assert_eq!(FfiBridge::new().version(), BridgeVersion::V2);
    }
}
