//! Bridge for running without an engine
//!
//! Every call succeeds and nothing is recorded.

use super::{BridgeResult, BridgeVersion, NativeBridge, NativeCallOutcome};
use crate::ecs::EntityHandle;
use crate::foundation::math::Vec3;
use crate::logging::Severity;

/// Bridge that accepts every call and does nothing
///
/// Useful for headless tools that run systems without an engine attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBridge;

impl NativeBridge for NullBridge {
    fn version(&self) -> BridgeVersion {
        BridgeVersion::V2
    }

    fn log_message(&self, severity: Severity, message: &str) -> BridgeResult {
        super::checked_message_len(message)?;
        log::trace!("NullBridge: dropped {} message", severity);
        Ok(NativeCallOutcome::Confirmed)
    }

    fn initialize_sphere_collider(&self, _entity: EntityHandle, _radius: f32) -> BridgeResult {
        Ok(NativeCallOutcome::Confirmed)
    }

    fn initialize_box_collider(&self, _entity: EntityHandle, _half_extents: Vec3) -> BridgeResult {
        Ok(NativeCallOutcome::Confirmed)
    }
}
