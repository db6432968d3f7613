//! Native bridge
//!
//! The narrow call surface between scripting code and the native engine.
//! Nothing above this module talks to the engine directly: components call
//! [`NativeBridge`] to create physical shapes and the logging facade calls it
//! to emit diagnostics.
//!
//! Every call returns a [`BridgeResult`]. Engines that still export the legacy
//! fire-and-forget symbols ([`BridgeVersion::V1`]) answer
//! [`NativeCallOutcome::Unconfirmed`]; status-returning engines
//! ([`BridgeVersion::V2`]) answer `Confirmed` or a [`BridgeError`].

mod null;
mod recording;
mod status;

#[cfg(any(feature = "native-host-v1", feature = "native-host-v2"))]
mod ffi;

use std::sync::Arc;

use crate::ecs::EntityHandle;
use crate::foundation::math::Vec3;
use crate::logging::Severity;

pub use null::NullBridge;
pub use recording::{RecordedCall, RecordingBridge};
pub use status::{BridgeError, BridgeResult, BridgeVersion, NativeCall, NativeCallOutcome, NativeStatus};

#[cfg(feature = "native-host-v1")]
pub use ffi::LegacyFfiBridge;
#[cfg(feature = "native-host-v2")]
pub use ffi::FfiBridge;

/// Call surface exposed by the native engine
pub trait NativeBridge: Send + Sync {
    /// Which calling convention the engine speaks
    fn version(&self) -> BridgeVersion;

    /// Forward a log message to the engine's sink
    fn log_message(&self, severity: Severity, message: &str) -> BridgeResult;

    /// Create the native sphere shape for `entity`
    fn initialize_sphere_collider(&self, entity: EntityHandle, radius: f32) -> BridgeResult;

    /// Create the native box shape for `entity`
    fn initialize_box_collider(&self, entity: EntityHandle, half_extents: Vec3) -> BridgeResult;
}

/// Bridge shared between the world, the logger and the host
pub type SharedBridge = Arc<dyn NativeBridge>;

/// Reject messages the native length parameter cannot describe
pub(crate) fn checked_message_len(message: &str) -> Result<u32, BridgeError> {
    u32::try_from(message.len()).map_err(|_| BridgeError::MessageTooLong(message.len()))
}
