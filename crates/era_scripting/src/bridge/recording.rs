//! In-process bridge that stands in for the native engine
//!
//! Records every call and keeps its own table of live entities, so tests and
//! the sandbox host can observe exactly what crossed the boundary.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{
    BridgeResult, BridgeVersion, NativeBridge, NativeCall, NativeCallOutcome, NativeStatus,
};
use crate::ecs::EntityHandle;
use crate::foundation::math::Vec3;
use crate::logging::Severity;

/// One call observed by a [`RecordingBridge`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// `log_message`
    LogMessage {
        /// Severity tag
        severity: Severity,
        /// Message text
        message: String,
    },
    /// `initializeSphereCollider`
    SphereCollider {
        /// Target entity
        entity: EntityHandle,
        /// Requested radius
        radius: f32,
    },
    /// `initializeBoxCollider`
    BoxCollider {
        /// Target entity
        entity: EntityHandle,
        /// Requested half extents
        half_extents: Vec3,
    },
}

impl RecordedCall {
    /// Whether this call created a physical shape
    pub const fn is_collider(&self) -> bool {
        matches!(self, Self::SphereCollider { .. } | Self::BoxCollider { .. })
    }
}

#[derive(Debug)]
struct State {
    calls: Vec<RecordedCall>,
    live: HashSet<EntityHandle>,
    next_handle: i32,
    forced_status: Option<i32>,
}

/// Recording stand-in for the native engine
#[derive(Debug)]
pub struct RecordingBridge {
    version: BridgeVersion,
    state: Mutex<State>,
}

impl Default for RecordingBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBridge {
    /// Status-returning bridge
    pub fn new() -> Self {
        Self::with_version(BridgeVersion::V2)
    }

    /// Bridge that behaves like an engine exporting only fire-and-forget calls
    pub fn legacy() -> Self {
        Self::with_version(BridgeVersion::V1)
    }

    /// Bridge speaking the given convention
    pub fn with_version(version: BridgeVersion) -> Self {
        Self {
            version,
            state: Mutex::new(State {
                calls: Vec::new(),
                live: HashSet::new(),
                next_handle: 1,
                forced_status: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mint a new live entity handle, as the engine would when spawning
    pub fn spawn_entity(&self) -> EntityHandle {
        let mut state = self.state();
        let handle = EntityHandle::from_raw(state.next_handle);
        state.next_handle += 1;
        state.live.insert(handle);
        handle
    }

    /// Destroy an entity on the "native" side
    ///
    /// Returns false if the handle was not live.
    pub fn destroy_entity(&self, entity: EntityHandle) -> bool {
        self.state().live.remove(&entity)
    }

    /// Whether the handle names a live entity
    pub fn is_alive(&self, entity: EntityHandle) -> bool {
        self.state().live.contains(&entity)
    }

    /// Make every following collider call return `code` (V2 only)
    pub fn force_status(&self, code: Option<i32>) {
        self.state().forced_status = code;
    }

    /// Snapshot of all recorded calls, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// Recorded collider calls only
    pub fn collider_calls(&self) -> Vec<RecordedCall> {
        self.state().calls.iter().filter(|c| c.is_collider()).cloned().collect()
    }

    /// Recorded log messages only
    pub fn log_messages(&self) -> Vec<(Severity, String)> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                RecordedCall::LogMessage { severity, message } => Some((*severity, message.clone())),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls, keeping the entity table
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn shape_call(&self, call: NativeCall, entity: EntityHandle, record: RecordedCall) -> BridgeResult {
        let mut state = self.state();
        state.calls.push(record);

        match self.version {
            // A legacy engine would log the problem on its side; we never learn about it.
            BridgeVersion::V1 => Ok(NativeCallOutcome::Unconfirmed),
            BridgeVersion::V2 => {
                let status = if let Some(code) = state.forced_status {
                    NativeStatus(code)
                } else if state.live.contains(&entity) {
                    NativeStatus::OK
                } else {
                    NativeStatus::STALE_HANDLE
                };
                status.into_result(call, Some(entity))
            }
        }
    }
}

impl NativeBridge for RecordingBridge {
    fn version(&self) -> BridgeVersion {
        self.version
    }

    fn log_message(&self, severity: Severity, message: &str) -> BridgeResult {
        super::checked_message_len(message)?;
        self.state().calls.push(RecordedCall::LogMessage {
            severity,
            message: message.to_string(),
        });
        Ok(match self.version {
            BridgeVersion::V1 => NativeCallOutcome::Unconfirmed,
            BridgeVersion::V2 => NativeCallOutcome::Confirmed,
        })
    }

    fn initialize_sphere_collider(&self, entity: EntityHandle, radius: f32) -> BridgeResult {
        self.shape_call(
            NativeCall::InitializeSphereCollider,
            entity,
            RecordedCall::SphereCollider { entity, radius },
        )
    }

    fn initialize_box_collider(&self, entity: EntityHandle, half_extents: Vec3) -> BridgeResult {
        self.shape_call(
            NativeCall::InitializeBoxCollider,
            entity,
            RecordedCall::BoxCollider { entity, half_extents },
        )
    }
}
