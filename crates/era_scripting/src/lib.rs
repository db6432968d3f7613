//! # Era Scripting
//!
//! Scripting core for a native, host-owned game engine.
//!
//! ## Features
//!
//! - **Priority Scheduling**: Systems run High, then Normal, then Low, in
//!   registration order within a priority
//! - **Fault Isolation**: A failing or panicking system never stops the frame
//! - **Components**: Sphere and box colliders mirrored from the native engine
//! - **Native Bridge**: Versioned call surface with explicit status results
//! - **Script Logging**: Severity-filtered log facade, optionally delivered
//!   from a background thread
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use era_scripting::prelude::*;
//!
//! struct Spin;
//!
//! impl System for Spin {
//!     fn priority(&self) -> SystemPriority {
//!         SystemPriority::High
//!     }
//!
//!     fn update(&mut self, world: &mut World, delta_time: f32) -> Result<(), SystemFault> {
//!         world.logger().log(format!("spun by {}", delta_time));
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bridge = Arc::new(RecordingBridge::new());
//!     let entity = bridge.spawn_entity();
//!
//!     let mut host = ScriptingHost::new(ScriptingConfig::default(), bridge)?;
//!     let collider = host.world_mut().attach_sphere_collider(entity)?;
//!     host.world_mut().initialize_component(collider, SphereParams::new(2.5)?.into())?;
//!
//!     host.register_system(Spin);
//!     host.run_frame(1.0 / 60.0);
//!     host.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod bridge;
pub mod config;
pub mod ecs;
pub mod foundation;
pub mod logging;

mod host;

pub use host::{HostError, ScriptingHost};

/// Common imports for hosts and script glue
pub mod prelude {
    pub use crate::{
        HostError, ScriptingHost,
        bridge::{
            BridgeError, BridgeVersion, NativeBridge, NativeCallOutcome, NullBridge,
            RecordingBridge, SharedBridge,
        },
        config::{Config, ConfigError, DeliveryMode, ScriptingConfig},
        ecs::{
            Component, ComponentError, ComponentId, EntityHandle,
            FnSystem, FrameReport, System, SystemFault, SystemId, SystemPriority, World,
            components::{
                BoxCollider, BoxParams, ComponentParams, ScriptValue, SphereCollider,
                SphereParams,
            },
        },
        foundation::{math::Vec3, time::Timer},
        logging::{ScriptLogger, Severity},
    };
}
