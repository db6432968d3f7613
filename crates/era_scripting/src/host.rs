//! Scripting host
//!
//! Owns the world and the scheduler and drives one frame per call. An
//! embedding application creates one host at startup, registers its systems,
//! and calls [`ScriptingHost::run_frame`] from its own main loop.

use std::io;

use thiserror::Error;

use crate::bridge::SharedBridge;
use crate::config::{ConfigError, ScriptingConfig};
use crate::ecs::components::{ColliderType, ComponentParams};
use crate::ecs::{
    ComponentError, ComponentId, ComponentKind, EntityHandle, FrameReport, System, SystemId, SystemScheduler, World,
};
use crate::logging::{self, ScriptLogger};

/// Main host struct
///
/// The host coordinates the world and the scheduler.
pub struct ScriptingHost {
    world: World,
    scheduler: SystemScheduler,
    config: ScriptingConfig,
}

impl ScriptingHost {
    /// Create a new host talking to the engine through `bridge`
    pub fn new(config: ScriptingConfig, bridge: SharedBridge) -> Result<Self, HostError> {
        log::info!("Initializing scripting host...");
        config.validate()?;

        let logger = ScriptLogger::from_config(bridge.clone(), &config.logging).map_err(HostError::LoggerSpawn)?;
        let world = World::new(bridge, logger);
        let scheduler = SystemScheduler::new(&config.scheduler);

        log::info!(
            "Scripting host ready (delivery {:?}, min severity {}, fault threshold {})",
            config.logging.delivery,
            config.logging.min_severity,
            scheduler.fault_threshold()
        );
        Ok(Self {
            world,
            scheduler,
            config,
        })
    }

    /// Load configuration from `path` and create a host
    pub fn from_config_file(path: &str, bridge: SharedBridge) -> Result<Self, HostError> {
        use crate::config::Config;

        let config = ScriptingConfig::load_from_file(path)?;
        Self::new(config, bridge)
    }

    /// Register a system
    pub fn register_system<S: System + 'static>(&mut self, system: S) -> SystemId {
        self.scheduler.register(system)
    }

    /// Remove a system
    pub fn unregister_system(&mut self, id: SystemId) -> Option<Box<dyn System>> {
        self.scheduler.unregister(id)
    }

    /// Run one frame
    pub fn run_frame(&mut self, delta_time: f32) -> FrameReport {
        self.scheduler.run_frame(&mut self.world, delta_time)
    }

    /// Run `frames` frames with a fixed delta, returning every report
    pub fn run_frames(&mut self, frames: usize, delta_time: f32) -> Vec<FrameReport> {
        (0..frames).map(|_| self.run_frame(delta_time)).collect()
    }

    /// Attach the collider `params` describe and initialize it
    ///
    /// The collider stays attached when initialization fails, so the caller
    /// can retry through the world with the same id.
    pub fn attach_collider(&mut self, entity: EntityHandle, params: ComponentParams) -> Result<ComponentId, HostError> {
        let id = match params.kind() {
            ComponentKind::Collider(ColliderType::Sphere) => self.world.attach_sphere_collider(entity)?,
            ComponentKind::Collider(ColliderType::Box) => self.world.attach_box_collider(entity)?,
        };
        self.world.initialize_component(id, params)?;
        Ok(id)
    }

    /// The engine destroyed `entity`
    pub fn notify_entity_destroyed(&mut self, entity: EntityHandle) {
        self.world.notify_entity_destroyed(entity);
    }

    /// The engine created `entity`, possibly reusing a destroyed handle
    pub fn notify_entity_created(&mut self, entity: EntityHandle) {
        self.world.notify_entity_created(entity);
    }

    /// Make this host's logger the process-wide script logger
    ///
    /// Returns `false` if another logger was installed first.
    pub fn install_global_logger(&self) -> bool {
        logging::install(self.world.logger().clone()).is_ok()
    }

    /// Flush pending script log messages
    pub fn shutdown(&mut self) {
        log::info!(
            "Scripting host shutdown after {} frame(s)",
            self.scheduler.frame_count()
        );
        self.world.logger().flush();
    }

    /// Get the world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Get the scheduler
    pub fn scheduler(&self) -> &SystemScheduler {
        &self.scheduler
    }

    /// Get the script logger
    pub fn logger(&self) -> &ScriptLogger {
        self.world.logger()
    }

    /// Get the configuration the host was built with
    pub fn config(&self) -> &ScriptingConfig {
        &self.config
    }
}

/// Host errors
#[derive(Error, Debug)]
pub enum HostError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Background log worker could not be started
    #[error("Failed to start script log worker: {0}")]
    LoggerSpawn(io::Error),

    /// Component setup failed
    #[error("Component error: {0}")]
    Component(#[from] ComponentError),
}
