//! Sandbox host
//!
//! Runs the scripting core against a recording stand-in for the native
//! engine: spawns a small asteroid field, attaches colliders, registers a few
//! demo systems and runs a fixed number of frames.
//!
//! Usage: `sandbox_host [config.toml|config.ron] [frames]`

mod systems;

use std::sync::Arc;
use std::time::Duration;

use era_scripting::bridge::RecordedCall;
use era_scripting::config::Config;
use era_scripting::prelude::*;
use rand::Rng;
use thiserror::Error;

use systems::{AsteroidLifetimeSystem, ColliderSetupSystem, DiagnosticsSystem, TrackingSystem};

const DEFAULT_FRAMES: usize = 300;
const FIXED_STEP: f64 = 1.0 / 60.0;
const ASTEROID_COUNT: usize = 6;
const ASTEROID_LIFETIME: f32 = 1.5;
const DIAGNOSTICS_EVERY: u64 = 60;

#[derive(Error, Debug)]
enum SandboxError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    #[error("Invalid frame count '{0}'")]
    FrameCount(String),
}

fn main() {
    let mut args = std::env::args().skip(1);
    let config_path = args.next();
    let frames = args.next();

    if let Err(err) = run(config_path.as_deref(), frames.as_deref()) {
        log::error!("Sandbox failed: {}", err);
        eprintln!("sandbox_host: {}", err);
        std::process::exit(1);
    }
}

fn run(config_path: Option<&str>, frames: Option<&str>) -> Result<(), SandboxError> {
    let config = match config_path {
        Some(path) => ScriptingConfig::load_from_file(path)?,
        None => ScriptingConfig::default(),
    };
    let frames = match frames {
        Some(text) => text
            .parse::<usize>()
            .map_err(|_| SandboxError::FrameCount(text.to_string()))?,
        None => DEFAULT_FRAMES,
    };

    era_scripting::foundation::logging::init_with_level(&config.engine.log_level);

    log::info!("Starting scripting sandbox ({} frames)", frames);

    let bridge = Arc::new(RecordingBridge::new());
    let mut host = ScriptingHost::new(config, bridge.clone())?;
    if !host.install_global_logger() {
        log::warn!("A script logger was already installed");
    }

    // Spawn the asteroid field with randomised radii, plus one cargo crate
    let mut rng = rand::thread_rng();
    let mut pending = Vec::new();
    let mut asteroids = Vec::with_capacity(ASTEROID_COUNT);
    for _ in 0..ASTEROID_COUNT {
        let asteroid = bridge.spawn_entity();
        let collider = host.world_mut().attach_sphere_collider(asteroid)?;
        let radius: f64 = rng.gen_range(0.5..3.0);
        pending.push((collider, vec![ScriptValue::Number(radius)]));
        asteroids.push(asteroid);
    }

    let cargo = bridge.spawn_entity();
    host.attach_collider(cargo, BoxParams::new(Vec3::new(1.0, 0.5, 2.0))?.into())?;

    // A script bug: the argument list is empty, so this collider never initializes
    let dud = bridge.spawn_entity();
    let dud_collider = host.world_mut().attach_sphere_collider(dud)?;
    pending.push((dud_collider, Vec::new()));

    // The last asteroid spawned is the first destroyed; the tracker follows it
    let tracked = pending[ASTEROID_COUNT - 1].0;

    host.register_system(ColliderSetupSystem::new(pending));
    host.register_system(TrackingSystem::new(tracked));
    host.register_system(AsteroidLifetimeSystem::new(
        bridge.clone(),
        asteroids,
        ASTEROID_LIFETIME,
    ));
    host.register_system(DiagnosticsSystem::new(DIAGNOSTICS_EVERY));

    let mut timer = Timer::new();
    let mut fault_count = 0;
    for _ in 0..frames {
        timer.advance(Duration::from_secs_f64(FIXED_STEP));
        let report = host.run_frame(timer.delta_time());

        fault_count += report.faults.len();
        for id in &report.escalated {
            log::warn!("Frame {}: {} removed after repeated faults", report.frame, id);
        }
    }

    let removed = host.world_mut().remove_disposed();
    era_scripting::logging::log(&format!("Sandbox finished, {} disposed collider(s) removed", removed));
    host.shutdown();

    let colliders = bridge.calls().iter().filter(|call| call.is_collider()).count();
    let messages = bridge
        .calls()
        .iter()
        .filter(|call| matches!(call, RecordedCall::LogMessage { .. }))
        .count();
    log::info!(
        "Ran {} frame(s) over {:.2}s simulated: {} system(s) left, {} fault(s), {} native collider call(s), {} script log message(s)",
        timer.frame_count(),
        timer.total_time(),
        host.scheduler().len(),
        fault_count,
        colliders,
        messages
    );
    Ok(())
}
