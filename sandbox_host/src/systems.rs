//! Demo systems driven by the sandbox frame loop

use std::sync::Arc;

use era_scripting::prelude::*;

/// Initializes colliders queued with script-style argument lists
///
/// Runs at high priority so every collider is ready before gameplay systems
/// look at it.
pub struct ColliderSetupSystem {
    pending: Vec<(ComponentId, Vec<ScriptValue>)>,
}

impl ColliderSetupSystem {
    pub fn new(pending: Vec<(ComponentId, Vec<ScriptValue>)>) -> Self {
        Self { pending }
    }
}

impl System for ColliderSetupSystem {
    fn name(&self) -> &str {
        "collider_setup"
    }

    fn priority(&self) -> SystemPriority {
        SystemPriority::High
    }

    fn update(&mut self, world: &mut World, _delta_time: f32) -> Result<(), SystemFault> {
        for (id, args) in self.pending.drain(..) {
            // Failures are already logged by the component; keep going with the rest
            if let Err(err) = world.initialize_component_with_args(id, &args) {
                log::debug!("Collider {:?} left uninitialized: {}", id, err);
            }
        }
        Ok(())
    }
}

/// Destroys one asteroid every `interval` seconds of simulated time
pub struct AsteroidLifetimeSystem {
    bridge: Arc<RecordingBridge>,
    asteroids: Vec<EntityHandle>,
    interval: f32,
    elapsed: f32,
}

impl AsteroidLifetimeSystem {
    pub fn new(bridge: Arc<RecordingBridge>, asteroids: Vec<EntityHandle>, interval: f32) -> Self {
        Self {
            bridge,
            asteroids,
            interval,
            elapsed: 0.0,
        }
    }
}

impl System for AsteroidLifetimeSystem {
    fn name(&self) -> &str {
        "asteroid_lifetime"
    }

    fn update(&mut self, world: &mut World, delta_time: f32) -> Result<(), SystemFault> {
        self.elapsed += delta_time;
        if self.elapsed < self.interval {
            return Ok(());
        }
        self.elapsed -= self.interval;

        if let Some(asteroid) = self.asteroids.pop() {
            self.bridge.destroy_entity(asteroid);
            world.notify_entity_destroyed(asteroid);
            world.logger().log(format!("Asteroid {} broke apart", asteroid));
        }
        Ok(())
    }
}

/// Follows a collider and asks for it every frame for its collider
///
/// Faults every frame once its target is gone, which exercises fault
/// isolation and escalation.
pub struct TrackingSystem {
    target: ComponentId,
}

impl TrackingSystem {
    pub fn new(target: ComponentId) -> Self {
        Self { target }
    }
}

impl System for TrackingSystem {
    fn name(&self) -> &str {
        "tracking"
    }

    fn update(&mut self, world: &mut World, _delta_time: f32) -> Result<(), SystemFault> {
        let sphere = world
            .get::<SphereCollider>(self.target)
            .map_err(|err| SystemFault::new(err.to_string()))?;
        match sphere.radius() {
            Ok(_) => Ok(()),
            Err(ComponentError::NotInitialized) => Ok(()),
            Err(err) => Err(SystemFault::new(format!("lost target: {}", err))),
        }
    }
}

/// Periodic summary of collider state
pub struct DiagnosticsSystem {
    every_frames: u64,
    frame: u64,
}

impl DiagnosticsSystem {
    pub fn new(every_frames: u64) -> Self {
        Self {
            every_frames: every_frames.max(1),
            frame: 0,
        }
    }
}

impl System for DiagnosticsSystem {
    fn name(&self) -> &str {
        "diagnostics"
    }

    fn priority(&self) -> SystemPriority {
        SystemPriority::Low
    }

    fn update(&mut self, world: &mut World, _delta_time: f32) -> Result<(), SystemFault> {
        self.frame += 1;
        if self.frame % self.every_frames != 0 {
            return Ok(());
        }

        let ready_spheres = world.query::<SphereCollider>().filter(|(_, c)| c.radius().is_ok()).count();
        let ready_boxes = world.query::<BoxCollider>().filter(|(_, c)| c.half_extents().is_ok()).count();
        world.logger().log(format!(
            "Frame {}: {} sphere(s) and {} box(es) ready, {} native call(s)",
            self.frame,
            ready_spheres,
            ready_boxes,
            world.native_calls()
        ));
        Ok(())
    }
}
