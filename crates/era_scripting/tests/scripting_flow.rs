//! End-to-end frame loop through the public API

use std::sync::{Arc, Mutex};

use era_scripting::bridge::{BridgeError, RecordedCall};
use era_scripting::config::{Config, LoggingConfig};
use era_scripting::ecs::ComponentState;
use era_scripting::prelude::*;

type Trace = Arc<Mutex<Vec<&'static str>>>;

fn tracer(name: &'static str, priority: SystemPriority, trace: &Trace) -> impl System {
    let trace = trace.clone();
    FnSystem::new(name, priority, move |_: &mut World, _| {
        trace.lock().unwrap().push(name);
        Ok(())
    })
}

#[test]
fn test_priorities_then_registration_order() {
    let bridge = Arc::new(RecordingBridge::new());
    let mut host = ScriptingHost::new(ScriptingConfig::default(), bridge).unwrap();
    let trace = Trace::default();

    host.register_system(tracer("A", SystemPriority::High, &trace));
    host.register_system(tracer("B", SystemPriority::Low, &trace));
    host.register_system(tracer("C", SystemPriority::High, &trace));
    host.register_system(tracer("D", SystemPriority::Normal, &trace));

    host.run_frames(3, 1.0 / 60.0);

    assert_eq!(
        *trace.lock().unwrap(),
        vec!["A", "C", "D", "B", "A", "C", "D", "B", "A", "C", "D", "B"]
    );
}

#[test]
fn test_colliders_created_from_systems() {
    let bridge = Arc::new(RecordingBridge::new());
    let ship = bridge.spawn_entity();
    let crate_entity = bridge.spawn_entity();
    let mut host = ScriptingHost::new(ScriptingConfig::default(), bridge.clone()).unwrap();

    let sphere = host.world_mut().attach_sphere_collider(ship).unwrap();
    let cuboid = host.world_mut().attach_box_collider(crate_entity).unwrap();
    host.register_system(FnSystem::new(
        "collider-setup",
        SystemPriority::High,
        move |world: &mut World, _| {
            if world.component(sphere).map(|c| c.state()) == Some(ComponentState::Uninitialized) {
                world
                    .initialize_component_with_args(sphere, &[ScriptValue::Number(2.5)])
                    .map_err(|err| SystemFault::new(err.to_string()))?;
                world
                    .initialize_component(cuboid, BoxParams::cube(0.5).map_err(|err| SystemFault::new(err.to_string()))?.into())
                    .map_err(|err| SystemFault::new(err.to_string()))?;
            }
            Ok(())
        },
    ));

    let reports = host.run_frames(2, 0.016);

    assert!(reports.iter().all(FrameReport::is_clean));
    assert_eq!(
        bridge.collider_calls(),
        vec![
            RecordedCall::SphereCollider { entity: ship, radius: 2.5 },
            RecordedCall::BoxCollider {
                entity: crate_entity,
                half_extents: Vec3::new(0.5, 0.5, 0.5),
            },
        ]
    );
    let radius = host.world().get::<SphereCollider>(sphere).unwrap().radius().unwrap();
    assert!((radius - 2.5).abs() < f32::EPSILON);
}

#[test]
fn test_stale_handle_is_reported_not_fatal() {
    let bridge = Arc::new(RecordingBridge::new());
    let ghost = bridge.spawn_entity();
    bridge.destroy_entity(ghost);
    let mut host = ScriptingHost::new(ScriptingConfig::default(), bridge.clone()).unwrap();

    let id = host.world_mut().attach_sphere_collider(ghost).unwrap();
    let result = host
        .world_mut()
        .initialize_component(id, SphereParams::new(1.0).unwrap().into());

    assert!(matches!(
        result,
        Err(ComponentError::Native(BridgeError::StaleHandle { .. }))
    ));
    assert_eq!(
        host.world().component(id).unwrap().state(),
        ComponentState::Uninitialized
    );
    assert!(bridge
        .log_messages()
        .iter()
        .any(|(severity, _)| *severity == Severity::Error));
}

#[test]
fn test_destroyed_mid_frame_disposes_at_frame_end() {
    let bridge = Arc::new(RecordingBridge::new());
    let rock = bridge.spawn_entity();
    let mut host = ScriptingHost::new(ScriptingConfig::default(), bridge.clone()).unwrap();
    let id = host.world_mut().attach_sphere_collider(rock).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let destroyer_seen = seen.clone();
    host.register_system(FnSystem::new("destroyer", SystemPriority::High, move |world: &mut World, _| {
        world.notify_entity_destroyed(rock);
        destroyer_seen.lock().unwrap().push(world.component(id).map(|c| c.state()));
        Ok(())
    }));
    let reader_seen = seen.clone();
    host.register_system(FnSystem::new("reader", SystemPriority::Low, move |world: &mut World, _| {
        reader_seen.lock().unwrap().push(world.component(id).map(|c| c.state()));
        Ok(())
    }));

    host.run_frame(0.016);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some(ComponentState::Uninitialized), Some(ComponentState::Uninitialized)]
    );
    assert_eq!(host.world().component(id).unwrap().state(), ComponentState::Disposed);
    assert!(host.world().is_entity_destroyed(rock));
}

#[test]
fn test_host_from_config_file() {
    let mut path = std::env::temp_dir();
    path.push(format!("era_scripting_flow_{}.toml", std::process::id()));
    let path = path.to_string_lossy().into_owned();

    let config = ScriptingConfig {
        logging: LoggingConfig::new()
            .with_min_severity(Severity::Warning)
            .with_background_delivery(64),
        ..ScriptingConfig::default()
    };
    config.save_to_file(&path).unwrap();

    let bridge = Arc::new(RecordingBridge::new());
    let mut host = ScriptingHost::from_config_file(&path, bridge.clone()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(host.config(), &config);
    host.logger().log("filtered out");
    host.logger().error("kept");
    host.shutdown();

    assert_eq!(bridge.log_messages(), vec![(Severity::Error, "kept".to_string())]);
}
