//! Collider components
//!
//! Colliders mirror the shape parameters of a native physics collider. The
//! native engine owns the actual shape; these components only ask for it to
//! be created and remember what they asked for. Mirrored values are never
//! re-synced: if the engine mutates the shape later, callers must re-query.

use std::any::Any;

use serde::{Deserialize, Serialize};

use super::params::ComponentParams;
use crate::bridge::{BridgeResult, NativeCall, NativeCallOutcome};
use crate::ecs::component::{Component, ComponentError, ComponentKind, ComponentState, InitContext};
use crate::ecs::EntityHandle;
use crate::foundation::math::Vec3;

/// Collider shape discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderType {
    /// Sphere defined by a radius
    Sphere,
    /// Axis-aligned box defined by half extents
    Box,
}

/// Settle a shape call: advance the lifecycle and report the outcome
///
/// Unconfirmed calls are assumed to have succeeded and logged at Warning.
/// Bridge errors leave the component uninitialized and are logged at Error.
fn finish_shape_call(
    state: &mut ComponentState,
    result: BridgeResult,
    call: NativeCall,
    entity: EntityHandle,
    ctx: &InitContext<'_>,
) -> Result<NativeCallOutcome, ComponentError> {
    match result {
        Ok(outcome) => {
            *state = ComponentState::Ready;
            if !outcome.is_confirmed() {
                ctx.logger.warning(format!(
                    "{} for entity {}: native outcome unconfirmed, assuming success",
                    call, entity
                ));
            }
            Ok(outcome)
        }
        Err(err) => {
            ctx.logger.error(format!("{} for entity {} failed: {}", call, entity, err));
            Err(ComponentError::Native(err))
        }
    }
}

fn wrong_params(expected: ColliderType, params: &ComponentParams) -> ComponentError {
    ComponentError::Argument(format!(
        "{:?} collider cannot be initialized with {:?} parameters",
        expected,
        params.kind()
    ))
}

/// Sphere collider
#[derive(Debug, Clone)]
pub struct SphereCollider {
    entity: EntityHandle,
    state: ComponentState,
    radius: Option<f32>,
}

impl SphereCollider {
    /// Attach an uninitialized sphere collider to `entity`
    pub const fn new(entity: EntityHandle) -> Self {
        Self {
            entity,
            state: ComponentState::Uninitialized,
            radius: None,
        }
    }

    /// Radius last sent to the engine
    pub fn radius(&self) -> Result<f32, ComponentError> {
        self.state.ensure_ready()?;
        self.radius.ok_or(ComponentError::NotInitialized)
    }

    /// Shape discriminator
    pub const fn collider_type(&self) -> ColliderType {
        ColliderType::Sphere
    }
}

impl Component for SphereCollider {
    fn entity(&self) -> EntityHandle {
        self.entity
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Collider(ColliderType::Sphere)
    }

    fn state(&self) -> ComponentState {
        self.state
    }

    fn initialize(
        &mut self,
        params: ComponentParams,
        ctx: &InitContext<'_>,
    ) -> Result<NativeCallOutcome, ComponentError> {
        self.state.ensure_uninitialized()?;
        let radius = match params {
            ComponentParams::Sphere(sphere) => sphere.radius(),
            other @ ComponentParams::Box(_) => return Err(wrong_params(ColliderType::Sphere, &other)),
        };

        let result = ctx.bridge.initialize_sphere_collider(self.entity, radius);
        let outcome = finish_shape_call(
            &mut self.state,
            result,
            NativeCall::InitializeSphereCollider,
            self.entity,
            ctx,
        )?;
        self.radius = Some(radius);
        Ok(outcome)
    }

    fn dispose(&mut self) {
        self.state = ComponentState::Disposed;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Box collider
#[derive(Debug, Clone)]
pub struct BoxCollider {
    entity: EntityHandle,
    state: ComponentState,
    half_extents: Option<Vec3>,
}

impl BoxCollider {
    /// Attach an uninitialized box collider to `entity`
    pub const fn new(entity: EntityHandle) -> Self {
        Self {
            entity,
            state: ComponentState::Uninitialized,
            half_extents: None,
        }
    }

    /// Half extents last sent to the engine
    pub fn half_extents(&self) -> Result<Vec3, ComponentError> {
        self.state.ensure_ready()?;
        self.half_extents.ok_or(ComponentError::NotInitialized)
    }

    /// Shape discriminator
    pub const fn collider_type(&self) -> ColliderType {
        ColliderType::Box
    }
}

impl Component for BoxCollider {
    fn entity(&self) -> EntityHandle {
        self.entity
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Collider(ColliderType::Box)
    }

    fn state(&self) -> ComponentState {
        self.state
    }

    fn initialize(
        &mut self,
        params: ComponentParams,
        ctx: &InitContext<'_>,
    ) -> Result<NativeCallOutcome, ComponentError> {
        self.state.ensure_uninitialized()?;
        let half_extents = match params {
            ComponentParams::Box(cuboid) => cuboid.half_extents(),
            other @ ComponentParams::Sphere(_) => return Err(wrong_params(ColliderType::Box, &other)),
        };

        let result = ctx.bridge.initialize_box_collider(self.entity, half_extents);
        let outcome = finish_shape_call(
            &mut self.state,
            result,
            NativeCall::InitializeBoxCollider,
            self.entity,
            ctx,
        )?;
        self.half_extents = Some(half_extents);
        Ok(outcome)
    }

    fn dispose(&mut self) {
        self.state = ComponentState::Disposed;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{BridgeError, RecordedCall, RecordingBridge, SharedBridge};
    use crate::ecs::components::{BoxParams, ScriptValue, SphereParams};
    use crate::logging::{ScriptLogger, Severity};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    struct Fixture {
        bridge: Arc<RecordingBridge>,
        logger: ScriptLogger,
    }

    impl Fixture {
        fn new(bridge: RecordingBridge) -> Self {
            let bridge = Arc::new(bridge);
            let shared: SharedBridge = bridge.clone();
            Self {
                logger: ScriptLogger::immediate(shared, Severity::Normal),
                bridge,
            }
        }

        fn ctx(&self) -> InitContext<'_> {
            InitContext {
                bridge: self.bridge.as_ref(),
                logger: &self.logger,
            }
        }
    }

    #[test]
    fn test_sphere_empty_args_issue_no_native_call() {
        let fx = Fixture::new(RecordingBridge::new());
        let mut sphere = SphereCollider::new(fx.bridge.spawn_entity());

        let result = sphere.initialize_with_args(&[], &fx.ctx());

        assert!(matches!(result, Err(ComponentError::Argument(_))));
        assert_eq!(sphere.state(), ComponentState::Uninitialized);
        assert!(fx.bridge.collider_calls().is_empty());
    }

    #[test]
    fn test_sphere_initialize_records_radius_and_calls_once() {
        let fx = Fixture::new(RecordingBridge::new());
        let entity = fx.bridge.spawn_entity();
        let mut sphere = SphereCollider::new(entity);

        let outcome = sphere.initialize_with_args(&[ScriptValue::Number(2.5)], &fx.ctx()).unwrap();

        assert_eq!(outcome, NativeCallOutcome::Confirmed);
        assert_eq!(sphere.state(), ComponentState::Ready);
        assert_relative_eq!(sphere.radius().unwrap(), 2.5);
        assert_eq!(sphere.collider_type(), ColliderType::Sphere);
        assert_eq!(
            fx.bridge.collider_calls(),
            vec![RecordedCall::SphereCollider { entity, radius: 2.5 }]
        );
    }

    #[test]
    fn test_second_initialize_is_rejected() {
        let fx = Fixture::new(RecordingBridge::new());
        let mut sphere = SphereCollider::new(fx.bridge.spawn_entity());
        let params = ComponentParams::Sphere(SphereParams::new(1.0).unwrap());

        sphere.initialize(params, &fx.ctx()).unwrap();
        let second = sphere.initialize(params, &fx.ctx());
        let third = sphere.initialize_with_args(&[], &fx.ctx());

        assert_eq!(second, Err(ComponentError::AlreadyInitialized));
        assert_eq!(third, Err(ComponentError::AlreadyInitialized));
        assert_eq!(fx.bridge.collider_calls().len(), 1);
    }

    #[test]
    fn test_disposed_component_refuses_everything() {
        let fx = Fixture::new(RecordingBridge::new());
        let mut sphere = SphereCollider::new(fx.bridge.spawn_entity());
        sphere.initialize_with_args(&[ScriptValue::Number(1.0)], &fx.ctx()).unwrap();

        sphere.dispose();

        assert_eq!(sphere.state(), ComponentState::Disposed);
        assert_eq!(sphere.radius(), Err(ComponentError::Disposed));
        assert_eq!(
            sphere.initialize_with_args(&[ScriptValue::Number(1.0)], &fx.ctx()),
            Err(ComponentError::Disposed)
        );
        assert_eq!(fx.bridge.collider_calls().len(), 1);
    }

    #[test]
    fn test_stale_handle_leaves_component_uninitialized() {
        let fx = Fixture::new(RecordingBridge::new());
        let entity = fx.bridge.spawn_entity();
        fx.bridge.destroy_entity(entity);
        let mut sphere = SphereCollider::new(entity);

        let result = sphere.initialize_with_args(&[ScriptValue::Number(3.0)], &fx.ctx());

        assert_eq!(
            result,
            Err(ComponentError::Native(BridgeError::StaleHandle {
                call: NativeCall::InitializeSphereCollider,
                entity,
            }))
        );
        assert_eq!(sphere.state(), ComponentState::Uninitialized);
        assert_eq!(sphere.radius(), Err(ComponentError::NotInitialized));
        let errors: Vec<_> = fx
            .bridge
            .log_messages()
            .into_iter()
            .filter(|(severity, _)| *severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_unconfirmed_call_assumes_success_and_warns() {
        let fx = Fixture::new(RecordingBridge::legacy());
        let mut sphere = SphereCollider::new(EntityHandle::from_raw(5));

        let outcome = sphere.initialize_with_args(&[ScriptValue::Number(0.5)], &fx.ctx()).unwrap();

        assert_eq!(outcome, NativeCallOutcome::Unconfirmed);
        assert_eq!(sphere.state(), ComponentState::Ready);
        let warnings: Vec<_> = fx
            .bridge
            .log_messages()
            .into_iter()
            .filter(|(severity, _)| *severity == Severity::Warning)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].1.contains("unconfirmed"));
    }

    #[test]
    fn test_mismatched_params_are_argument_errors() {
        let fx = Fixture::new(RecordingBridge::new());
        let entity = fx.bridge.spawn_entity();
        let mut sphere = SphereCollider::new(entity);
        let mut cuboid = BoxCollider::new(entity);

        let sphere_result = sphere.initialize(BoxParams::cube(1.0).unwrap().into(), &fx.ctx());
        let box_result = cuboid.initialize(SphereParams::new(1.0).unwrap().into(), &fx.ctx());

        assert!(matches!(sphere_result, Err(ComponentError::Argument(_))));
        assert!(matches!(box_result, Err(ComponentError::Argument(_))));
        assert!(fx.bridge.collider_calls().is_empty());
    }

    #[test]
    fn test_box_initialize() {
        let fx = Fixture::new(RecordingBridge::new());
        let entity = fx.bridge.spawn_entity();
        let mut cuboid = BoxCollider::new(entity);
        let args = [ScriptValue::Number(1.0), ScriptValue::Number(2.0), ScriptValue::Number(0.5)];

        cuboid.initialize_with_args(&args, &fx.ctx()).unwrap();

        let expected = Vec3::new(1.0, 2.0, 0.5);
        assert_eq!(cuboid.half_extents().unwrap(), expected);
        assert_eq!(cuboid.kind(), ComponentKind::Collider(ColliderType::Box));
        assert_eq!(
            fx.bridge.collider_calls(),
            vec![RecordedCall::BoxCollider { entity, half_extents: expected }]
        );
    }
}
