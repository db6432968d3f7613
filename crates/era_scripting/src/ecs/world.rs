//! ECS World implementation
//!
//! The world is the scripting side's entity table: which components are
//! attached to which native entity, which entities the engine has destroyed,
//! and the queue of commands deferred until the current frame ends.
//!
//! Entity lifetime belongs to the engine. The world only learns about
//! destruction through [`World::notify_entity_destroyed`]; a notification
//! that arrives while a frame is running is queued and applied once the last
//! system has finished, so systems never see the table change under them.
//!
//! The engine may hand out a destroyed handle again. A handle stays refused
//! until either [`World::remove_disposed`] drops its components or the engine
//! reports the reuse through [`World::notify_entity_created`].

use std::collections::{HashMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};

use slotmap::SlotMap;

use super::component::{Component, ComponentError, ComponentState, InitContext};
use super::components::{BoxCollider, ComponentParams, ScriptValue, SphereCollider};
use super::scheduler::panic_message;
use super::EntityHandle;
use crate::bridge::{NativeCallOutcome, SharedBridge};
use crate::logging::ScriptLogger;

slotmap::new_key_type! {
    /// Generational id of an attached component
    pub struct ComponentId;
}

/// Work queued for the end of the current frame
pub type DeferredCommand = Box<dyn FnOnce(&mut World) + Send>;

/// ECS World containing the entity table and attached components
pub struct World {
    bridge: SharedBridge,
    logger: ScriptLogger,
    components: SlotMap<ComponentId, Box<dyn Component>>,
    by_entity: HashMap<EntityHandle, Vec<ComponentId>>,
    destroyed: HashSet<EntityHandle>,
    deferred: Vec<DeferredCommand>,
    in_frame: bool,
    native_calls: u64,
}

impl World {
    /// Create a new world talking to the engine through `bridge`
    pub fn new(bridge: SharedBridge, logger: ScriptLogger) -> Self {
        Self {
            bridge,
            logger,
            components: SlotMap::with_key(),
            by_entity: HashMap::new(),
            destroyed: HashSet::new(),
            deferred: Vec::new(),
            in_frame: false,
            native_calls: 0,
        }
    }

    /// Bridge to the native engine
    pub fn bridge(&self) -> &SharedBridge {
        &self.bridge
    }

    /// Script logging facade
    pub fn logger(&self) -> &ScriptLogger {
        &self.logger
    }

    /// Attach a component to the entity it names
    ///
    /// Fails with [`ComponentError::Disposed`] if the engine already destroyed
    /// that entity.
    pub fn attach<C: Component>(&mut self, component: C) -> Result<ComponentId, ComponentError> {
        let entity = component.entity();
        if self.destroyed.contains(&entity) {
            return Err(ComponentError::Disposed);
        }
        let id = self.components.insert(Box::new(component));
        self.by_entity.entry(entity).or_default().push(id);
        log::trace!("Attached component {:?} to entity {}", id, entity);
        Ok(id)
    }

    /// Attach an uninitialized sphere collider
    pub fn attach_sphere_collider(&mut self, entity: EntityHandle) -> Result<ComponentId, ComponentError> {
        self.attach(SphereCollider::new(entity))
    }

    /// Attach an uninitialized box collider
    pub fn attach_box_collider(&mut self, entity: EntityHandle) -> Result<ComponentId, ComponentError> {
        self.attach(BoxCollider::new(entity))
    }

    /// Initialize a component from typed parameters
    pub fn initialize_component(
        &mut self,
        id: ComponentId,
        params: ComponentParams,
    ) -> Result<NativeCallOutcome, ComponentError> {
        self.initialize_with(id, |component, ctx| component.initialize(params, ctx))
    }

    /// Initialize a component from a script argument list
    pub fn initialize_component_with_args(
        &mut self,
        id: ComponentId,
        args: &[ScriptValue],
    ) -> Result<NativeCallOutcome, ComponentError> {
        self.initialize_with(id, |component, ctx| component.initialize_with_args(args, ctx))
    }

    fn initialize_with<F>(&mut self, id: ComponentId, init: F) -> Result<NativeCallOutcome, ComponentError>
    where
        F: FnOnce(&mut Box<dyn Component>, &InitContext<'_>) -> Result<NativeCallOutcome, ComponentError>,
    {
        let component = self.components.get_mut(id).ok_or(ComponentError::UnknownComponent)?;
        let ctx = InitContext {
            bridge: self.bridge.as_ref(),
            logger: &self.logger,
        };
        let result = init(component, &ctx);
        if matches!(result, Ok(_) | Err(ComponentError::Native(_))) {
            self.native_calls += 1;
        }
        result
    }

    /// Any attached component
    pub fn component(&self, id: ComponentId) -> Option<&dyn Component> {
        self.components.get(id).map(|component| &**component)
    }

    /// Typed access to a component
    pub fn get<T: Component>(&self, id: ComponentId) -> Result<&T, ComponentError> {
        let component = self.components.get(id).ok_or(ComponentError::UnknownComponent)?;
        component
            .as_any()
            .downcast_ref::<T>()
            .ok_or(ComponentError::WrongType { actual: component.kind() })
    }

    /// Typed mutable access to a component
    pub fn get_mut<T: Component>(&mut self, id: ComponentId) -> Result<&mut T, ComponentError> {
        let component = self.components.get_mut(id).ok_or(ComponentError::UnknownComponent)?;
        let actual = component.kind();
        component
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(ComponentError::WrongType { actual })
    }

    /// Iterate every component of type `T`
    pub fn query<T: Component>(&self) -> impl Iterator<Item = (ComponentId, &T)> {
        self.components
            .iter()
            .filter_map(|(id, component)| component.as_any().downcast_ref::<T>().map(|c| (id, c)))
    }

    /// Components attached to `entity`, in attach order
    pub fn components_of(&self, entity: EntityHandle) -> &[ComponentId] {
        self.by_entity.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of attached components, disposed ones included
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Native initialization calls issued through this world
    ///
    /// Calls the engine refused (stale handle, rejected status) are counted
    /// too; calls that failed validation before reaching the bridge are not.
    pub fn native_calls(&self) -> u64 {
        self.native_calls
    }

    /// The engine destroyed `entity`; dispose everything attached to it
    ///
    /// Applied immediately between frames, deferred to the end of the frame
    /// otherwise.
    pub fn notify_entity_destroyed(&mut self, entity: EntityHandle) {
        if self.in_frame {
            log::debug!("Entity {} destroyed mid-frame, deferring disposal", entity);
            self.defer(move |world| world.dispose_entity(entity));
        } else {
            self.dispose_entity(entity);
        }
    }

    fn dispose_entity(&mut self, entity: EntityHandle) {
        if !self.destroyed.insert(entity) {
            return;
        }
        let ids = self.by_entity.get(&entity).cloned().unwrap_or_default();
        for id in &ids {
            if let Some(component) = self.components.get_mut(*id) {
                component.dispose();
            }
        }
        log::debug!("Entity {} destroyed, disposed {} component(s)", entity, ids.len());
    }

    /// The engine created `entity`, possibly reusing a destroyed handle
    ///
    /// Components still held for the previous owner of the handle are
    /// dropped and the handle accepts attachments again. Deferred to the end
    /// of the frame like destruction, so the two keep their order.
    pub fn notify_entity_created(&mut self, entity: EntityHandle) {
        if self.in_frame {
            self.defer(move |world| world.reset_entity(entity));
        } else {
            self.reset_entity(entity);
        }
    }

    fn reset_entity(&mut self, entity: EntityHandle) {
        if !self.destroyed.remove(&entity) {
            return;
        }
        let ids = self.by_entity.remove(&entity).unwrap_or_default();
        for id in &ids {
            self.components.remove(*id);
        }
        log::debug!("Entity handle {} reused, dropped {} stale component(s)", entity, ids.len());
    }

    /// Whether the engine reported `entity` as destroyed
    pub fn is_entity_destroyed(&self, entity: EntityHandle) -> bool {
        self.destroyed.contains(&entity)
    }

    /// Drop disposed components from the table; their ids become unknown
    ///
    /// Destroyed handles are forgotten as well, so the engine may reuse them.
    pub fn remove_disposed(&mut self) -> usize {
        let before = self.components.len();
        self.components
            .retain(|_, component| component.state() != ComponentState::Disposed);
        for ids in self.by_entity.values_mut() {
            ids.retain(|id| self.components.contains_key(*id));
        }
        self.by_entity.retain(|_, ids| !ids.is_empty());
        self.destroyed.clear();
        before - self.components.len()
    }

    /// Queue work for the end of the current frame
    ///
    /// Commands queued between frames run at the end of the next frame.
    /// Commands queued by a deferred command also wait for the next frame.
    pub fn defer(&mut self, command: impl FnOnce(&mut Self) + Send + 'static) {
        self.deferred.push(Box::new(command));
    }

    /// Number of commands waiting for the end of the frame
    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Whether a frame is currently running
    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    pub(crate) fn begin_frame(&mut self) {
        self.in_frame = true;
    }

    /// Leave the frame and run the deferred queue
    ///
    /// A panicking command is logged and skipped; the rest still run.
    /// Returns how many commands panicked.
    pub(crate) fn end_frame(&mut self) -> usize {
        self.in_frame = false;
        let commands = std::mem::take(&mut self.deferred);
        let mut failed = 0;
        for command in commands {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| command(self))) {
                failed += 1;
                self.logger
                    .error(format!("Deferred command panicked: {}", panic_message(payload.as_ref())));
            }
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RecordingBridge;
    use crate::ecs::components::SphereParams;
    use crate::logging::Severity;
    use std::sync::Arc;

    fn world() -> (Arc<RecordingBridge>, World) {
        let bridge = Arc::new(RecordingBridge::new());
        let shared: SharedBridge = bridge.clone();
        let logger = ScriptLogger::immediate(shared.clone(), Severity::Normal);
        (bridge, World::new(shared, logger))
    }

    #[test]
    fn test_attach_and_initialize_sphere() {
        let (bridge, mut world) = world();
        let entity = bridge.spawn_entity();
        let id = world.attach_sphere_collider(entity).unwrap();

        world.initialize_component_with_args(id, &[ScriptValue::Number(2.5)]).unwrap();

        let sphere = world.get::<SphereCollider>(id).unwrap();
        assert!((sphere.radius().unwrap() - 2.5).abs() < f32::EPSILON);
        assert_eq!(world.components_of(entity), &[id]);
        assert_eq!(world.native_calls(), 1);
    }

    #[test]
    fn test_failed_validation_is_not_a_native_call() {
        let (bridge, mut world) = world();
        let id = world.attach_sphere_collider(bridge.spawn_entity()).unwrap();

        assert!(world.initialize_component_with_args(id, &[]).is_err());
        assert_eq!(world.native_calls(), 0);
        assert!(bridge.collider_calls().is_empty());
    }

    #[test]
    fn test_typed_access_checks_kind() {
        let (bridge, mut world) = world();
        let id = world.attach_box_collider(bridge.spawn_entity()).unwrap();

        assert!(world.get::<BoxCollider>(id).is_ok());
        assert!(matches!(
            world.get::<SphereCollider>(id),
            Err(ComponentError::WrongType { .. })
        ));
        assert!(world.get_mut::<BoxCollider>(id).is_ok());
    }

    #[test]
    fn test_destroyed_entity_disposes_components() {
        let (bridge, mut world) = world();
        let entity = bridge.spawn_entity();
        let sphere = world.attach_sphere_collider(entity).unwrap();
        let cuboid = world.attach_box_collider(entity).unwrap();
        world
            .initialize_component(sphere, SphereParams::new(1.0).unwrap().into())
            .unwrap();

        world.notify_entity_destroyed(entity);

        assert!(world.is_entity_destroyed(entity));
        assert_eq!(world.component(sphere).unwrap().state(), ComponentState::Disposed);
        assert_eq!(world.component(cuboid).unwrap().state(), ComponentState::Disposed);
        assert_eq!(
            world.initialize_component_with_args(cuboid, &[ScriptValue::Number(1.0)]),
            Err(ComponentError::Disposed)
        );
        assert_eq!(world.attach_sphere_collider(entity), Err(ComponentError::Disposed));
        assert_eq!(bridge.collider_calls().len(), 1);
    }

    #[test]
    fn test_destruction_during_frame_is_deferred() {
        let (bridge, mut world) = world();
        let entity = bridge.spawn_entity();
        let id = world.attach_sphere_collider(entity).unwrap();

        world.begin_frame();
        world.notify_entity_destroyed(entity);
        assert!(!world.is_entity_destroyed(entity));
        assert_eq!(world.component(id).unwrap().state(), ComponentState::Uninitialized);
        world.end_frame();

        assert!(world.is_entity_destroyed(entity));
        assert_eq!(world.component(id).unwrap().state(), ComponentState::Disposed);
    }

    #[test]
    fn test_deferred_commands_run_once_at_frame_end() {
        let (bridge, mut world) = world();
        let entity = bridge.spawn_entity();

        world.defer(move |w| {
            w.attach_sphere_collider(entity).unwrap();
            w.defer(move |w| {
                w.attach_box_collider(entity).unwrap();
            });
        });
        assert_eq!(world.pending_deferred(), 1);

        world.begin_frame();
        world.end_frame();
        assert_eq!(world.components_of(entity).len(), 1);
        assert_eq!(world.pending_deferred(), 1);

        world.begin_frame();
        world.end_frame();
        assert_eq!(world.components_of(entity).len(), 2);
        assert_eq!(world.pending_deferred(), 0);
    }

    #[test]
    fn test_panicking_deferred_command_does_not_stop_the_queue() {
        let (bridge, mut world) = world();
        let entity = bridge.spawn_entity();

        world.defer(|_| panic!("deferred boom"));
        world.defer(move |w| {
            w.attach_sphere_collider(entity).unwrap();
        });

        world.begin_frame();
        let failed = world.end_frame();

        assert_eq!(failed, 1);
        assert!(!world.in_frame());
        assert_eq!(world.components_of(entity).len(), 1);
        assert!(bridge
            .log_messages()
            .iter()
            .any(|(severity, message)| *severity == Severity::Error && message.contains("deferred boom")));
    }

    #[test]
    fn test_handle_reusable_after_remove_disposed() {
        let (_bridge, mut world) = world();
        let handle = EntityHandle::from_raw(5);
        world.attach_sphere_collider(handle).unwrap();

        world.notify_entity_destroyed(handle);
        assert_eq!(world.attach_sphere_collider(handle), Err(ComponentError::Disposed));
        world.remove_disposed();

        assert!(!world.is_entity_destroyed(handle));
        let fresh = world.attach_sphere_collider(handle).unwrap();
        assert_eq!(world.components_of(handle), &[fresh]);
    }

    #[test]
    fn test_created_notification_reopens_handle() {
        let (_bridge, mut world) = world();
        let handle = EntityHandle::from_raw(7);
        let old = world.attach_box_collider(handle).unwrap();
        world.notify_entity_destroyed(handle);

        world.notify_entity_created(handle);

        assert!(!world.is_entity_destroyed(handle));
        assert!(world.component(old).is_none());
        let fresh = world.attach_sphere_collider(handle).unwrap();
        assert_eq!(world.component(fresh).unwrap().state(), ComponentState::Uninitialized);
        assert_eq!(world.components_of(handle), &[fresh]);
    }

    #[test]
    fn test_created_notification_keeps_order_within_frame() {
        let (_bridge, mut world) = world();
        let handle = EntityHandle::from_raw(3);
        world.attach_sphere_collider(handle).unwrap();

        world.begin_frame();
        world.notify_entity_destroyed(handle);
        world.notify_entity_created(handle);
        assert_eq!(world.pending_deferred(), 2);
        world.end_frame();

        assert!(!world.is_entity_destroyed(handle));
        assert!(world.components_of(handle).is_empty());
    }

    #[test]
    fn test_remove_disposed() {
        let (bridge, mut world) = world();
        let doomed = bridge.spawn_entity();
        let survivor = bridge.spawn_entity();
        let gone = world.attach_sphere_collider(doomed).unwrap();
        let kept = world.attach_sphere_collider(survivor).unwrap();

        world.notify_entity_destroyed(doomed);
        assert_eq!(world.remove_disposed(), 1);

        assert_eq!(world.get::<SphereCollider>(gone).unwrap_err(), ComponentError::UnknownComponent);
        assert!(world.get::<SphereCollider>(kept).is_ok());
        assert!(world.components_of(doomed).is_empty());
        assert_eq!(world.component_count(), 1);
    }

    #[test]
    fn test_query_filters_by_type() {
        let (bridge, mut world) = world();
        let entity = bridge.spawn_entity();
        world.attach_sphere_collider(entity).unwrap();
        world.attach_box_collider(entity).unwrap();
        world.attach_sphere_collider(entity).unwrap();

        assert_eq!(world.query::<SphereCollider>().count(), 2);
        assert_eq!(world.query::<BoxCollider>().count(), 1);
    }
}
