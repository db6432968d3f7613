//! Entity-Component-System implementation
//!
//! Entities live in the native engine; this side keeps the components
//! attached to them and the systems that run every frame.

pub mod component;
pub mod components;
pub mod entity;
pub mod scheduler;
pub mod system;
pub mod world;

pub use component::{Component, ComponentError, ComponentKind, ComponentState, InitContext};
pub use entity::EntityHandle;
pub use scheduler::{FaultRecord, FrameReport, SchedulerSystemFault, SystemId, SystemScheduler};
pub use system::{FnSystem, System, SystemFault, SystemPriority};
pub use world::{ComponentId, DeferredCommand, World};
