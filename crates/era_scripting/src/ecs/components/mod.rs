//! Concrete component kinds
//!
//! Every kind that crosses the bridge lives here together with its typed
//! parameter record.

pub mod collider;
pub mod params;

pub use collider::{BoxCollider, ColliderType, SphereCollider};
pub use params::{BoxParams, ComponentParams, ScriptValue, SphereParams};
