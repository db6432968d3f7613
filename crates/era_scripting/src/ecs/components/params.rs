//! Initialization parameters
//!
//! Typed records are validated when they are built. [`ScriptValue`] lists only
//! exist at the script glue edge and are converted here.

use crate::ecs::component::{ComponentError, ComponentKind};
use crate::foundation::math::{is_positive_extent, Vec3};

use super::ColliderType;

/// Loosely typed value passed from script code
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    /// Absent value
    Nil,
    /// Boolean
    Bool(bool),
    /// Integer number
    Integer(i64),
    /// Floating point number
    Number(f64),
    /// String
    Text(String),
}

impl ScriptValue {
    /// Numeric value as `f32`, if this is a number
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(*n as f32),
            Self::Integer(i) => Some(*i as f32),
            _ => None,
        }
    }
}

impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for ScriptValue {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for ScriptValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Sphere collider parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    radius: f32,
}

impl SphereParams {
    /// Validate a radius; it must be finite and positive
    pub fn new(radius: f32) -> Result<Self, ComponentError> {
        if radius.is_finite() && radius > 0.0 {
            Ok(Self { radius })
        } else {
            Err(ComponentError::Argument(format!(
                "sphere radius must be finite and positive, got {}",
                radius
            )))
        }
    }

    /// Parse `[radius, ..]`; extra arguments are ignored
    pub fn from_args(args: &[ScriptValue]) -> Result<Self, ComponentError> {
        let radius = args
            .first()
            .and_then(ScriptValue::as_f32)
            .ok_or_else(|| ComponentError::Argument("missing or wrong-typed radius".to_string()))?;
        Self::new(radius)
    }

    /// Validated radius
    pub const fn radius(&self) -> f32 {
        self.radius
    }
}

/// Box collider parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxParams {
    half_extents: Vec3,
}

impl BoxParams {
    /// Validate half extents; every axis must be finite and positive
    pub fn new(half_extents: Vec3) -> Result<Self, ComponentError> {
        if is_positive_extent(&half_extents) {
            Ok(Self { half_extents })
        } else {
            Err(ComponentError::Argument(format!(
                "box half extents must be finite and positive, got ({}, {}, {})",
                half_extents.x, half_extents.y, half_extents.z
            )))
        }
    }

    /// Cube with the same half extent on every axis
    pub fn cube(half_extent: f32) -> Result<Self, ComponentError> {
        Self::new(Vec3::repeat(half_extent))
    }

    /// Parse `[hx, hy, hz]` or `[h]`
    pub fn from_args(args: &[ScriptValue]) -> Result<Self, ComponentError> {
        let numbers: Option<Vec<f32>> = args.iter().take(3).map(ScriptValue::as_f32).collect();
        match numbers.as_deref() {
            Some([h]) => Self::cube(*h),
            Some([hx, hy, hz]) => Self::new(Vec3::new(*hx, *hy, *hz)),
            _ => Err(ComponentError::Argument(
                "missing or wrong-typed half extents: expected 1 or 3 numbers".to_string(),
            )),
        }
    }

    /// Validated half extents
    pub const fn half_extents(&self) -> Vec3 {
        self.half_extents
    }
}

/// Tagged parameter record, one variant per component kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentParams {
    /// Sphere collider
    Sphere(SphereParams),
    /// Box collider
    Box(BoxParams),
}

impl ComponentParams {
    /// Kind of component these parameters initialize
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Sphere(_) => ComponentKind::Collider(ColliderType::Sphere),
            Self::Box(_) => ComponentKind::Collider(ColliderType::Box),
        }
    }

    /// Interpret a script argument list for the given component kind
    pub fn from_args(kind: ComponentKind, args: &[ScriptValue]) -> Result<Self, ComponentError> {
        match kind {
            ComponentKind::Collider(ColliderType::Sphere) => SphereParams::from_args(args).map(Self::Sphere),
            ComponentKind::Collider(ColliderType::Box) => BoxParams::from_args(args).map(Self::Box),
        }
    }
}

impl From<SphereParams> for ComponentParams {
    fn from(params: SphereParams) -> Self {
        Self::Sphere(params)
    }
}

impl From<BoxParams> for ComponentParams {
    fn from(params: BoxParams) -> Self {
        Self::Box(params)
    }
}
