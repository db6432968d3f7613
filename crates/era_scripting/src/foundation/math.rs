//! Math types shared with the native engine

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Returns true when every component of `v` is finite and strictly positive
pub fn is_positive_extent(v: &Vec3) -> bool {
    v.iter().all(|c| c.is_finite() && *c > 0.0)
}
