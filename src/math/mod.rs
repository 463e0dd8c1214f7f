//! Math utilities module
//!
//! Rigid transforms and planes on top of glam, plus the glam re-exports used
//! across the crate.

mod plane;
mod transform;

pub use plane::Plane;
pub use transform::Transform;

// Re-export commonly used glam types
pub use glam::{Mat4, Quat, Vec3, Vec4};
