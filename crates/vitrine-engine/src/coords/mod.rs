//! Coordinate and transform types shared by the scene graph and renderer.
//!
//! World space follows the usual right-handed convention:
//! - +X right, +Y up, +Z toward the viewer
//! - cameras look down their local -Z axis
//!
//! Vector and matrix math comes from `glam`; this module only adds the
//! scene-facing wrappers.

mod transform;
mod viewport;

pub use glam::{Mat4, Quat, Vec3};
pub use transform::Transform;
pub use viewport::Viewport;
