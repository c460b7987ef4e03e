use glam::{Mat4, Vec3};

use crate::coords::Viewport;
use crate::scene::PerspectiveCamera;

/// Per-frame constants shared by every draw call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderCtx {
    pub viewport: Viewport,
    pub view_proj: Mat4,
    pub eye: Vec3,
}

impl RenderCtx {
    pub fn new(viewport: Viewport, camera: &PerspectiveCamera) -> Self {
        Self {
            viewport,
            view_proj: camera.view_projection(),
            eye: camera.position,
        }
    }

    /// Projects a world-space point to screen space.
    ///
    /// Returns `None` for points on or behind the camera plane, and for points
    /// outside the depth range.
    pub fn project(&self, world: Vec3) -> Option<super::ScreenVertex> {
        let clip = self.view_proj * world.extend(1.0);
        if clip.w <= 1e-5 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }
        let w = self.viewport.width as f32;
        let h = self.viewport.height as f32;
        Some(super::ScreenVertex {
            x: (ndc.x * 0.5 + 0.5) * w,
            y: (1.0 - (ndc.y * 0.5 + 0.5)) * h,
            depth: ndc.z,
        })
    }
}
