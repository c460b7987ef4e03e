use std::collections::HashMap;

use crate::coords::Viewport;
use crate::paint::Rgba8;
use crate::render::{FrameTarget, RenderCtx, draw_scene, encode_png};
use crate::scene::{GeometryId, NodeKind, PerspectiveCamera, ResourceRelease, StagingScene};

use super::{ContextLossSignal, RenderSurface, SurfaceError, SurfaceFactory, SurfaceInit};

/// Bookkeeping for one geometry the surface has "uploaded".
#[derive(Debug, Copy, Clone)]
struct Upload {
    vertices: usize,
    indices: usize,
}

/// CPU-backed offscreen surface.
///
/// Owns an RGBA8 color buffer and an `f32` depth buffer sized to the viewport,
/// plus a per-geometry upload table that mirrors the vertex/index buffers a
/// GPU backend would keep resident. Uploads persist across frames until the
/// geometry is released, which is what makes per-frame disposal observable.
pub struct SoftwareSurface {
    init: SurfaceInit,
    viewport: Viewport,
    color: Vec<Rgba8>,
    depth: Vec<f32>,
    uploads: HashMap<GeometryId, Upload>,
    lost: ContextLossSignal,
    disposed: bool,
    frames: u64,
}

impl SoftwareSurface {
    pub fn new(init: SurfaceInit, width: u32, height: u32) -> Result<Self, SurfaceError> {
        let mut surface = Self {
            init,
            viewport: Viewport::default(),
            color: Vec::new(),
            depth: Vec::new(),
            uploads: HashMap::new(),
            lost: ContextLossSignal::new(),
            disposed: false,
            frames: 0,
        };
        surface.resize(width, height)?;
        log::debug!("{}: created {}x{}", surface.init.label, width, height);
        Ok(surface)
    }

    /// Frames drawn since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Bytes held by uploaded geometry.
    pub fn resident_bytes(&self) -> usize {
        self.uploads
            .values()
            .map(|u| u.vertices * 12 + u.indices * 4)
            .sum()
    }

    /// Last drawn frame, row-major RGBA8.
    pub fn pixels(&self) -> &[Rgba8] {
        &self.color
    }

    fn check_usable(&self) -> Result<(), SurfaceError> {
        if self.disposed {
            return Err(SurfaceError::Disposed);
        }
        if self.lost.is_lost() {
            return Err(SurfaceError::Lost);
        }
        Ok(())
    }

    fn upload_scene(&mut self, scene: &StagingScene) {
        for (_, node) in scene.iter() {
            let geometry = match &node.kind {
                NodeKind::Mesh(m) => &m.geometry,
                NodeKind::Points(p) => &p.geometry,
                NodeKind::Light(_) => continue,
            };
            self.uploads.entry(geometry.id()).or_insert_with(|| Upload {
                vertices: geometry.positions().len(),
                indices: geometry.indices().len(),
            });
        }
    }
}

impl ResourceRelease for SoftwareSurface {
    fn release_geometry(&mut self, id: GeometryId) {
        self.uploads.remove(&id);
    }
}

impl RenderSurface for SoftwareSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.check_usable()?;

        let max = self.init.max_dimension;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(SurfaceError::InvalidSize { width, height, max });
        }

        let next = Viewport::new(width, height);
        if next == self.viewport {
            return Ok(());
        }

        let n = next.pixel_count();
        let mut color = Vec::new();
        let mut depth = Vec::new();
        if color.try_reserve_exact(n).is_err() || depth.try_reserve_exact(n).is_err() {
            return Err(SurfaceError::OutOfMemory { width, height });
        }
        color.resize(n, Rgba8::default());
        depth.resize(n, f32::INFINITY);

        self.color = color;
        self.depth = depth;
        self.viewport = next;
        Ok(())
    }

    fn context_loss(&self) -> ContextLossSignal {
        self.lost.clone()
    }

    fn resident_buffers(&self) -> usize {
        self.uploads.len()
    }

    fn draw(&mut self, scene: &StagingScene, camera: &PerspectiveCamera) -> Result<(), SurfaceError> {
        self.check_usable()?;
        self.upload_scene(scene);

        let ctx = RenderCtx::new(self.viewport, camera);
        let mut target = FrameTarget::new(self.viewport, &mut self.color, &mut self.depth);
        let stats = draw_scene(&mut target, &ctx, scene);
        self.frames += 1;

        log::trace!(
            "{}: frame {} drew {} triangles, {} points",
            self.init.label,
            self.frames,
            stats.triangles,
            stats.points
        );

        // The platform may drop the context mid-frame; the frame is then garbage.
        self.check_usable()
    }

    fn read_png(&mut self) -> Result<Vec<u8>, SurfaceError> {
        self.check_usable()?;
        encode_png(self.viewport, &self.color).map_err(|e| SurfaceError::Encode(e.to_string()))
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.uploads.clear();
        self.color = Vec::new();
        self.depth = Vec::new();
        log::debug!("{}: disposed after {} frames", self.init.label, self.frames);
    }
}

/// Factory producing [`SoftwareSurface`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareSurfaceFactory;

impl SurfaceFactory for SoftwareSurfaceFactory {
    type Surface = SoftwareSurface;

    fn create(
        &mut self,
        init: &SurfaceInit,
        width: u32,
        height: u32,
    ) -> Result<SoftwareSurface, SurfaceError> {
        SoftwareSurface::new(init.clone(), width, height)
    }
}
