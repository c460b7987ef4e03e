use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::coords::Viewport;
use crate::scene::{PerspectiveCamera, ResourceRelease, StagingScene};

use super::{SurfaceError, SurfaceInit};

/// Shared flag a platform layer raises when it invalidates a surface.
///
/// The surface hands out clones; whoever observes the platform event (a
/// device-reset hook, a watchdog, a test) calls [`lose`](Self::lose). Each
/// surface instance has its own signal, so a recreated surface starts clean.
#[derive(Debug, Clone, Default)]
pub struct ContextLossSignal(Arc<AtomicBool>);

impl ContextLossSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the context as lost.
    pub fn lose(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_lost(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Offscreen render target the thumbnail renderer draws through.
///
/// A surface owns its pixel storage and any per-geometry buffers it uploads
/// while drawing; released geometries must drop those buffers
/// ([`ResourceRelease`]).
pub trait RenderSurface: ResourceRelease + Send {
    fn viewport(&self) -> Viewport;

    /// Reallocates pixel storage when the size changes.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError>;

    fn context_loss(&self) -> ContextLossSignal;

    fn is_context_lost(&self) -> bool {
        self.context_loss().is_lost()
    }

    /// Geometry buffers currently held by the surface.
    fn resident_buffers(&self) -> usize;

    /// Clears to the scene background and draws one frame.
    fn draw(&mut self, scene: &StagingScene, camera: &PerspectiveCamera) -> Result<(), SurfaceError>;

    /// Encodes the last drawn frame as PNG.
    fn read_png(&mut self) -> Result<Vec<u8>, SurfaceError>;

    /// Frees pixel storage and buffers. Safe to call more than once.
    fn dispose(&mut self);
}

/// Creates surfaces on demand (first use, and again after context loss).
pub trait SurfaceFactory: Send + 'static {
    type Surface: RenderSurface;

    fn create(
        &mut self,
        init: &SurfaceInit,
        width: u32,
        height: u32,
    ) -> Result<Self::Surface, SurfaceError>;
}
