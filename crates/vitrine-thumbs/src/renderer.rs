//! Offscreen thumbnail renderer.
//!
//! One renderer owns one surface, one camera and one staging scene, created
//! lazily and reused for every thumbnail. Each call stages a scene, draws a
//! single frame, reads it back as PNG and tears the staged nodes down again,
//! so nothing a scene creates outlives its own call.
//!
//! Recovery follows [`SurfaceErrorAction`]: a lost (or exhausted) surface is
//! dropped and recreated on the next attempt, transient errors reuse it, and
//! invalid sizes fail without retrying.

use vitrine_engine::device::{
    RenderSurface, SoftwareSurfaceFactory, SurfaceErrorAction, SurfaceFactory, SurfaceInit,
};
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{DEFAULT_BACKGROUND, PerspectiveCamera, StagingScene};

use crate::config::{RetryPolicy, ThumbnailConfig};
use crate::descriptor::SceneDescriptor;
use crate::error::RenderError;
use crate::queue::QueueResource;

struct RendererState<S> {
    surface: S,
    camera: PerspectiveCamera,
    scene: StagingScene,
}

/// Counters for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Render attempts, including retries.
    pub attempts: u64,
    /// Thumbnails successfully produced.
    pub thumbnails: u64,
    /// Surfaces created (first use plus every re-initialization).
    pub surfaces_created: u64,
}

pub struct ThumbnailRenderer<F: SurfaceFactory = SoftwareSurfaceFactory> {
    factory: F,
    init: SurfaceInit,
    retry: RetryPolicy,
    update_time: f32,
    state: Option<RendererState<F::Surface>>,
    stats: RendererStats,
}

impl ThumbnailRenderer<SoftwareSurfaceFactory> {
    /// Renderer backed by the CPU rasterizer.
    pub fn software(config: &ThumbnailConfig) -> Self {
        Self::new(SoftwareSurfaceFactory, config)
    }
}

impl<F: SurfaceFactory> ThumbnailRenderer<F> {
    pub fn new(factory: F, config: &ThumbnailConfig) -> Self {
        Self {
            factory,
            init: config.surface.clone(),
            retry: config.retry,
            update_time: config.update_time,
            state: None,
            stats: RendererStats::default(),
        }
    }

    /// Creates the surface, camera and staging scene on first use, and again
    /// after context loss. Resizes the surface to `width`×`height`.
    pub fn initialize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.prepare(width, height).map(|_| ())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub fn stats(&self) -> RendererStats {
        self.stats
    }

    /// Nodes currently in the staging scene (zero between calls).
    pub fn staged_nodes(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.scene.len())
    }

    /// Geometry buffers the surface holds (zero between calls).
    pub fn resident_buffers(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.surface.resident_buffers())
    }

    /// The live surface, if any.
    pub fn surface(&self) -> Option<&F::Surface> {
        self.state.as_ref().map(|s| &s.surface)
    }

    /// Renders `descriptor` to PNG bytes.
    ///
    /// The whole call is retried up to the configured attempt budget with
    /// linear backoff; the budget starts fresh on every call. Staged nodes are
    /// disposed after every attempt, including failed ones.
    pub async fn generate_thumbnail(
        &mut self,
        descriptor: &SceneDescriptor,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        if descriptor.setup().is_none() {
            return Err(RenderError::MissingCapability {
                id: descriptor.id().to_owned(),
            });
        }

        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.stats.attempts += 1;

            let err = match self.render_once(descriptor, width, height) {
                Ok(png) => {
                    self.stats.thumbnails += 1;
                    log::debug!(
                        "thumbnail for scene {} rendered ({} bytes, attempt {attempt})",
                        descriptor.id(),
                        png.len()
                    );
                    return Ok(png);
                }
                Err(err) => err,
            };

            log::warn!(
                "thumbnail for scene {} failed (attempt {attempt}/{max_attempts}): {err}",
                descriptor.id()
            );

            if let RenderError::Surface(surface_err) = &err {
                match surface_err.action() {
                    SurfaceErrorAction::Reinitialize => self.teardown(),
                    SurfaceErrorAction::Retry => {}
                    SurfaceErrorAction::Fatal => return Err(err),
                }
            }

            if attempt >= max_attempts {
                return Err(RenderError::Exhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            tokio::time::sleep(self.retry.delay_after(attempt)).await;
        }
    }

    /// Releases the surface, camera and staging scene. Idempotent; the next
    /// render initializes again.
    pub fn dispose(&mut self) {
        if self.state.is_some() {
            self.teardown();
            log::debug!("{}: renderer disposed", self.init.label);
        }
    }

    fn prepare(&mut self, width: u32, height: u32) -> Result<&mut RendererState<F::Surface>, RenderError> {
        if self.state.as_ref().is_some_and(|s| s.surface.is_context_lost()) {
            log::warn!("{}: rendering context lost; recreating surface", self.init.label);
            self.teardown();
        }

        let state = match self.state.take() {
            Some(state) => state,
            None => {
                let surface = self.factory.create(&self.init, width, height)?;
                self.stats.surfaces_created += 1;
                RendererState {
                    surface,
                    camera: PerspectiveCamera::new(aspect(width, height)),
                    scene: StagingScene::default(),
                }
            }
        };

        let state = self.state.insert(state);
        state.surface.resize(width, height)?;
        state.camera.aspect = aspect(width, height);
        Ok(state)
    }

    fn render_once(
        &mut self,
        descriptor: &SceneDescriptor,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let update_time = self.update_time;
        let RendererState {
            surface,
            camera,
            scene,
        } = self.prepare(width, height)?;

        let stale = scene.clear_and_dispose(surface);
        if stale.nodes > 0 {
            log::debug!("released {} stale node(s) before scene {}", stale.nodes, descriptor.id());
        }
        scene.set_background(Color::from_hex(DEFAULT_BACKGROUND));
        *camera = PerspectiveCamera::new(camera.aspect);
        camera.apply_pose(descriptor.camera_pose().unwrap_or_default());

        let Some(setup) = descriptor.setup() else {
            return Err(RenderError::MissingCapability {
                id: descriptor.id().to_owned(),
            });
        };

        let created = match setup(&mut *scene) {
            Ok(created) => created,
            Err(err) => {
                scene.clear_and_dispose(surface);
                return Err(err.into());
            }
        };

        if let Some(update) = descriptor.update() {
            update(&mut *scene, &created, update_time);
        }

        let frame = surface
            .draw(scene, camera)
            .and_then(|()| surface.read_png());

        let mut released = scene.dispose_nodes(&created.all(), surface);
        // Nodes the hook added without reporting them.
        released += scene.clear_and_dispose(surface);
        log::debug!(
            "scene {}: released {} node(s), {} geometr(ies), {} light(s)",
            descriptor.id(),
            released.nodes,
            released.geometries,
            released.lights
        );

        Ok(frame?)
    }

    fn teardown(&mut self) {
        if let Some(mut state) = self.state.take() {
            state.scene.clear_and_dispose(&mut state.surface);
            state.surface.dispose();
        }
    }
}

impl<F: SurfaceFactory> QueueResource for ThumbnailRenderer<F> {
    fn dispose(&mut self) {
        ThumbnailRenderer::dispose(self);
    }

    fn recover(&mut self) {
        if self.state.is_some() {
            log::warn!("{}: discarding renderer state after a panicked task", self.init.label);
            self.teardown();
        }
    }
}

impl<F: SurfaceFactory> Drop for ThumbnailRenderer<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[inline]
fn aspect(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}
