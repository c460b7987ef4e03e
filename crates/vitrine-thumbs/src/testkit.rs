//! Test fixtures shared by the module tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use vitrine_engine::coords::{Vec3, Viewport};
use vitrine_engine::device::{
    ContextLossSignal, RenderSurface, SoftwareSurface, SurfaceError, SurfaceFactory, SurfaceInit,
};
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{
    Geometry, GeometryId, Light, Material, Node, PerspectiveCamera, ResourceRelease, StagingScene,
};

use crate::descriptor::{SceneDescriptor, SceneMetadata, SceneObjects};

/// Counters shared between a [`ScriptedFactory`] and the surfaces it makes.
#[derive(Debug, Clone, Default)]
pub(crate) struct Probe {
    pub created: Arc<AtomicUsize>,
    pub draws: Arc<AtomicUsize>,
    /// Draws still to fail; `usize::MAX` fails forever.
    pub failures_left: Arc<AtomicUsize>,
    pub signals: Arc<Mutex<Vec<ContextLossSignal>>>,
}

impl Probe {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn draws(&self) -> usize {
        self.draws.load(Ordering::SeqCst)
    }

    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn latest_signal(&self) -> ContextLossSignal {
        self.signals.lock().unwrap().last().cloned().expect("no surface created yet")
    }
}

/// Software surfaces whose draws can be scripted to fail after rendering.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedFactory {
    pub probe: Probe,
    pub failure: SurfaceError,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self {
            probe: Probe::default(),
            failure: SurfaceError::Timeout,
        }
    }

    pub fn always_failing(failure: SurfaceError) -> Self {
        let f = Self {
            probe: Probe::default(),
            failure,
        };
        f.probe.fail_next(usize::MAX);
        f
    }
}

pub(crate) struct ScriptedSurface {
    inner: SoftwareSurface,
    probe: Probe,
    failure: SurfaceError,
}

impl SurfaceFactory for ScriptedFactory {
    type Surface = ScriptedSurface;

    fn create(
        &mut self,
        init: &SurfaceInit,
        width: u32,
        height: u32,
    ) -> Result<ScriptedSurface, SurfaceError> {
        let inner = SoftwareSurface::new(init.clone(), width, height)?;
        self.probe.created.fetch_add(1, Ordering::SeqCst);
        self.probe.signals.lock().unwrap().push(inner.context_loss());
        Ok(ScriptedSurface {
            inner,
            probe: self.probe.clone(),
            failure: self.failure.clone(),
        })
    }
}

impl ResourceRelease for ScriptedSurface {
    fn release_geometry(&mut self, id: GeometryId) {
        self.inner.release_geometry(id);
    }
}

impl RenderSurface for ScriptedSurface {
    fn viewport(&self) -> Viewport {
        self.inner.viewport()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.inner.resize(width, height)
    }

    fn context_loss(&self) -> ContextLossSignal {
        self.inner.context_loss()
    }

    fn resident_buffers(&self) -> usize {
        self.inner.resident_buffers()
    }

    // The frame is drawn (buffers uploaded) before the scripted failure, like
    // a device that dies mid-frame.
    fn draw(&mut self, scene: &StagingScene, camera: &PerspectiveCamera) -> Result<(), SurfaceError> {
        self.probe.draws.fetch_add(1, Ordering::SeqCst);
        self.inner.draw(scene, camera)?;
        let scripted = self
            .probe
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                0 => None,
                usize::MAX => Some(usize::MAX),
                n => Some(n - 1),
            })
            .is_ok();
        if scripted {
            return Err(self.failure.clone());
        }
        Ok(())
    }

    fn read_png(&mut self) -> Result<Vec<u8>, SurfaceError> {
        self.inner.read_png()
    }

    fn dispose(&mut self) {
        self.inner.dispose();
    }
}

/// A lit icosahedron, a six-material box and two lights; counts setup calls.
pub(crate) fn solid_scene(id: &str, setups: Arc<AtomicUsize>) -> SceneDescriptor {
    SceneDescriptor::new(SceneMetadata::new(id, format!("Solid {id}")))
        .with_setup(move |scene| {
            setups.fetch_add(1, Ordering::SeqCst);
            let mut created = SceneObjects::new();
            created.object(scene.add(Node::mesh(
                Geometry::icosahedron(1.5),
                Material::lit(Color::from_hex(0x44aa88)),
            )));
            let faces = (0..6)
                .map(|i| Material::lit(Color::from_hsl(i as f32 / 6.0, 0.7, 0.5)))
                .collect();
            created.object(
                scene.add(Node::multi_mesh(Geometry::cuboid(1.0, 1.0, 1.0), faces).at(Vec3::new(2.5, 0.0, 0.0))),
            );
            created.light(scene.add(Node::light(Light::ambient(Color::WHITE, 0.4))));
            created.light(
                scene.add(Node::light(Light::directional(Color::WHITE, 0.8)).at(Vec3::new(5.0, 5.0, 5.0))),
            );
            Ok(created)
        })
        .with_update(|scene, created, t| {
            if let Some(node) = scene.get_mut(created.objects[0]) {
                node.transform.rotation.y = t * 0.5;
            }
        })
}

pub(crate) fn bare_scene(id: &str) -> SceneDescriptor {
    SceneDescriptor::new(SceneMetadata::new(id, format!("Bare {id}")))
}

pub(crate) fn decode_png(bytes: &[u8]) -> image::RgbaImage {
    image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .expect("valid png")
        .to_rgba8()
}
