//! Request-coalescing thumbnail cache.
//!
//! Per scene id the manager keeps at most one generated handle and at most
//! one in-flight generation. The check-then-register step runs under a plain
//! mutex with no `.await` in between, so concurrent callers for the same id
//! always attach to the same generation. Generation itself is a spawned task:
//! a caller dropping its future does not cancel the render for the others.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use vitrine_engine::device::{SoftwareSurfaceFactory, SurfaceFactory};

use crate::config::ThumbnailConfig;
use crate::descriptor::SceneDescriptor;
use crate::error::{QueueError, RenderError};
use crate::handle::{ImageHandle, ImageStore};
use crate::queue::TaskQueue;
use crate::renderer::ThumbnailRenderer;

const PNG_MIME: &str = "image/png";

/// Where a scene's thumbnail stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailState {
    NotRequested,
    Pending,
    Generated,
}

#[derive(Debug, Clone)]
enum Outcome {
    Waiting,
    Done(Option<ImageHandle>),
}

#[derive(Default)]
struct CacheEntry {
    image: Option<ImageHandle>,
    pending: Option<watch::Receiver<Outcome>>,
}

struct Inner<F: SurfaceFactory> {
    queue: TaskQueue<ThumbnailRenderer<F>>,
    images: ImageStore,
    config: ThumbnailConfig,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl<F: SurfaceFactory> Inner<F> {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Thumbnail cache over a renderer queue. Cheap to clone; clones share state.
pub struct ThumbnailManager<F: SurfaceFactory = SoftwareSurfaceFactory> {
    inner: Arc<Inner<F>>,
}

impl<F: SurfaceFactory> Clone for ThumbnailManager<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl ThumbnailManager<SoftwareSurfaceFactory> {
    /// Manager rendering with the CPU rasterizer. Must be called inside a
    /// Tokio runtime.
    pub fn new(config: ThumbnailConfig) -> Self {
        Self::with_factory(SoftwareSurfaceFactory, config)
    }
}

impl<F: SurfaceFactory + Clone> ThumbnailManager<F> {
    /// Manager whose workers each get a renderer over a clone of `factory`.
    pub fn with_factory(factory: F, config: ThumbnailConfig) -> Self {
        let queue = TaskQueue::with_workers(
            config.workers,
            |_| ThumbnailRenderer::new(factory.clone(), &config),
            config.queue,
        );
        Self {
            inner: Arc::new(Inner {
                queue,
                images: ImageStore::new(),
                config,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }
}

impl<F: SurfaceFactory> ThumbnailManager<F> {
    /// Store holding every handle this manager issued.
    pub fn images(&self) -> &ImageStore {
        &self.inner.images
    }

    /// The render queue (diagnostics).
    pub fn queue(&self) -> &TaskQueue<ThumbnailRenderer<F>> {
        &self.inner.queue
    }

    pub fn config(&self) -> &ThumbnailConfig {
        &self.inner.config
    }

    pub fn state(&self, id: &str) -> ThumbnailState {
        match self.inner.entries().get(id) {
            Some(entry) if entry.image.is_some() => ThumbnailState::Generated,
            Some(entry) if entry.pending.is_some() => ThumbnailState::Pending,
            _ => ThumbnailState::NotRequested,
        }
    }

    /// Cached handle for `id`, without generating.
    pub fn cached(&self, id: &str) -> Option<ImageHandle> {
        self.inner.entries().get(id).and_then(|e| e.image.clone())
    }

    /// Thumbnail for `descriptor`: cached, joined, or freshly generated.
    ///
    /// Returns `None` (after logging a warning) when the scene has no
    /// thumbnail capability or generation failed; a later call tries again.
    pub async fn generate_thumbnail(&self, descriptor: Arc<SceneDescriptor>) -> Option<ImageHandle> {
        let mut pending = {
            let mut entries = self.inner.entries();
            let entry = entries.entry(descriptor.id().to_owned()).or_default();
            if let Some(image) = &entry.image {
                return Some(image.clone());
            }
            match entry.pending.clone() {
                Some(rx) => rx,
                None => {
                    let (tx, rx) = watch::channel(Outcome::Waiting);
                    entry.pending = Some(rx.clone());
                    tokio::spawn(generate(self.inner.clone(), descriptor, tx));
                    rx
                }
            }
        };

        match pending.wait_for(|o| matches!(o, Outcome::Done(_))).await {
            Ok(outcome) => match &*outcome {
                Outcome::Done(image) => image.clone(),
                Outcome::Waiting => None,
            },
            // Generation task died without reporting.
            Err(_) => None,
        }
    }

    /// Tears down the queue and, through it, the renderer. Issued handles
    /// stay valid; revoke them via [`images`](Self::images) when the UI is
    /// done with them.
    pub fn dispose(&self) {
        self.inner.queue.dispose();
    }

    /// [`dispose`](Self::dispose), then waits for the renderer to be released.
    pub async fn shutdown(&self) {
        self.inner.queue.shutdown().await;
    }
}

async fn generate<F: SurfaceFactory>(
    inner: Arc<Inner<F>>,
    descriptor: Arc<SceneDescriptor>,
    tx: watch::Sender<Outcome>,
) {
    let id = descriptor.id().to_owned();

    let image = match produce(&inner, descriptor).await {
        Ok(bytes) => Some(inner.images.create(bytes, PNG_MIME)),
        Err(err) => {
            log::warn!("no thumbnail for scene {id}: {err}");
            None
        }
    };

    let image = {
        let mut entries = inner.entries();
        let entry = entries.entry(id).or_default();
        entry.pending = None;
        match image {
            Some(fresh) => Some(entry.image.get_or_insert(fresh).clone()),
            None => None,
        }
    };

    tx.send_replace(Outcome::Done(image));
}

async fn produce<F: SurfaceFactory>(
    inner: &Inner<F>,
    descriptor: Arc<SceneDescriptor>,
) -> Result<Vec<u8>, QueueError> {
    let (width, height) = (inner.config.width, inner.config.height);

    if descriptor.setup().is_some() {
        inner
            .queue
            .add(move |renderer: &mut ThumbnailRenderer<F>| {
                Box::pin(async move { renderer.generate_thumbnail(&descriptor, width, height).await })
            })
            .await
    } else if let Some(custom) = descriptor.custom_thumbnail().cloned() {
        inner
            .queue
            .add(move |_: &mut ThumbnailRenderer<F>| {
                Box::pin(async move { custom(width, height).await.map_err(RenderError::from) })
            })
            .await
    } else {
        Err(RenderError::MissingCapability {
            id: descriptor.id().to_owned(),
        }
        .into())
    }
}
