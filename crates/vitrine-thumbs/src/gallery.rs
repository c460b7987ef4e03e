//! Gallery-facing scene entries.

use std::sync::Arc;

use vitrine_engine::device::{SoftwareSurfaceFactory, SurfaceFactory};

use crate::descriptor::{SceneDescriptor, SceneMetadata};
use crate::handle::ImageHandle;
use crate::manager::{ThumbnailManager, ThumbnailState};
use crate::registry::SceneRegistry;

/// One gallery card: scene metadata plus a lazily generated thumbnail.
pub struct SceneEntry<F: SurfaceFactory = SoftwareSurfaceFactory> {
    descriptor: Arc<SceneDescriptor>,
    manager: ThumbnailManager<F>,
}

impl<F: SurfaceFactory> Clone for SceneEntry<F> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            manager: self.manager.clone(),
        }
    }
}

impl<F: SurfaceFactory> SceneEntry<F> {
    pub fn new(descriptor: Arc<SceneDescriptor>, manager: ThumbnailManager<F>) -> Self {
        Self {
            descriptor,
            manager,
        }
    }

    pub fn id(&self) -> &str {
        self.descriptor.id()
    }

    pub fn metadata(&self) -> &SceneMetadata {
        self.descriptor.metadata()
    }

    pub fn descriptor(&self) -> &Arc<SceneDescriptor> {
        &self.descriptor
    }

    pub fn thumbnail_state(&self) -> ThumbnailState {
        self.manager.state(self.id())
    }

    /// Generates (or reuses) this scene's thumbnail. Safe to call repeatedly
    /// and concurrently; `None` means "show a placeholder".
    pub async fn load_thumbnail(&self) -> Option<ImageHandle> {
        self.manager.generate_thumbnail(self.descriptor.clone()).await
    }
}

impl<F: SurfaceFactory> std::fmt::Debug for SceneEntry<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEntry")
            .field("id", &self.id())
            .field("state", &self.thumbnail_state())
            .finish()
    }
}

/// One entry per registered scene, newest (highest id) first.
pub fn collect_scene_data<F: SurfaceFactory>(
    registry: &SceneRegistry,
    manager: &ThumbnailManager<F>,
) -> Vec<SceneEntry<F>> {
    let entries: Vec<_> = registry
        .iter_newest_first()
        .map(|descriptor| SceneEntry::new(descriptor.clone(), manager.clone()))
        .collect();
    log::debug!("collected {} scene(s) for the gallery", entries.len());
    entries
}
