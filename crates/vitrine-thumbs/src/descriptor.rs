//! Scene descriptors: static metadata plus optional thumbnail capabilities.
//!
//! Capabilities are explicit optional fields. A descriptor with neither a
//! `setup` hook nor a custom thumbnail producer simply has no thumbnail.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use vitrine_engine::scene::{CameraPose, NodeId, StagingScene};

use crate::error::SceneError;

/// Future returned by a custom thumbnail producer: encoded image bytes.
pub type ThumbnailFuture = Pin<Box<dyn Future<Output = Result<Vec<u8>, SceneError>> + Send>>;

/// `setup` hook signature.
pub type SetupFn = dyn Fn(&mut StagingScene) -> Result<SceneObjects, SceneError> + Send + Sync;
/// `update` hook signature: scene, setup's nodes, time in seconds.
pub type UpdateFn = dyn Fn(&mut StagingScene, &SceneObjects, f32) + Send + Sync;
/// Custom producer signature: width and height in pixels.
pub type CustomThumbnailFn = dyn Fn(u32, u32) -> ThumbnailFuture + Send + Sync;

/// Gallery-facing scene information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
}

impl SceneMetadata {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            categories: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }
}

/// Nodes a `setup` hook added to the staging scene.
///
/// The renderer removes and disposes exactly these after the frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneObjects {
    pub objects: Vec<NodeId>,
    pub lights: Vec<NodeId>,
}

impl SceneObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&mut self, id: NodeId) -> &mut Self {
        self.objects.push(id);
        self
    }

    pub fn light(&mut self, id: NodeId) -> &mut Self {
        self.lights.push(id);
        self
    }

    /// Objects then lights.
    pub fn all(&self) -> Vec<NodeId> {
        self.objects.iter().chain(&self.lights).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len() + self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable scene description. Shared behind `Arc` once built.
#[derive(Clone)]
pub struct SceneDescriptor {
    metadata: SceneMetadata,
    setup: Option<Arc<SetupFn>>,
    update: Option<Arc<UpdateFn>>,
    custom_thumbnail: Option<Arc<CustomThumbnailFn>>,
    camera_pose: Option<CameraPose>,
}

impl SceneDescriptor {
    pub fn new(metadata: SceneMetadata) -> Self {
        Self {
            metadata,
            setup: None,
            update: None,
            custom_thumbnail: None,
            camera_pose: None,
        }
    }

    /// Populates the staging scene for a still frame.
    pub fn with_setup<F>(mut self, setup: F) -> Self
    where
        F: Fn(&mut StagingScene) -> Result<SceneObjects, SceneError> + Send + Sync + 'static,
    {
        self.setup = Some(Arc::new(setup));
        self
    }

    /// Poses the setup's nodes at time `t` (seconds).
    pub fn with_update<F>(mut self, update: F) -> Self
    where
        F: Fn(&mut StagingScene, &SceneObjects, f32) + Send + Sync + 'static,
    {
        self.update = Some(Arc::new(update));
        self
    }

    /// Produces encoded thumbnail bytes without the generic renderer.
    pub fn with_custom_thumbnail<F>(mut self, producer: F) -> Self
    where
        F: Fn(u32, u32) -> ThumbnailFuture + Send + Sync + 'static,
    {
        self.custom_thumbnail = Some(Arc::new(producer));
        self
    }

    pub fn with_camera_pose(mut self, pose: CameraPose) -> Self {
        self.camera_pose = Some(pose);
        self
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn metadata(&self) -> &SceneMetadata {
        &self.metadata
    }

    pub fn setup(&self) -> Option<&SetupFn> {
        self.setup.as_deref()
    }

    pub fn update(&self) -> Option<&UpdateFn> {
        self.update.as_deref()
    }

    pub fn custom_thumbnail(&self) -> Option<&Arc<CustomThumbnailFn>> {
        self.custom_thumbnail.as_ref()
    }

    pub fn camera_pose(&self) -> Option<CameraPose> {
        self.camera_pose
    }

    pub fn has_thumbnail_capability(&self) -> bool {
        self.setup.is_some() || self.custom_thumbnail.is_some()
    }
}

impl fmt::Debug for SceneDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneDescriptor")
            .field("metadata", &self.metadata)
            .field("setup", &self.setup.is_some())
            .field("update", &self.update.is_some())
            .field("custom_thumbnail", &self.custom_thumbnail.is_some())
            .field("camera_pose", &self.camera_pose)
            .finish()
    }
}
