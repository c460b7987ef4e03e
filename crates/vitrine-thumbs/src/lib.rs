//! Thumbnail generation for Vitrine showcase scenes.
//!
//! The pipeline has three layers, leaf first:
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`renderer`] | `ThumbnailRenderer`: one reusable offscreen surface, camera and staging scene |
//! | [`queue`] | `TaskQueue`: FIFO, paced, bounded-concurrency execution against owned resources |
//! | [`manager`] | `ThumbnailManager`: request coalescing, memoization, revocable image handles |
//!
//! [`gallery`] ties the manager to a [`SceneRegistry`] and hands the UI one
//! [`SceneEntry`] per scene.
//!
//! ```rust,ignore
//! let manager = ThumbnailManager::new(ThumbnailConfig::default());
//! let scenes = collect_scene_data(&registry, &manager);
//! if let Some(handle) = scenes[0].load_thumbnail().await {
//!     let png = manager.images().resolve(&handle);
//! }
//! manager.dispose();
//! ```
//!
//! Everything here expects to run inside a Tokio runtime.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod gallery;
pub mod handle;
pub mod manager;
pub mod queue;
pub mod registry;
pub mod renderer;

#[cfg(test)]
mod testkit;

pub use config::{QueueConfig, RetryPolicy, ThumbnailConfig};
pub use descriptor::{
    CustomThumbnailFn, SceneDescriptor, SceneMetadata, SceneObjects, SetupFn, ThumbnailFuture,
    UpdateFn,
};
pub use error::{QueueError, RenderError, SceneError};
pub use gallery::{SceneEntry, collect_scene_data};
pub use handle::{ImageHandle, ImageStore};
pub use manager::{ThumbnailManager, ThumbnailState};
pub use queue::{QueueResource, TaskFuture, TaskHandle, TaskQueue};
pub use registry::SceneRegistry;
pub use renderer::{RendererStats, ThumbnailRenderer};
