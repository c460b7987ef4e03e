//! CPU rasterizer.
//!
//! Renderers consume a [`StagingScene`](crate::scene::StagingScene) and write
//! into a [`FrameTarget`] (color + depth). There is no GPU involvement; the
//! goal is a recognisable still image, not fidelity.
//!
//! Convention:
//! - world space is right-handed, Y up
//! - screen space is physical pixels, top-left origin, +Y down
//! - depth is NDC z in `[0, 1]`, smaller is nearer
//! - shading is flat (one face normal per triangle), double-sided

mod ctx;
mod encode;
mod raster;
mod shading;

pub use ctx::RenderCtx;
pub use encode::encode_png;
pub use raster::{FrameStats, FrameTarget, ScreenVertex, draw_scene};
pub use shading::SceneLights;
