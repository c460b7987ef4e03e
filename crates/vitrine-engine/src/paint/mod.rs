//! Paint model shared between scenes and the rasterizer.
//!
//! Scope:
//! - color representation (straight alpha, linear `f32` channels)
//! - 8-bit pixel storage for surfaces
//!
//! Geometry types remain in `coords` and `scene`.

pub mod color;

pub use color::{Color, Rgba8};
