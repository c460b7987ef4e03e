//! Built-in showcase scenes.
//!
//! Most scenes stage meshes and lights for the generic thumbnail renderer.
//! Scenes whose look the rasterizer cannot reproduce ship an SVG-authored
//! thumbnail instead (see [`svg`]).

pub mod particles;
pub mod shapes;
pub mod svg;

use vitrine_thumbs::{SceneDescriptor, SceneRegistry};

/// Every built-in scene descriptor.
pub fn descriptors() -> Vec<SceneDescriptor> {
    let mut all = shapes::descriptors();
    all.extend(particles::descriptors());
    all.push(svg::night_city());
    all
}

/// Registry of every built-in scene.
pub fn registry() -> SceneRegistry {
    descriptors().into_iter().collect()
}
