//! Staging scene graph.
//!
//! Responsibilities:
//! - store the drawable nodes (meshes, point clouds) and lights of one frame
//! - hand out stable [`NodeId`]s so setup hooks can return what they created
//! - dispose removed nodes against the surface that holds their buffers
//!
//! The graph is flat: scenes that need hierarchy bake it into transforms.

mod camera;
mod geometry;
mod graph;
mod light;
mod material;
mod node;

pub use camera::{CameraPose, PerspectiveCamera};
pub use geometry::{Geometry, GeometryGroup, GeometryId};
pub use graph::{StagingScene, DEFAULT_BACKGROUND};
pub use light::Light;
pub use material::{Material, MaterialSet, PointsMaterial};
pub use node::{Disposal, Mesh, Node, NodeId, NodeKind, Points, ResourceRelease};
