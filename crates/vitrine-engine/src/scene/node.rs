use crate::coords::{Transform, Vec3};

use super::{Geometry, GeometryId, Light, Material, MaterialSet, PointsMaterial};

/// Handle to a node inside a [`StagingScene`](super::StagingScene).
///
/// Ids are never reused by the scene that issued them, so a stale id from a
/// previous frame cannot alias a new node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub(crate) u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: Geometry,
    pub materials: MaterialSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Points {
    pub geometry: Geometry,
    pub material: PointsMaterial,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Mesh(Mesh),
    Points(Points),
    Light(Light),
}

/// A scene node: transform + payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
}

impl Node {
    #[inline]
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            transform: Transform::IDENTITY,
            visible: true,
            kind,
        }
    }

    #[inline]
    pub fn mesh(geometry: Geometry, material: Material) -> Self {
        Self::with_kind(NodeKind::Mesh(Mesh {
            geometry,
            materials: MaterialSet::Single(material),
        }))
    }

    /// Mesh drawing each geometry group with its own material.
    #[inline]
    pub fn multi_mesh(geometry: Geometry, materials: Vec<Material>) -> Self {
        Self::with_kind(NodeKind::Mesh(Mesh {
            geometry,
            materials: MaterialSet::Multi(materials),
        }))
    }

    #[inline]
    pub fn points(geometry: Geometry, material: PointsMaterial) -> Self {
        Self::with_kind(NodeKind::Points(Points { geometry, material }))
    }

    #[inline]
    pub fn light(light: Light) -> Self {
        Self::with_kind(NodeKind::Light(light))
    }

    #[inline]
    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    #[inline]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Geometry backing this node, if it draws anything.
    #[inline]
    pub fn geometry(&self) -> Option<&Geometry> {
        match &self.kind {
            NodeKind::Mesh(m) => Some(&m.geometry),
            NodeKind::Points(p) => Some(&p.geometry),
            NodeKind::Light(_) => None,
        }
    }

    #[inline]
    pub fn is_light(&self) -> bool {
        matches!(self.kind, NodeKind::Light(_))
    }

    #[inline]
    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            NodeKind::Mesh(m) => Some(m),
            _ => None,
        }
    }

    #[inline]
    pub fn as_light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            NodeKind::Light(l) => Some(l),
            _ => None,
        }
    }

    /// Releases the node's surface-side resources and drops it.
    pub fn dispose(self, release: &mut dyn ResourceRelease) -> Disposal {
        let mut d = Disposal {
            nodes: 1,
            ..Disposal::default()
        };
        match self.kind {
            NodeKind::Mesh(m) => {
                release.release_geometry(m.geometry.id());
                d.geometries += 1;
                d.materials += m.materials.len();
            }
            NodeKind::Points(p) => {
                release.release_geometry(p.geometry.id());
                d.geometries += 1;
                d.materials += 1;
            }
            NodeKind::Light(_) => d.lights += 1,
        }
        d
    }
}

/// Receiver for released GPU-side resources (implemented by surfaces).
pub trait ResourceRelease {
    fn release_geometry(&mut self, id: GeometryId);
}

/// Tally of what a disposal pass released.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Disposal {
    pub nodes: usize,
    pub geometries: usize,
    pub materials: usize,
    pub lights: usize,
}

impl core::ops::AddAssign for Disposal {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes += rhs.nodes;
        self.geometries += rhs.geometries;
        self.materials += rhs.materials;
        self.lights += rhs.lights;
    }
}
