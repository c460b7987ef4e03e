use crate::paint::Color;

use super::{Disposal, Node, NodeId, ResourceRelease};

/// Background every thumbnail starts from (`#111111`).
pub const DEFAULT_BACKGROUND: u32 = 0x111111;

#[derive(Debug, Clone)]
struct Entry {
    id: NodeId,
    node: Node,
}

/// Flat scene graph used to stage one frame at a time.
///
/// Nodes draw in insertion order; depth testing resolves overlap. Removing a
/// node with [`remove`](Self::remove) hands ownership back to the caller, who
/// is responsible for disposing it. The `*_and_dispose` helpers do both.
#[derive(Debug, Clone)]
pub struct StagingScene {
    entries: Vec<Entry>,
    next_id: u64,
    background: Color,
}

impl Default for StagingScene {
    fn default() -> Self {
        Self::new(Color::from_hex(DEFAULT_BACKGROUND))
    }
}

impl StagingScene {
    pub fn new(background: Color) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            background,
        }
    }

    #[inline]
    pub fn background(&self) -> Color {
        self.background
    }

    /// Scenes may override the background for their own frame; the renderer
    /// resets it before the next one.
    #[inline]
    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Adds a node and returns its id.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, node });
        id
    }

    /// Number of direct children (all nodes; the graph is flat).
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.node)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.entries.iter_mut().find(|e| e.id == id).map(|e| &mut e.node)
    }

    /// Removes a node, preserving the order of the rest.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx).node)
    }

    /// Iterates nodes in insertion (draw) order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.entries.iter().map(|e| (e.id, &e.node))
    }

    /// Removes the listed nodes and disposes them. Ids no longer present are
    /// ignored, so disposing twice is harmless.
    pub fn dispose_nodes(&mut self, ids: &[NodeId], release: &mut dyn ResourceRelease) -> Disposal {
        let mut total = Disposal::default();
        for &id in ids {
            if let Some(node) = self.remove(id) {
                total += node.dispose(release);
            }
        }
        total
    }

    /// Removes and disposes every node. The background is left as is.
    pub fn clear_and_dispose(&mut self, release: &mut dyn ResourceRelease) -> Disposal {
        let mut total = Disposal::default();
        for entry in self.entries.drain(..) {
            total += entry.node.dispose(release);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::paint::Color;
    use crate::scene::{Geometry, GeometryId, Light, Material};

    #[derive(Default)]
    struct Released(HashSet<GeometryId>);

    impl ResourceRelease for Released {
        fn release_geometry(&mut self, id: GeometryId) {
            self.0.insert(id);
        }
    }

    fn mesh() -> Node {
        Node::mesh(Geometry::tetrahedron(1.0), Material::default())
    }

    #[test]
    fn ids_are_not_reused_after_clear() {
        let mut scene = StagingScene::default();
        let a = scene.add(mesh());
        scene.clear_and_dispose(&mut Released::default());
        let b = scene.add(mesh());
        assert_ne!(a, b);
        assert!(scene.get(a).is_none());
    }

    #[test]
    fn remove_preserves_order() {
        let mut scene = StagingScene::default();
        let a = scene.add(mesh());
        let b = scene.add(mesh());
        let c = scene.add(mesh());
        scene.remove(b);
        let order: Vec<NodeId> = scene.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![a, c]);
    }

    #[test]
    fn dispose_nodes_releases_geometry_and_counts_materials() {
        let mut scene = StagingScene::default();
        let cube = Geometry::cuboid(1.0, 1.0, 1.0);
        let cube_id = cube.id();
        let m = scene.add(Node::multi_mesh(cube, vec![Material::default(); 6]));
        let l = scene.add(Node::light(Light::ambient(Color::WHITE, 0.5)));

        let mut released = Released::default();
        let d = scene.dispose_nodes(&[m, l, m], &mut released);

        assert_eq!(d.nodes, 2);
        assert_eq!(d.geometries, 1);
        assert_eq!(d.materials, 6);
        assert_eq!(d.lights, 1);
        assert!(released.0.contains(&cube_id));
        assert!(scene.is_empty());
    }

    #[test]
    fn clear_keeps_background() {
        let mut scene = StagingScene::default();
        scene.set_background(Color::from_hex(0x000510));
        scene.add(mesh());
        scene.clear_and_dispose(&mut Released::default());
        assert!(scene.is_empty());
        assert_eq!(scene.background(), Color::from_hex(0x000510));
    }
}
