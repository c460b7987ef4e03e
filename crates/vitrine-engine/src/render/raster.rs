use glam::Vec3;

use crate::coords::Viewport;
use crate::paint::{Color, Rgba8};
use crate::scene::{NodeKind, StagingScene};

use super::{RenderCtx, SceneLights};

/// A projected vertex in screen space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

/// Color + depth attachments for one frame.
pub struct FrameTarget<'a> {
    pub viewport: Viewport,
    pub color: &'a mut [Rgba8],
    pub depth: &'a mut [f32],
}

/// What one `draw_scene` call produced.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub triangles: usize,
    pub points: usize,
}

impl<'a> FrameTarget<'a> {
    pub fn new(viewport: Viewport, color: &'a mut [Rgba8], depth: &'a mut [f32]) -> Self {
        debug_assert_eq!(color.len(), viewport.pixel_count());
        debug_assert_eq!(depth.len(), viewport.pixel_count());
        Self {
            viewport,
            color,
            depth,
        }
    }

    pub fn clear(&mut self, background: Color) {
        self.color.fill(background.to_rgba8());
        self.depth.fill(f32::INFINITY);
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.viewport.width as usize + x
    }

    /// Fills a triangle with one color, depth-tested. Both windings draw.
    pub fn fill_triangle(&mut self, v: [ScreenVertex; 3], color: Rgba8) -> bool {
        let area = edge(v[0], v[1], v[2].x, v[2].y);
        if area.abs() < 1e-6 {
            return false;
        }

        let w = self.viewport.width as f32;
        let h = self.viewport.height as f32;
        let min_x = v.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0);
        let max_x = v.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil().min(w);
        let min_y = v.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor().max(0.0);
        let max_y = v.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil().min(h);
        if min_x >= max_x || min_y >= max_y {
            return false;
        }

        let inv_area = 1.0 / area;
        let mut touched = false;
        for py in min_y as usize..max_y as usize {
            let cy = py as f32 + 0.5;
            for px in min_x as usize..max_x as usize {
                let cx = px as f32 + 0.5;
                let b0 = edge(v[1], v[2], cx, cy) * inv_area;
                let b1 = edge(v[2], v[0], cx, cy) * inv_area;
                let b2 = edge(v[0], v[1], cx, cy) * inv_area;
                if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
                    continue;
                }
                let z = b0 * v[0].depth + b1 * v[1].depth + b2 * v[2].depth;
                let i = self.index(px, py);
                if z < self.depth[i] {
                    self.depth[i] = z;
                    self.color[i] = color;
                    touched = true;
                }
            }
        }
        touched
    }

    /// Draws a square splat centred on `v`.
    ///
    /// Additive splats blend onto the color buffer and leave depth untouched.
    pub fn splat(&mut self, v: ScreenVertex, size: f32, color: Rgba8, additive: bool) {
        let half = (size.max(1.0)) * 0.5;
        let w = self.viewport.width as f32;
        let h = self.viewport.height as f32;
        let x0 = (v.x - half).floor().max(0.0);
        let x1 = (v.x + half).ceil().min(w);
        let y0 = (v.y - half).floor().max(0.0);
        let y1 = (v.y + half).ceil().min(h);

        for py in y0 as usize..y1.max(y0) as usize {
            for px in x0 as usize..x1.max(x0) as usize {
                let i = self.index(px, py);
                if v.depth >= self.depth[i] {
                    continue;
                }
                if additive {
                    self.color[i] = self.color[i].saturating_add(color);
                } else {
                    self.depth[i] = v.depth;
                    self.color[i] = color;
                }
            }
        }
    }
}

#[inline]
fn edge(a: ScreenVertex, b: ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

/// Clears the target to the scene background and draws every visible node.
///
/// Meshes draw first in insertion order, then opaque point clouds, then
/// additive point clouds so glow lands on top of solid geometry.
pub fn draw_scene(target: &mut FrameTarget<'_>, ctx: &RenderCtx, scene: &StagingScene) -> FrameStats {
    target.clear(scene.background());

    let lights = SceneLights::collect(scene);
    let mut stats = FrameStats::default();

    for (_, node) in scene.iter() {
        if !node.visible {
            continue;
        }
        let NodeKind::Mesh(mesh) = &node.kind else { continue };
        let model = node.transform.matrix();

        mesh.geometry.for_each_triangle(|local, slot| {
            let Some(material) = mesh.materials.get(slot) else { return };
            let world = local.map(|p| model.transform_point3(p));

            let mut normal = (world[1] - world[0]).cross(world[2] - world[0]).normalize_or_zero();
            if normal == Vec3::ZERO {
                return;
            }
            let centroid = (world[0] + world[1] + world[2]) / 3.0;
            if normal.dot(ctx.eye - centroid) < 0.0 {
                normal = -normal;
            }

            let (Some(a), Some(b), Some(c)) =
                (ctx.project(world[0]), ctx.project(world[1]), ctx.project(world[2]))
            else {
                return;
            };

            let color = lights.shade(material, normal, centroid).to_rgba8();
            if target.fill_triangle([a, b, c], color) {
                stats.triangles += 1;
            }
        });
    }

    for additive_pass in [false, true] {
        for (_, node) in scene.iter() {
            if !node.visible {
                continue;
            }
            let NodeKind::Points(points) = &node.kind else { continue };
            if points.material.additive != additive_pass {
                continue;
            }
            let model = node.transform.matrix();
            let colors = points.geometry.colors();

            for (i, p) in points.geometry.positions().iter().enumerate() {
                let Some(sv) = ctx.project(model.transform_point3(*p)) else { continue };
                let mut color = points.material.color;
                if points.material.vertex_colors {
                    if let Some(vc) = colors.get(i) {
                        color = color * *vc;
                    }
                }
                target.splat(sv, points.material.size, color.to_rgba8(), additive_pass);
                stats.points += 1;
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, Light, Material, Node, PerspectiveCamera, PointsMaterial};

    fn buffers(vp: Viewport) -> (Vec<Rgba8>, Vec<f32>) {
        (vec![Rgba8::default(); vp.pixel_count()], vec![0.0; vp.pixel_count()])
    }

    fn center(vp: Viewport, color: &[Rgba8]) -> Rgba8 {
        color[(vp.height / 2 * vp.width + vp.width / 2) as usize]
    }

    #[test]
    fn empty_scene_is_background() {
        let vp = Viewport::new(16, 16);
        let (mut color, mut depth) = buffers(vp);
        let scene = StagingScene::default();
        let ctx = RenderCtx::new(vp, &PerspectiveCamera::new(vp.aspect()));

        let stats = draw_scene(&mut FrameTarget::new(vp, &mut color, &mut depth), &ctx, &scene);

        assert_eq!(stats, FrameStats::default());
        assert!(color.iter().all(|p| *p == Rgba8::new(0x11, 0x11, 0x11, 0xff)));
    }

    #[test]
    fn unlit_plane_covers_center() {
        let vp = Viewport::new(32, 32);
        let (mut color, mut depth) = buffers(vp);
        let mut scene = StagingScene::default();
        scene.add(Node::mesh(Geometry::plane(4.0, 4.0), Material::unlit(Color::from_hex(0xff0000))));
        let ctx = RenderCtx::new(vp, &PerspectiveCamera::new(vp.aspect()));

        let stats = draw_scene(&mut FrameTarget::new(vp, &mut color, &mut depth), &ctx, &scene);

        assert_eq!(stats.triangles, 2);
        assert_eq!(center(vp, &color), Rgba8::new(255, 0, 0, 255));
    }

    #[test]
    fn nearer_triangle_wins_regardless_of_order() {
        let vp = Viewport::new(32, 32);
        let (mut color, mut depth) = buffers(vp);
        let mut scene = StagingScene::default();
        scene.add(Node::mesh(Geometry::plane(4.0, 4.0), Material::unlit(Color::from_hex(0x0000ff))).at(Vec3::Z * 2.0));
        scene.add(Node::mesh(Geometry::plane(4.0, 4.0), Material::unlit(Color::from_hex(0xff0000))));
        let ctx = RenderCtx::new(vp, &PerspectiveCamera::new(vp.aspect()));

        draw_scene(&mut FrameTarget::new(vp, &mut color, &mut depth), &ctx, &scene);

        assert_eq!(center(vp, &color), Rgba8::new(0, 0, 255, 255));
    }

    #[test]
    fn lit_mesh_without_lights_is_black() {
        let vp = Viewport::new(32, 32);
        let (mut color, mut depth) = buffers(vp);
        let mut scene = StagingScene::default();
        scene.add(Node::mesh(Geometry::icosahedron(1.5), Material::lit(Color::WHITE)));
        let ctx = RenderCtx::new(vp, &PerspectiveCamera::new(vp.aspect()));

        draw_scene(&mut FrameTarget::new(vp, &mut color, &mut depth), &ctx, &scene);
        assert_eq!(center(vp, &color), Rgba8::new(0, 0, 0, 255));

        scene.add(Node::light(Light::ambient(Color::WHITE, 1.0)));
        draw_scene(&mut FrameTarget::new(vp, &mut color, &mut depth), &ctx, &scene);
        assert_eq!(center(vp, &color), Rgba8::new(255, 255, 255, 255));
    }

    #[test]
    fn hidden_nodes_are_skipped() {
        let vp = Viewport::new(16, 16);
        let (mut color, mut depth) = buffers(vp);
        let mut scene = StagingScene::default();
        let mut node = Node::mesh(Geometry::plane(4.0, 4.0), Material::unlit(Color::WHITE));
        node.visible = false;
        scene.add(node);
        let ctx = RenderCtx::new(vp, &PerspectiveCamera::new(vp.aspect()));

        let stats = draw_scene(&mut FrameTarget::new(vp, &mut color, &mut depth), &ctx, &scene);
        assert_eq!(stats.triangles, 0);
    }

    #[test]
    fn additive_points_brighten_background() {
        let vp = Viewport::new(16, 16);
        let (mut color, mut depth) = buffers(vp);
        let mut scene = StagingScene::new(Color::BLACK);
        let geometry = Geometry::points(vec![Vec3::ZERO, Vec3::ZERO], Vec::new());
        scene.add(Node::points(geometry, PointsMaterial::new(Color::from_hex(0x404040), 4.0).additive()));
        let ctx = RenderCtx::new(vp, &PerspectiveCamera::new(vp.aspect()));

        let stats = draw_scene(&mut FrameTarget::new(vp, &mut color, &mut depth), &ctx, &scene);

        assert_eq!(stats.points, 2);
        assert_eq!(center(vp, &color), Rgba8::new(0x80, 0x80, 0x80, 0xff));
    }

    #[test]
    fn geometry_behind_camera_is_culled() {
        let vp = Viewport::new(16, 16);
        let (mut color, mut depth) = buffers(vp);
        let mut scene = StagingScene::default();
        scene.add(Node::mesh(Geometry::plane(1.0, 1.0), Material::unlit(Color::WHITE)).at(Vec3::new(0.0, 2.0, 20.0)));
        let ctx = RenderCtx::new(vp, &PerspectiveCamera::new(vp.aspect()));

        let stats = draw_scene(&mut FrameTarget::new(vp, &mut color, &mut depth), &ctx, &scene);
        assert_eq!(stats.triangles, 0);
    }
}
