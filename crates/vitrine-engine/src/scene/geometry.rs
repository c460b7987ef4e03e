use core::f32::consts::{PI, TAU};
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;

use crate::paint::Color;

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique geometry identity.
///
/// Surfaces key their uploaded vertex buffers by this id. Cloning a
/// [`Geometry`] keeps the id, so clones share one upload.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct GeometryId(u64);

impl GeometryId {
    fn next() -> Self {
        Self(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Index range drawn with one entry of a multi-material set.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GeometryGroup {
    /// First index (not triangle) of the range.
    pub start: usize,
    /// Number of indices in the range.
    pub count: usize,
    pub material_index: usize,
}

/// Indexed triangle geometry, or a bare vertex list for point clouds.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    id: GeometryId,
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    /// Optional per-vertex colors (point clouds only).
    colors: Vec<Color>,
    groups: Vec<GeometryGroup>,
}

impl Geometry {
    /// Creates an indexed triangle geometry.
    ///
    /// Out-of-range indices are dropped at draw time rather than rejected here.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            id: GeometryId::next(),
            positions,
            indices,
            colors: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Creates a vertex-only geometry for [`Points`](super::Points).
    ///
    /// `colors` may be empty; otherwise it should match `positions` in length.
    pub fn points(positions: Vec<Vec3>, colors: Vec<Color>) -> Self {
        Self {
            id: GeometryId::next(),
            positions,
            indices: Vec::new(),
            colors,
            groups: Vec::new(),
        }
    }

    /// Assigns index ranges to material slots.
    pub fn with_groups(mut self, groups: Vec<GeometryGroup>) -> Self {
        self.groups = groups;
        self
    }

    #[inline]
    pub fn id(&self) -> GeometryId {
        self.id
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    #[inline]
    pub fn groups(&self) -> &[GeometryGroup] {
        &self.groups
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Visits every triangle with the material slot it belongs to.
    ///
    /// Without groups every triangle uses slot 0. Triangles referencing a
    /// missing vertex are skipped.
    pub fn for_each_triangle(&self, mut f: impl FnMut([Vec3; 3], usize)) {
        let mut emit = |range: core::ops::Range<usize>, slot: usize| {
            let end = range.end.min(self.indices.len());
            let mut i = range.start;
            while i + 3 <= end {
                let tri = [self.indices[i], self.indices[i + 1], self.indices[i + 2]];
                let fetch = |k: u32| self.positions.get(k as usize).copied();
                if let (Some(a), Some(b), Some(c)) = (fetch(tri[0]), fetch(tri[1]), fetch(tri[2])) {
                    f([a, b, c], slot);
                }
                i += 3;
            }
        };

        if self.groups.is_empty() {
            emit(0..self.indices.len(), 0);
        } else {
            for g in &self.groups {
                emit(g.start..g.start + g.count, g.material_index);
            }
        }
    }

    // ── primitives ───────────────────────────────────────────────────────

    /// Axis-aligned box centred on the origin, one material group per face
    /// in +X, -X, +Y, -Y, +Z, -Z order.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);
        // Each face: normal axis, then two in-plane axes.
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::new(hx, 0.0, 0.0), Vec3::new(0.0, 0.0, -hz), Vec3::new(0.0, hy, 0.0)),
            (Vec3::new(-hx, 0.0, 0.0), Vec3::new(0.0, 0.0, hz), Vec3::new(0.0, hy, 0.0)),
            (Vec3::new(0.0, hy, 0.0), Vec3::new(hx, 0.0, 0.0), Vec3::new(0.0, 0.0, -hz)),
            (Vec3::new(0.0, -hy, 0.0), Vec3::new(hx, 0.0, 0.0), Vec3::new(0.0, 0.0, hz)),
            (Vec3::new(0.0, 0.0, hz), Vec3::new(hx, 0.0, 0.0), Vec3::new(0.0, hy, 0.0)),
            (Vec3::new(0.0, 0.0, -hz), Vec3::new(-hx, 0.0, 0.0), Vec3::new(0.0, hy, 0.0)),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        let mut groups = Vec::with_capacity(6);

        for (slot, (n, u, v)) in faces.into_iter().enumerate() {
            let base = positions.len() as u32;
            positions.extend([n - u - v, n + u - v, n + u + v, n - u + v]);
            groups.push(GeometryGroup {
                start: indices.len(),
                count: 6,
                material_index: slot,
            });
            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(positions, indices).with_groups(groups)
    }

    /// Rectangle in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        let (hx, hy) = (width * 0.5, height * 0.5);
        Self::new(
            vec![
                Vec3::new(-hx, -hy, 0.0),
                Vec3::new(hx, -hy, 0.0),
                Vec3::new(hx, hy, 0.0),
                Vec3::new(-hx, hy, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    pub fn tetrahedron(radius: f32) -> Self {
        let v = [
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
        ];
        let i = [2, 1, 0, 0, 3, 2, 1, 3, 0, 2, 3, 1];
        Self::polyhedron(&v, &i, radius)
    }

    pub fn octahedron(radius: f32) -> Self {
        let v = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
        let i = [
            0, 2, 4, 0, 4, 3, 0, 3, 5, 0, 5, 2, 1, 2, 5, 1, 5, 3, 1, 3, 4, 1, 4, 2,
        ];
        Self::polyhedron(&v, &i, radius)
    }

    pub fn icosahedron(radius: f32) -> Self {
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let v = [
            Vec3::new(-1.0, t, 0.0),
            Vec3::new(1.0, t, 0.0),
            Vec3::new(-1.0, -t, 0.0),
            Vec3::new(1.0, -t, 0.0),
            Vec3::new(0.0, -1.0, t),
            Vec3::new(0.0, 1.0, t),
            Vec3::new(0.0, -1.0, -t),
            Vec3::new(0.0, 1.0, -t),
            Vec3::new(t, 0.0, -1.0),
            Vec3::new(t, 0.0, 1.0),
            Vec3::new(-t, 0.0, -1.0),
            Vec3::new(-t, 0.0, 1.0),
        ];
        let i = [
            0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7,
            6, 7, 1, 8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10,
            8, 6, 7, 9, 8, 1,
        ];
        Self::polyhedron(&v, &i, radius)
    }

    fn polyhedron(vertices: &[Vec3], indices: &[u32], radius: f32) -> Self {
        let positions = vertices.iter().map(|v| v.normalize() * radius).collect();
        Self::new(positions, indices.to_vec())
    }

    /// UV sphere. Segment counts are clamped to sane minimums.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);

        let mut positions = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                positions.push(Vec3::new(
                    -radius * (u * TAU).cos() * (v * PI).sin(),
                    radius * (v * PI).cos(),
                    radius * (u * TAU).sin() * (v * PI).sin(),
                ));
            }
        }

        let row = ws + 1;
        let mut indices = Vec::new();
        for iy in 0..hs {
            for ix in 0..ws {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                // Pole rows collapse to one triangle per cell.
                if iy != 0 {
                    indices.extend([a, b, d]);
                }
                if iy != hs - 1 {
                    indices.extend([b, c, d]);
                }
            }
        }

        Self::new(positions, indices)
    }

    /// Torus around the Z axis.
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let rs = radial_segments.max(3);
        let ts = tubular_segments.max(3);

        let mut positions = Vec::with_capacity(((rs + 1) * (ts + 1)) as usize);
        for j in 0..=rs {
            let v = j as f32 / rs as f32 * TAU;
            for i in 0..=ts {
                let u = i as f32 / ts as f32 * TAU;
                positions.push(Vec3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                ));
            }
        }

        let row = ts + 1;
        let mut indices = Vec::with_capacity((rs * ts * 6) as usize);
        for j in 1..=rs {
            for i in 1..=ts {
                let a = row * j + i - 1;
                let b = row * (j - 1) + i - 1;
                let c = row * (j - 1) + i;
                let d = row * j + i;
                indices.extend([a, b, d, b, c, d]);
            }
        }

        Self::new(positions, indices)
    }

    /// Open-ended side plus caps; groups are side (0), top cap (1), bottom cap (2).
    /// A zero radius omits that cap, which turns the cylinder into a cone.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Self {
        let seg = segments.max(3);
        let half = height * 0.5;
        let ring = |r: f32, y: f32| -> Vec<Vec3> {
            (0..=seg)
                .map(|i| {
                    let theta = i as f32 / seg as f32 * TAU;
                    Vec3::new(r * theta.sin(), y, r * theta.cos())
                })
                .collect()
        };

        let mut positions = ring(radius_top, half);
        positions.extend(ring(radius_bottom, -half));

        let row = seg + 1;
        let mut indices = Vec::new();
        for i in 0..seg {
            let (a, b, c, d) = (i, row + i, row + i + 1, i + 1);
            indices.extend([a, b, d, b, c, d]);
        }
        let mut groups = vec![GeometryGroup {
            start: 0,
            count: indices.len(),
            material_index: 0,
        }];

        for (slot, (r, y)) in [(radius_top, half), (radius_bottom, -half)].into_iter().enumerate() {
            if r <= 0.0 {
                continue;
            }
            let center = positions.len() as u32;
            positions.push(Vec3::new(0.0, y, 0.0));
            let start = indices.len();
            let rim = center + 1;
            positions.extend(ring(r, y));
            for i in 0..seg {
                indices.extend([center, rim + i, rim + i + 1]);
            }
            groups.push(GeometryGroup {
                start,
                count: indices.len() - start,
                material_index: slot + 1,
            });
        }

        Self::new(positions, indices).with_groups(groups)
    }

    #[inline]
    pub fn cone(radius: f32, height: f32, segments: u32) -> Self {
        Self::cylinder(0.0, radius, height, segments)
    }
}
