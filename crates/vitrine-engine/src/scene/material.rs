use crate::paint::Color;

/// Surface material for meshes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    /// Added after lighting; lets glowing parts read in dark scenes.
    pub emissive: Color,
    /// Ignore lights entirely (basic material).
    pub unlit: bool,
}

impl Material {
    /// Lit material with the given diffuse color.
    #[inline]
    pub fn lit(color: Color) -> Self {
        Self {
            color,
            emissive: Color::BLACK,
            unlit: false,
        }
    }

    /// Flat color, unaffected by lights.
    #[inline]
    pub fn unlit(color: Color) -> Self {
        Self {
            color,
            emissive: Color::BLACK,
            unlit: true,
        }
    }

    #[inline]
    pub fn with_emissive(mut self, emissive: Color) -> Self {
        self.emissive = emissive;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::lit(Color::WHITE)
    }
}

/// One material, or one per geometry group.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialSet {
    Single(Material),
    Multi(Vec<Material>),
}

impl MaterialSet {
    /// Material for a geometry group slot.
    ///
    /// `Single` answers every slot; `Multi` answers `None` past its end, and
    /// the rasterizer skips those triangles.
    #[inline]
    pub fn get(&self, slot: usize) -> Option<&Material> {
        match self {
            MaterialSet::Single(m) => Some(m),
            MaterialSet::Multi(ms) => ms.get(slot),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            MaterialSet::Single(_) => 1,
            MaterialSet::Multi(ms) => ms.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Material> for MaterialSet {
    fn from(m: Material) -> Self {
        MaterialSet::Single(m)
    }
}

impl From<Vec<Material>> for MaterialSet {
    fn from(ms: Vec<Material>) -> Self {
        MaterialSet::Multi(ms)
    }
}

/// Material for point clouds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointsMaterial {
    pub color: Color,
    /// Splat edge length in pixels.
    pub size: f32,
    /// Multiply by per-vertex colors when the geometry has them.
    pub vertex_colors: bool,
    /// Add onto the color buffer without depth writes (glow, nebulae).
    pub additive: bool,
}

impl PointsMaterial {
    #[inline]
    pub fn new(color: Color, size: f32) -> Self {
        Self {
            color,
            size,
            vertex_colors: false,
            additive: false,
        }
    }

    #[inline]
    pub fn with_vertex_colors(mut self) -> Self {
        self.vertex_colors = true;
        self
    }

    #[inline]
    pub fn additive(mut self) -> Self {
        self.additive = true;
        self
    }
}
