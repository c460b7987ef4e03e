/// Surface size in physical pixels.
///
/// The rasterizer maps NDC to this rectangle with a top-left origin.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width over height; `1.0` for a degenerate viewport.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    #[inline]
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}
