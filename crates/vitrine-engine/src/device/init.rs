/// Initialization parameters for offscreen surfaces.
///
/// Keep this structure small. Add options only when a concrete backend needs them.
#[derive(Debug, Clone)]
pub struct SurfaceInit {
    /// Largest accepted width or height, in pixels.
    pub max_dimension: u32,

    /// Label used in log lines about this surface.
    pub label: String,
}

impl Default for SurfaceInit {
    fn default() -> Self {
        Self {
            max_dimension: 4096,
            label: "vitrine offscreen".to_string(),
        }
    }
}
