use glam::Vec3;

use crate::paint::Color;

/// Light sources. Position comes from the owning node's transform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Light {
    /// Uniform light from every direction.
    Ambient { color: Color, intensity: f32 },
    /// Parallel rays from the node position toward `target`.
    Directional {
        color: Color,
        intensity: f32,
        target: Vec3,
    },
    /// Omni light; `distance == 0` means no falloff.
    Point {
        color: Color,
        intensity: f32,
        distance: f32,
    },
}

impl Light {
    #[inline]
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Light::Ambient { color, intensity }
    }

    /// Directional light aimed at the origin.
    #[inline]
    pub fn directional(color: Color, intensity: f32) -> Self {
        Light::Directional {
            color,
            intensity,
            target: Vec3::ZERO,
        }
    }

    #[inline]
    pub fn point(color: Color, intensity: f32, distance: f32) -> Self {
        Light::Point {
            color,
            intensity,
            distance,
        }
    }
}
