use glam::Vec3;

use crate::paint::Color;
use crate::scene::{Light, Material, NodeKind, StagingScene};

#[derive(Debug, Copy, Clone)]
struct Directional {
    /// Unit vector pointing from the surface toward the light.
    to_light: Vec3,
    radiance: Color,
}

#[derive(Debug, Copy, Clone)]
struct PointLight {
    position: Vec3,
    radiance: Color,
    distance: f32,
}

/// Lights collected from a scene once per frame.
#[derive(Debug, Clone, Default)]
pub struct SceneLights {
    ambient: Color,
    directional: Vec<Directional>,
    points: Vec<PointLight>,
}

impl SceneLights {
    pub fn collect(scene: &StagingScene) -> Self {
        let mut lights = SceneLights {
            ambient: Color::BLACK,
            ..Default::default()
        };

        for (_, node) in scene.iter() {
            if !node.visible {
                continue;
            }
            let NodeKind::Light(light) = &node.kind else { continue };
            let position = node.transform.position;
            match *light {
                Light::Ambient { color, intensity } => {
                    lights.ambient = lights.ambient + color.scaled(intensity);
                }
                Light::Directional {
                    color,
                    intensity,
                    target,
                } => {
                    let to_light = (position - target).normalize_or_zero();
                    if to_light != Vec3::ZERO {
                        lights.directional.push(Directional {
                            to_light,
                            radiance: color.scaled(intensity),
                        });
                    }
                }
                Light::Point {
                    color,
                    intensity,
                    distance,
                } => lights.points.push(PointLight {
                    position,
                    radiance: color.scaled(intensity),
                    distance,
                }),
            }
        }

        lights
    }

    /// True when the scene has no light at all; lit materials then render black.
    pub fn is_dark(&self) -> bool {
        self.ambient == Color::BLACK && self.directional.is_empty() && self.points.is_empty()
    }

    /// Flat Lambert shading for one face.
    pub fn shade(&self, material: &Material, normal: Vec3, point: Vec3) -> Color {
        if material.unlit {
            return material.color + material.emissive;
        }

        let mut light = self.ambient;
        for d in &self.directional {
            let k = normal.dot(d.to_light).max(0.0);
            light = light + d.radiance.scaled(k);
        }
        for p in &self.points {
            let delta = p.position - point;
            let dist = delta.length();
            if dist <= f32::EPSILON {
                continue;
            }
            let falloff = if p.distance > 0.0 {
                (1.0 - dist / p.distance).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let k = normal.dot(delta / dist).max(0.0) * falloff;
            light = light + p.radiance.scaled(k);
        }

        let mut c = material.color * light + material.emissive;
        c.a = material.color.a;
        c
    }
}
