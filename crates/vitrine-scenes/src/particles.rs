//! Particle-cloud scenes.
//!
//! Positions come from a seeded RNG so every thumbnail of a scene is the same
//! image.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vitrine_engine::coords::Vec3;
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{CameraPose, Geometry, Light, Material, Node, PointsMaterial};
use vitrine_thumbs::{SceneDescriptor, SceneMetadata, SceneObjects};

const NEBULA_PARTICLES: usize = 5000;
const NEBULA_RADIUS: f32 = 5.0;
const NEBULA_STARS: usize = 1500;
const SNOWFLAKES: usize = 5000;

pub fn descriptors() -> Vec<SceneDescriptor> {
    vec![nebula(), snow()]
}

/// Blue core fading through violet and pink to cyan at the rim.
fn nebula_color(normalized_distance: f32) -> Color {
    const PALETTE: [u32; 4] = [0x4455dd, 0x9955ff, 0xff5566, 0x22aadd];
    let scaled = normalized_distance.clamp(0.0, 1.0) * PALETTE.len() as f32;
    let index = (scaled.floor() as usize).min(PALETTE.len() - 1);
    let next = (index + 1) % PALETTE.len();
    Color::from_hex(PALETTE[index]).lerp(Color::from_hex(PALETTE[next]), scaled - index as f32)
}

/// Uniform direction, radius biased toward the center.
fn nebula_point(rng: &mut StdRng) -> Vec3 {
    let theta = rng.gen_range(0.0..TAU);
    let phi = (2.0 * rng.r#gen::<f32>() - 1.0).acos();
    let r = rng.r#gen::<f32>().powf(1.5) * NEBULA_RADIUS;
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

fn nebula() -> SceneDescriptor {
    SceneDescriptor::new(
        SceneMetadata::new("019", "Cosmic Nebula Effect")
            .with_description("A glowing particle nebula drifting in front of a star field")
            .with_categories(["Particles", "Animation", "Lighting", "Space"]),
    )
    .with_camera_pose(CameraPose::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO))
    .with_setup(|scene| {
        scene.set_background(Color::from_hex(0x000510));
        let mut rng = StdRng::seed_from_u64(19);
        let mut created = SceneObjects::new();

        created.light(scene.add(Node::light(Light::ambient(Color::from_hex(0x111122), 0.2))));

        let (positions, colors): (Vec<_>, Vec<_>) = (0..NEBULA_PARTICLES)
            .map(|_| {
                let p = nebula_point(&mut rng);
                (p, nebula_color(p.length() / NEBULA_RADIUS))
            })
            .unzip();
        created.object(scene.add(Node::points(
            Geometry::points(positions, colors),
            PointsMaterial::new(Color::WHITE.scaled(0.8), 2.0)
                .with_vertex_colors()
                .additive(),
        )));

        let stars = (0..NEBULA_STARS)
            .map(|_| {
                let dir = Vec3::new(
                    rng.gen_range(-1.0f32..1.0),
                    rng.gen_range(-1.0f32..1.0),
                    rng.gen_range(-1.0f32..1.0),
                )
                .try_normalize()
                .unwrap_or(Vec3::Z);
                dir * rng.gen_range(40.0f32..80.0)
            })
            .collect();
        created.object(scene.add(Node::points(
            Geometry::points(stars, Vec::new()),
            PointsMaterial::new(Color::WHITE, 1.0),
        )));

        // Faint light shaft behind the core.
        created.object(scene.add(
            Node::mesh(
                Geometry::cone(0.5, 5.0, 16),
                Material::unlit(Color::from_hex(0x3366ff).scaled(0.35)),
            )
            .at(Vec3::new(0.0, 0.0, -3.0)),
        ));

        Ok(created)
    })
    .with_update(|scene, created, t| {
        if let Some(cloud) = scene.get_mut(created.objects[0]) {
            cloud.transform.rotation.y = t * 0.05;
            cloud.transform.rotation.z = t * 0.02;
        }
        if let Some(shaft) = scene.get_mut(created.objects[2]) {
            shaft.transform.rotation.z = (t * 0.3).sin() * 0.2;
        }
    })
}

fn snow() -> SceneDescriptor {
    const FIELD: f32 = 30.0;
    const CEILING: f32 = 20.0;

    SceneDescriptor::new(
        SceneMetadata::new("020", "Winter Snow Scene")
            .with_description("Snow drifting down over a white field")
            .with_categories(["Particles", "Animation", "Nature"]),
    )
    .with_camera_pose(CameraPose::new(Vec3::new(8.0, 5.0, 8.0), Vec3::ZERO))
    .with_setup(|scene| {
        scene.set_background(Color::from_hex(0xb0c4de));
        let mut rng = StdRng::seed_from_u64(20);
        let mut created = SceneObjects::new();

        created.light(scene.add(Node::light(Light::ambient(Color::from_hex(0x8899bb), 0.5))));
        created.light(scene.add(
            Node::light(Light::directional(Color::from_hex(0xffffee), 0.8)).at(Vec3::new(5.0, 8.0, 3.0)),
        ));

        created.object(scene.add(
            Node::mesh(Geometry::plane(FIELD, FIELD), Material::lit(Color::WHITE))
                .with_transform(vitrine_engine::coords::Transform::IDENTITY.with_rotation(Vec3::new(
                    -FRAC_PI_2,
                    0.0,
                    0.0,
                ))),
        ));

        let flakes = (0..SNOWFLAKES)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-0.5f32..0.5) * FIELD,
                    rng.gen_range(0.0..CEILING),
                    rng.gen_range(-0.5f32..0.5) * FIELD,
                )
            })
            .collect();
        created.object(scene.add(Node::points(
            Geometry::points(flakes, Vec::new()),
            PointsMaterial::new(Color::WHITE, 2.0),
        )));

        Ok(created)
    })
    .with_update(|scene, created, t| {
        // Drift the whole flurry down and sideways with the wind.
        if let Some(flakes) = scene.get_mut(created.objects[1]) {
            let fall = (t * 0.8).rem_euclid(CEILING * 0.25);
            flakes.transform.position = Vec3::new((t * 0.5).sin() * 0.2, -fall, (t * 0.5).cos() * 0.1);
            flakes.transform.rotation.y = (t * 0.1).rem_euclid(PI);
        }
    })
}

#[cfg(test)]
mod tests {
    use vitrine_engine::paint::Color;
    use vitrine_engine::scene::{NodeKind, StagingScene};

    use super::*;

    #[test]
    fn palette_runs_from_blue_core_to_cyan_rim() {
        assert_eq!(nebula_color(0.0), Color::from_hex(0x4455dd));
        assert_eq!(nebula_color(0.25), Color::from_hex(0x9955ff));
        // Past the last stop the blend wraps back toward the core color.
        assert!(nebula_color(1.0).is_finite());
    }

    #[test]
    fn nebula_points_stay_inside_the_radius() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(nebula_point(&mut rng).length() <= NEBULA_RADIUS + 1e-4);
        }
    }

    #[test]
    fn nebula_is_deterministic_and_sets_its_background() {
        let d = nebula();
        let mut a = StagingScene::default();
        let mut b = StagingScene::default();
        let ca = d.setup().unwrap()(&mut a).unwrap();
        let cb = d.setup().unwrap()(&mut b).unwrap();

        assert_eq!(a.background(), Color::from_hex(0x000510));
        let positions = |scene: &StagingScene, created: &SceneObjects| {
            scene
                .get(created.objects[0])
                .and_then(|n| n.geometry())
                .map(|g| g.positions().to_vec())
                .unwrap()
        };
        let pa = positions(&a, &ca);
        assert_eq!(pa.len(), NEBULA_PARTICLES);
        assert_eq!(pa, positions(&b, &cb));
    }

    #[test]
    fn snow_field_lies_flat() {
        let d = snow();
        let mut scene = StagingScene::default();
        let created = d.setup().unwrap()(&mut scene).unwrap();

        let ground = scene.get(created.objects[0]).unwrap();
        assert!(matches!(ground.kind, NodeKind::Mesh(_)));
        let up = ground.transform.quat() * Vec3::Z;
        assert!((up - Vec3::Y).length() < 1e-5, "{up:?}");
    }
}
