//! Single-object geometry showcases.

use vitrine_engine::coords::Vec3;
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{
    CameraPose, Geometry, Light, Material, MaterialSet, Node, StagingScene,
};
use vitrine_thumbs::{SceneDescriptor, SceneMetadata, SceneObjects};

pub fn descriptors() -> Vec<SceneDescriptor> {
    vec![
        icosahedron(),
        torus(),
        sphere(),
        cylinder_with_marker(),
        cone(),
        tetrahedron(),
        octahedron(),
        cube_and_sphere(),
        rings(),
    ]
}

fn meta(id: &str, title: &str, description: &str) -> SceneMetadata {
    SceneMetadata::new(id, title)
        .with_description(description)
        .with_categories(["Geometry", "Animation"])
}

/// Ambient fill plus a key light from the upper right.
fn key_lights(scene: &mut StagingScene, created: &mut SceneObjects) {
    created.light(scene.add(Node::light(Light::ambient(Color::WHITE, 0.5))));
    created.light(
        scene.add(Node::light(Light::directional(Color::WHITE, 0.8)).at(Vec3::new(5.0, 5.0, 5.0))),
    );
}

/// Stages `node` under the standard lights.
fn single(scene: &mut StagingScene, node: Node) -> SceneObjects {
    let mut created = SceneObjects::new();
    key_lights(scene, &mut created);
    created.object(scene.add(node));
    created
}

fn icosahedron() -> SceneDescriptor {
    SceneDescriptor::new(meta("001", "Animated Icosahedron", "A rotating icosahedron with sharp edges"))
        .with_setup(|scene| {
            Ok(single(
                scene,
                Node::mesh(Geometry::icosahedron(1.0), Material::lit(Color::from_hex(0x00ff00))),
            ))
        })
        .with_update(|scene, created, t| {
            if let Some(node) = scene.get_mut(created.objects[0]) {
                node.transform.rotation.y = t * 1.5;
            }
        })
}

fn torus() -> SceneDescriptor {
    SceneDescriptor::new(meta("002", "Bouncing Torus", "A torus that bounces up and down"))
        .with_setup(|scene| {
            Ok(single(
                scene,
                Node::mesh(Geometry::torus(1.0, 0.4, 16, 64), Material::lit(Color::from_hex(0x0000ff))),
            ))
        })
        .with_update(|scene, created, t| {
            if let Some(node) = scene.get_mut(created.objects[0]) {
                node.transform.position.y = (t * 2.0).sin() * 0.5;
                node.transform.rotation.x = t * 0.5;
            }
        })
}

fn sphere() -> SceneDescriptor {
    SceneDescriptor::new(meta("003", "Pulsing Sphere", "A sphere that pulses in size"))
        .with_setup(|scene| {
            Ok(single(
                scene,
                Node::mesh(Geometry::sphere(1.0, 32, 24), Material::lit(Color::from_hex(0xffff00))),
            ))
        })
        .with_update(|scene, created, t| {
            if let Some(node) = scene.get_mut(created.objects[0]) {
                node.transform.scale = Vec3::splat(1.0 + t.sin() * 0.2);
                node.transform.rotation.y = t;
            }
        })
}

/// Cylinder with differently colored caps and a marker box riding its rim,
/// so the rotation reads in a still frame.
fn cylinder_with_marker() -> SceneDescriptor {
    const MARKER_RADIUS: f32 = 1.1;

    SceneDescriptor::new(meta(
        "004",
        "Rotating Cylinder with Marker",
        "A cylinder whose rotation is tracked by a small red marker",
    ))
    .with_setup(|scene| {
        let mut created = single(
            scene,
            Node::multi_mesh(
                Geometry::cylinder(1.0, 1.0, 2.0, 32),
                vec![
                    Material::lit(Color::from_hex(0x00ffff)),
                    Material::lit(Color::from_hex(0xe0ffff)),
                    Material::lit(Color::from_hex(0x008b8b)),
                ],
            ),
        );
        created.object(scene.add(
            Node::mesh(Geometry::cuboid(0.2, 0.2, 0.2), Material::lit(Color::from_hex(0xff0000)))
                .at(Vec3::new(MARKER_RADIUS, 0.0, 0.0)),
        ));
        Ok(created)
    })
    .with_update(|scene, created, t| {
        let angle = t * 2.0;
        if let Some(cylinder) = scene.get_mut(created.objects[0]) {
            cylinder.transform.rotation.y = angle;
        }
        if let Some(marker) = scene.get_mut(created.objects[1]) {
            marker.transform.rotation.y = angle;
            marker.transform.position =
                Vec3::new(MARKER_RADIUS * angle.cos(), 0.0, -MARKER_RADIUS * angle.sin());
        }
    })
}

fn cone() -> SceneDescriptor {
    SceneDescriptor::new(meta("005", "Bouncing Cone", "A cone that bounces up and down"))
        .with_setup(|scene| {
            Ok(single(
                scene,
                Node::mesh(Geometry::cone(1.0, 2.0, 32), Material::lit(Color::from_hex(0xff00ff))),
            ))
        })
        .with_update(|scene, created, t| {
            if let Some(node) = scene.get_mut(created.objects[0]) {
                node.transform.position.y = t.cos() * 0.5;
                node.transform.rotation.x = t * 0.5;
            }
        })
}

fn tetrahedron() -> SceneDescriptor {
    SceneDescriptor::new(meta("006", "Spinning Tetrahedron", "A tetrahedron spinning on two axes"))
        .with_setup(|scene| {
            Ok(single(
                scene,
                Node::mesh(Geometry::tetrahedron(1.0), Material::lit(Color::from_hex(0x00ff88))),
            ))
        })
        .with_update(|scene, created, t| {
            if let Some(node) = scene.get_mut(created.objects[0]) {
                node.transform.rotation.x = t * 2.0;
                node.transform.rotation.y = t * 2.0;
            }
        })
}

fn octahedron() -> SceneDescriptor {
    SceneDescriptor::new(meta(
        "007",
        "Color-Changing Octahedron",
        "An octahedron cycling through hues",
    ))
    .with_setup(|scene| {
        Ok(single(
            scene,
            Node::mesh(Geometry::octahedron(1.0), Material::lit(Color::WHITE)),
        ))
    })
    .with_update(|scene, created, t| {
        let Some(node) = scene.get_mut(created.objects[0]) else { return };
        node.transform.rotation.y = t;
        if let Some(MaterialSet::Single(material)) = node.as_mesh_mut().map(|m| &mut m.materials) {
            material.color = Color::from_hsl(t.rem_euclid(1.0), 0.5, 0.5);
        }
    })
}

fn cube_and_sphere() -> SceneDescriptor {
    SceneDescriptor::new(meta("010", "Cube and Sphere Duo", "A tumbling cube next to a bobbing sphere"))
        .with_setup(|scene| {
            let mut created = single(
                scene,
                Node::mesh(Geometry::cuboid(1.5, 1.5, 1.5), Material::lit(Color::from_hex(0xff4444)))
                    .at(Vec3::new(-2.0, 0.0, 0.0)),
            );
            created.object(scene.add(
                Node::mesh(Geometry::sphere(1.0, 32, 24), Material::lit(Color::from_hex(0x44ff44)))
                    .at(Vec3::new(2.0, 0.0, 0.0)),
            ));
            Ok(created)
        })
        .with_update(|scene, created, t| {
            if let Some(cube) = scene.get_mut(created.objects[0]) {
                cube.transform.rotation.x = t;
                cube.transform.rotation.y = t;
            }
            if let Some(ball) = scene.get_mut(created.objects[1]) {
                ball.transform.position.y = (t * 2.0).sin() * 0.5;
                ball.transform.rotation.z = t * 0.5;
            }
        })
}

fn rings() -> SceneDescriptor {
    const RINGS: usize = 8;

    SceneDescriptor::new(meta("014", "Rotating Rings", "Concentric rings tumbling at different rates"))
        .with_camera_pose(CameraPose::new(Vec3::new(0.0, 3.0, 12.0), Vec3::ZERO))
        .with_setup(|scene| {
            let mut created = SceneObjects::new();
            created.light(scene.add(Node::light(Light::ambient(Color::from_hex(0x404040), 1.0))));
            created.light(
                scene.add(Node::light(Light::directional(Color::WHITE, 1.0)).at(Vec3::new(5.0, 5.0, 5.0))),
            );
            for i in 0..RINGS {
                let radius = 1.0 + i as f32 * 0.5;
                let hue = i as f32 / RINGS as f32;
                created.object(scene.add(Node::mesh(
                    Geometry::torus(radius, 0.1, 12, 64),
                    Material::lit(Color::from_hsl(hue, 0.7, 0.5)),
                )));
            }
            Ok(created)
        })
        .with_update(|scene, created, t| {
            for (i, &id) in created.objects.iter().enumerate() {
                let Some(ring) = scene.get_mut(id) else { continue };
                let k = i as f32;
                ring.transform.rotation.x = t * (0.2 + k * 0.1);
                ring.transform.rotation.y = t * (0.3 + k * 0.1);
                ring.transform.scale = Vec3::splat(1.0 + (t * 2.0 + k).sin() * 0.1);
                if let Some(MaterialSet::Single(material)) = ring.as_mesh_mut().map(|m| &mut m.materials) {
                    let hue = (t * 0.1 + k * 0.1).rem_euclid(1.0);
                    material.color = Color::from_hsl(hue, 0.7, 0.5);
                }
            }
        })
}
