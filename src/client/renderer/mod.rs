use bevy::{
    app::{App, Plugin, Startup},
    asset::Assets,
    color::Color,
    log::{info, warn},
    math::Vec3,
    pbr::{AmbientLight, MeshMaterial3d, PointLight, StandardMaterial},
    prelude::{AlphaMode, Commands, Cuboid, Cylinder, Mesh, Mesh3d, Res, ResMut, Transform},
    utils::default,
};

use crate::{
    data::{beam::beam_hue, config::SceneConfig, edges::edges_mesh},
    game::animation::{Beam, Cube, EdgeOverlay},
};

/// Brightness of the white ambient fill.
const AMBIENT_BRIGHTNESS: f32 = 400.0;
const POINT_LIGHT_INTENSITY: f32 = 250_000.0;
const POINT_LIGHT_POSITION: Vec3 = Vec3::new(0.0, 0.0, 2.0);
const POINT_LIGHT_RANGE: f32 = 100.0;

/// Builds the cube, its edge outline, the beams and the lights once at
/// startup. The animation systems take it from there.
pub struct SceneRenderer {}

impl Default for SceneRenderer {
    fn default() -> Self {
        SceneRenderer {}
    }
}

impl Plugin for SceneRenderer {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneConfig>();
        app.add_systems(Startup, sys_setup);
    }
}

/// Glass-like material for the cube.
pub fn cube_material(opacity: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 1.0, opacity),
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 0.05,
        reflectance: 1.0,
        ..default()
    }
}

pub fn edge_material() -> StandardMaterial {
    StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 1.0, 0.5),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    }
}

/// Emissive material in the beam's hue; `glow` scales the emission past 1.0
/// so the camera's bloom picks it up.
pub fn beam_material(index: usize, count: usize, glow: f32) -> StandardMaterial {
    let color = Color::hsl(beam_hue(index, count), 1.0, 0.5);
    StandardMaterial {
        base_color: color,
        emissive: color.to_linear() * glow,
        ..default()
    }
}

fn sys_setup(
    mut commands: Commands,
    config: Res<SceneConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: AMBIENT_BRIGHTNESS,
    });
    commands.spawn((
        PointLight {
            color: Color::WHITE,
            intensity: POINT_LIGHT_INTENSITY,
            range: POINT_LIGHT_RANGE,
            ..default()
        },
        Transform::from_translation(POINT_LIGHT_POSITION),
    ));

    // cube
    let cube_mesh = Mesh::from(Cuboid::new(1.0, 1.0, 1.0));
    let outline = edges_mesh(&cube_mesh, config.edge_threshold_degrees);
    if outline.count_vertices() == 0 {
        warn!("Cube mesh produced no edges, the outline will be invisible");
    }

    let cube = commands
        .spawn((
            Mesh3d(meshes.add(cube_mesh)),
            MeshMaterial3d(materials.add(cube_material(config.cube_opacity))),
            Transform::default(),
            Cube::default(),
        ))
        .id();

    // glowing edges
    commands.spawn((
        Mesh3d(meshes.add(outline)),
        MeshMaterial3d(materials.add(edge_material())),
        Transform::default(),
        EdgeOverlay { cube },
    ));

    // beams
    let beam_mesh = meshes.add(Cylinder::new(config.beam_width * 0.5, 1.0));
    for index in 0..config.beam_count {
        commands.spawn((
            Mesh3d(beam_mesh.clone()),
            MeshMaterial3d(materials.add(beam_material(index, config.beam_count, config.beam_glow))),
            Transform::default(),
            Beam::new(index),
        ));
    }

    info!(
        "Scene assembled: cube, outline, {} beams on radius {}",
        config.beam_count, config.beam_radius
    );
}
