use std::f32::consts::FRAC_PI_2;

use bevy::{
    core_pipeline::{bloom::Bloom, tonemapping::Tonemapping},
    input::{
        mouse::{MouseButton, MouseMotion, MouseScrollUnit, MouseWheel},
        ButtonInput,
    },
    log::debug,
    math::{Vec2, Vec3},
    prelude::{
        Camera, Camera3d, Commands, Component, EventReader, PerspectiveProjection, Projection,
        Query, Res, Transform,
    },
    utils::default,
};
use bevy_flycam::FlyCam;

use crate::{
    data::config::{CameraControl, SceneConfig},
    game::viewport::{SceneCamera, ViewportSize},
};

/// Keeps the camera a little short of straight up or down, where `looking_at`
/// loses its up vector.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
/// Pixel scroll deltas per wheel line.
const PIXELS_PER_LINE: f32 = 100.0;

/// Orbit controls: the camera sits on a sphere around `target`.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    /// Rotation around the Y axis; zero looks down -Z.
    pub yaw: f32,
    pub pitch: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Radians per pixel of mouse drag.
    pub rotate_speed: f32,
    /// Fraction of the radius per wheel line.
    pub zoom_speed: f32,
    /// Fraction of the radius per pixel of right-button drag.
    pub pan_speed: f32,
}

impl OrbitCamera {
    pub fn looking_from(position: Vec3, target: Vec3) -> OrbitCamera {
        let offset = position - target;
        let radius = offset.length().max(f32::EPSILON);
        OrbitCamera {
            target,
            radius,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / radius).clamp(-1.0, 1.0).asin(),
            min_radius: 1.0,
            max_radius: 50.0,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.001,
        }
    }

    /// Drag by `delta` pixels; dragging right swings the camera left around
    /// the target, like grabbing the scene.
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw -= delta.x * self.rotate_speed;
        self.pitch = (self.pitch + delta.y * self.rotate_speed).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Positive `lines` zoom in.
    pub fn zoom(&mut self, lines: f32) {
        let factor = 1.0 - lines * self.zoom_speed;
        self.radius = (self.radius * factor.max(0.1)).clamp(self.min_radius, self.max_radius);
    }

    /// Slides the target (and the camera with it) in the view plane, so the
    /// scene follows the cursor.
    pub fn pan(&mut self, delta: Vec2) {
        let view = self.transform();
        let scale = self.radius * self.pan_speed;
        self.target += (*view.left() * delta.x + *view.up() * delta.y) * scale;
    }

    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + self.radius * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(self.target, Vec3::Y)
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Systems                                  */
/* -------------------------------------------------------------------------- */

pub fn setup_camera(
    mut commands: Commands,
    config: Res<SceneConfig>,
    viewport: Option<Res<ViewportSize>>,
) {
    let aspect_ratio = viewport
        .map(|viewport| viewport.aspect_ratio())
        .unwrap_or(1.0);
    let transform =
        Transform::from_xyz(0.0, 0.0, config.camera_distance).looking_at(Vec3::ZERO, Vec3::Y);

    let mut camera = commands.spawn((
        Camera3d::default(),
        Camera {
            hdr: true,
            ..default()
        },
        Tonemapping::TonyMcMapface,
        Bloom::NATURAL,
        Projection::Perspective(PerspectiveProjection {
            fov: config.camera_fov_degrees.to_radians(),
            near: 0.1,
            far: 1000.0,
            aspect_ratio,
        }),
        transform,
        SceneCamera,
    ));

    match config.camera {
        CameraControl::Orbit => {
            camera.insert(OrbitCamera::looking_from(transform.translation, Vec3::ZERO));
        }
        CameraControl::Fly => {
            camera.insert(FlyCam);
        }
        CameraControl::Fixed => {}
    }
    debug!("Camera spawned with {:?} control", config.camera);
}

pub fn update_orbit_camera(
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    mut cameras: Query<(&mut OrbitCamera, &mut Transform)>,
) {
    let drag: Vec2 = motion.read().map(|event| event.delta).sum();
    let scroll: f32 = wheel
        .read()
        .map(|event| match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / PIXELS_PER_LINE,
        })
        .sum();

    let moved = drag != Vec2::ZERO;
    let rotating = moved && buttons.pressed(MouseButton::Left);
    let panning = moved && buttons.pressed(MouseButton::Right);
    if !rotating && !panning && scroll == 0.0 {
        return;
    }

    for (mut orbit, mut transform) in cameras.iter_mut() {
        if rotating {
            orbit.rotate(drag);
        }
        if panning {
            orbit.pan(drag);
        }
        if scroll != 0.0 {
            orbit.zoom(scroll);
        }
        *transform = orbit.transform();
    }
}
