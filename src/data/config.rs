use bevy::{log::warn, math::Vec3, prelude::Resource};

use super::beam::{BEAM_COUNT, BEAM_RADIUS};

/* -------------------------------------------------------------------------- */
/*                                   Options                                  */
/* -------------------------------------------------------------------------- */

/// Where the beam animation reads its time from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSource {
    /// Seconds since the app started. Beams start at phase zero.
    #[default]
    Elapsed,
    /// Seconds since the Unix epoch, so every viewer sees the same phase.
    Wall,
}

/// How the user can move the scene camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraControl {
    /// Drag with the left mouse button to orbit, scroll to zoom.
    #[default]
    Orbit,
    /// Free flight (WASD + mouse look).
    Fly,
    Fixed,
}

/* -------------------------------------------------------------------------- */
/*                                 SceneConfig                                */
/* -------------------------------------------------------------------------- */

/// Tunables for the scene. Read once at startup, except for the per-tick
/// values (spin step, clock) which the animation systems read every frame.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub beam_count: usize,
    pub beam_radius: f32,
    /// Diameter of the cylinder drawn for each beam, in world units.
    pub beam_width: f32,
    /// Multiplier applied to the beam hue to drive bloom.
    pub beam_glow: f32,
    /// Radians added to each cube axis per tick.
    pub spin_step: Vec3,
    /// Adjacent faces whose normals differ by more than this get an edge line.
    pub edge_threshold_degrees: f32,
    pub cube_opacity: f32,
    pub clock: ClockSource,
    pub camera: CameraControl,
    pub camera_distance: f32,
    pub camera_fov_degrees: f32,
    pub show_debug: bool,
    /// Number of ticks the profiler keeps per monitor.
    pub profiler_history: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            beam_count: BEAM_COUNT,
            beam_radius: BEAM_RADIUS,
            beam_width: 0.02,
            beam_glow: 6.0,
            spin_step: Vec3::splat(0.01),
            edge_threshold_degrees: 1.0,
            cube_opacity: 0.5,
            clock: ClockSource::Elapsed,
            camera: CameraControl::Orbit,
            camera_distance: 5.0,
            camera_fov_degrees: 75.0,
            show_debug: false,
            profiler_history: 300,
        }
    }
}

impl SceneConfig {
    /// Replaces out-of-range values with their defaults (or clamps them),
    /// logging a warning for every field it touches.
    pub fn sanitized(mut self) -> Self {
        let defaults = SceneConfig::default();

        if self.beam_count == 0 {
            warn!("beam_count must be at least 1, using {}", defaults.beam_count);
            self.beam_count = defaults.beam_count;
        }
        if !(self.beam_radius.is_finite() && self.beam_radius > 0.0) {
            warn!(
                "beam_radius {} is not a positive number, using {}",
                self.beam_radius, defaults.beam_radius
            );
            self.beam_radius = defaults.beam_radius;
        }
        if !(self.beam_width.is_finite() && self.beam_width > 0.0) {
            warn!(
                "beam_width {} is not a positive number, using {}",
                self.beam_width, defaults.beam_width
            );
            self.beam_width = defaults.beam_width;
        }
        if !self.spin_step.is_finite() {
            warn!("spin_step {:?} is not finite, using {:?}", self.spin_step, defaults.spin_step);
            self.spin_step = defaults.spin_step;
        }
        if !(0.0..=1.0).contains(&self.cube_opacity) {
            let clamped = if self.cube_opacity.is_nan() {
                defaults.cube_opacity
            } else {
                self.cube_opacity.clamp(0.0, 1.0)
            };
            warn!("cube_opacity {} out of [0, 1], using {}", self.cube_opacity, clamped);
            self.cube_opacity = clamped;
        }
        if !(self.camera_distance.is_finite() && self.camera_distance > 0.0) {
            warn!(
                "camera_distance {} is not a positive number, using {}",
                self.camera_distance, defaults.camera_distance
            );
            self.camera_distance = defaults.camera_distance;
        }
        if !(self.camera_fov_degrees > 0.0 && self.camera_fov_degrees < 180.0) {
            warn!(
                "camera_fov_degrees {} out of (0, 180), using {}",
                self.camera_fov_degrees, defaults.camera_fov_degrees
            );
            self.camera_fov_degrees = defaults.camera_fov_degrees;
        }
        if self.profiler_history == 0 {
            warn!("profiler_history must be at least 1, using {}", defaults.profiler_history);
            self.profiler_history = defaults.profiler_history;
        }

        self
    }
}
