use std::f32::consts::TAU;

use bevy::{
    math::{Quat, Vec3},
    prelude::Transform,
};

pub const BEAM_COUNT: usize = 4;
pub const BEAM_RADIUS: f32 = 2.5;

/* -------------------------------------------------------------------------- */
/*                                  Geometry                                  */
/* -------------------------------------------------------------------------- */

/// Reduces a time in seconds to a phase in `[0, 2π)`.
///
/// The reduction happens in `f64` so that epoch-sized timestamps keep their
/// sub-second precision once they are narrowed to `f32`.
pub fn phase(seconds: f64) -> f32 {
    seconds.rem_euclid(std::f64::consts::TAU) as f32
}

/// Angle of beam `index` out of `count` at phase `t`.
///
/// Beams are spread evenly around the circle and all advance at one radian
/// per second.
pub fn beam_angle(index: usize, count: usize, t: f32) -> f32 {
    index as f32 * (TAU / count as f32) + t
}

/// The two endpoints of a beam at `angle`: a diameter of the circle of
/// `radius` in the z = 0 plane.
pub fn beam_endpoints(angle: f32, radius: f32) -> [Vec3; 2] {
    let (sin, cos) = angle.sin_cos();
    let tip = Vec3::new(radius * cos, radius * sin, 0.0);
    [-tip, tip]
}

/// Hue of beam `index` in degrees.
pub fn beam_hue(index: usize, count: usize) -> f32 {
    index as f32 * 360.0 / count as f32
}

/// Places a unit-height cylinder (centered on the origin, along +Y) so that
/// its caps land on `endpoints`.
pub fn beam_transform(endpoints: [Vec3; 2]) -> Transform {
    let [from, to] = endpoints;
    let span = to - from;
    let length = span.length();

    let rotation = match span.try_normalize() {
        Some(direction) => Quat::from_rotation_arc(Vec3::Y, direction),
        None => Quat::IDENTITY,
    };

    Transform {
        translation: (from + to) * 0.5,
        rotation,
        scale: Vec3::new(1.0, length, 1.0),
    }
}
