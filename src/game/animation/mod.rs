use std::f32::consts::TAU;

use bevy::{
    app::{App, Plugin, Update},
    math::{EulerRot, Quat, Vec3},
    prelude::{
        Component, Entity, IntoSystemConfigs, IntoSystemSetConfigs, Query, Res, ResMut,
        SystemSet, Transform, With, Without,
    },
    time::{Real, Time},
    utils::SystemTime,
};

use crate::{
    data::{
        beam::{beam_angle, beam_endpoints, beam_transform, phase},
        config::{ClockSource, SceneConfig},
    },
    game::perf::Profiler,
};

/* -------------------------------------------------------------------------- */
/*                                 Components                                 */
/* -------------------------------------------------------------------------- */

/// The spinning cube.
///
/// `rotation` is the per-axis angle accumulator (XYZ order, radians). It is
/// kept in `[0, 2π)` so long sessions don't lose precision.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Cube {
    pub rotation: Vec3,
}

impl Cube {
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }
}

/// Outline drawn over a cube; follows the cube's rotation every tick.
#[derive(Component, Debug, Clone, Copy)]
pub struct EdgeOverlay {
    pub cube: Entity,
}

/// One laser beam, a diameter of the beam circle.
#[derive(Component, Debug, Clone, Copy)]
pub struct Beam {
    pub index: usize,
    pub endpoints: [Vec3; 2],
}

impl Beam {
    pub fn new(index: usize) -> Beam {
        Beam {
            index,
            endpoints: [Vec3::ZERO; 2],
        }
    }

    /// Current angle of the beam in `(-π, π]`.
    pub fn angle(&self) -> f32 {
        let tip = self.endpoints[1];
        tip.y.atan2(tip.x)
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Plugin                                   */
/* -------------------------------------------------------------------------- */

/// Order of the per-tick work. Edges must see the cube's new rotation.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnimationSet {
    SpinCube,
    SyncEdges,
    UpdateBeams,
}

pub struct AnimationPlugin {}

impl Default for AnimationPlugin {
    fn default() -> Self {
        AnimationPlugin {}
    }
}

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneConfig>();
        app.init_resource::<Profiler>();
        app.configure_sets(
            Update,
            (
                AnimationSet::SpinCube,
                AnimationSet::SyncEdges,
                AnimationSet::UpdateBeams,
            )
                .chain(),
        );
        app.add_systems(Update, sys_spin_cube.in_set(AnimationSet::SpinCube));
        app.add_systems(Update, sys_sync_edges.in_set(AnimationSet::SyncEdges));
        app.add_systems(Update, sys_update_beams.in_set(AnimationSet::UpdateBeams));
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Systems                                  */
/* -------------------------------------------------------------------------- */

/// Seconds fed into the beam animation for this tick.
///
/// `Elapsed` reads the real clock: the virtual clock clamps each frame to
/// `max_delta`, so it falls behind after a stall.
pub fn clock_seconds(source: ClockSource, time: &Time<Real>) -> f64 {
    match source {
        ClockSource::Elapsed => time.elapsed_secs_f64(),
        ClockSource::Wall => SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|since_epoch| since_epoch.as_secs_f64())
            .unwrap_or_default(),
    }
}

fn wrap_angles(angles: Vec3) -> Vec3 {
    Vec3::new(
        angles.x.rem_euclid(TAU),
        angles.y.rem_euclid(TAU),
        angles.z.rem_euclid(TAU),
    )
}

pub fn sys_spin_cube(
    config: Res<SceneConfig>,
    mut profiler: ResMut<Profiler>,
    mut cubes: Query<(&mut Cube, &mut Transform)>,
) {
    let _recorder = profiler.record("Animation::spin_cube");

    for (mut cube, mut transform) in cubes.iter_mut() {
        cube.rotation = wrap_angles(cube.rotation + config.spin_step);
        transform.rotation = cube.quat();
    }
}

pub fn sys_sync_edges(
    mut profiler: ResMut<Profiler>,
    cubes: Query<&Transform, (With<Cube>, Without<EdgeOverlay>)>,
    mut overlays: Query<(&EdgeOverlay, &mut Transform), Without<Cube>>,
) {
    let _recorder = profiler.record("Animation::sync_edges");

    for (overlay, mut transform) in overlays.iter_mut() {
        if let Ok(cube) = cubes.get(overlay.cube) {
            transform.rotation = cube.rotation;
        }
    }
}

pub fn sys_update_beams(
    time: Res<Time<Real>>,
    config: Res<SceneConfig>,
    mut profiler: ResMut<Profiler>,
    mut beams: Query<(&mut Beam, &mut Transform)>,
) {
    let _recorder = profiler.record("Animation::update_beams");

    let t = phase(clock_seconds(config.clock, &time));
    for (mut beam, mut transform) in beams.iter_mut() {
        let angle = beam_angle(beam.index, config.beam_count, t);
        beam.endpoints = beam_endpoints(angle, config.beam_radius);
        *transform = beam_transform(beam.endpoints);
    }
}

#[cfg(test)]
mod tests {
    use std::{f32::consts::FRAC_PI_2, time::Duration};

    use bevy::{time::TimeUpdateStrategy, MinimalPlugins};

    use super::*;

    const EPSILON: f32 = 1e-4;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        // Freeze time at zero so beam positions are deterministic
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::ZERO));
        app.add_plugins(AnimationPlugin::default());
        app
    }

    fn spawn_cube_with_overlay(app: &mut App) -> (Entity, Entity) {
        let cube = app
            .world_mut()
            .spawn((Cube::default(), Transform::default()))
            .id();
        let overlay = app
            .world_mut()
            .spawn((EdgeOverlay { cube }, Transform::default()))
            .id();
        (cube, overlay)
    }

    fn angle_distance(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    #[test]
    fn cube_rotation_is_tick_count_times_step() {
        let mut app = app();
        let (cube, _) = spawn_cube_with_overlay(&mut app);

        for n in 1..=1000u32 {
            app.update();
            if n % 100 == 0 {
                let rotation = app.world().get::<Cube>(cube).map(|c| c.rotation);
                let rotation = rotation.expect("cube exists");
                let expected = (n as f32 * 0.01).rem_euclid(TAU);
                for axis in rotation.to_array() {
                    assert!(
                        angle_distance(axis, expected) < 1e-3,
                        "tick {n}: {axis} vs {expected}"
                    );
                }
            }
        }
    }

    #[test]
    fn cube_rotation_stays_wrapped() {
        let mut app = app();
        app.insert_resource(SceneConfig {
            spin_step: Vec3::new(1.0, -1.0, 0.5),
            ..Default::default()
        });
        let (cube, _) = spawn_cube_with_overlay(&mut app);

        for _ in 0..50 {
            app.update();
            let rotation = app.world().get::<Cube>(cube).map(|c| c.rotation);
            let rotation = rotation.expect("cube exists");
            for axis in rotation.to_array() {
                assert!((0.0..TAU).contains(&axis), "{axis} escaped [0, 2π)");
            }
        }
    }

    #[test]
    fn overlay_follows_cube_every_tick() {
        let mut app = app();
        let (cube, overlay) = spawn_cube_with_overlay(&mut app);

        for _ in 0..20 {
            app.update();
            let cube_rotation = app.world().get::<Transform>(cube).map(|t| t.rotation);
            let overlay_rotation = app.world().get::<Transform>(overlay).map(|t| t.rotation);
            assert!(cube_rotation.is_some());
            assert_eq!(cube_rotation, overlay_rotation);
            // Synced after the increment, not a tick behind
            assert_ne!(cube_rotation, Some(Quat::IDENTITY));
        }
    }

    #[test]
    fn beams_at_time_zero_match_reference_positions() {
        let mut app = app();
        let beams: Vec<Entity> = (0..4)
            .map(|i| {
                app.world_mut()
                    .spawn((Beam::new(i), Transform::default()))
                    .id()
            })
            .collect();

        app.update();

        let first = app.world().get::<Beam>(beams[0]).map(|b| b.endpoints);
        let first = first.expect("beam exists");
        assert!(first[0].abs_diff_eq(Vec3::new(-2.5, 0.0, 0.0), EPSILON));
        assert!(first[1].abs_diff_eq(Vec3::new(2.5, 0.0, 0.0), EPSILON));

        let second = app.world().get::<Beam>(beams[1]).map(|b| b.endpoints);
        let second = second.expect("beam exists");
        assert!(second[0].abs_diff_eq(Vec3::new(0.0, -2.5, 0.0), EPSILON));
        assert!(second[1].abs_diff_eq(Vec3::new(0.0, 2.5, 0.0), EPSILON));
    }

    #[test]
    fn beams_stay_antipodal_and_evenly_spaced() {
        let mut app = app();
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(37)));
        let beams: Vec<Entity> = (0..4)
            .map(|i| {
                app.world_mut()
                    .spawn((Beam::new(i), Transform::default()))
                    .id()
            })
            .collect();

        for _ in 0..30 {
            app.update();
            let angles: Vec<f32> = beams
                .iter()
                .filter_map(|&e| app.world().get::<Beam>(e).copied())
                .map(|beam| {
                    let [from, to] = beam.endpoints;
                    assert!(from.abs_diff_eq(-to, EPSILON));
                    assert!((to.length() - 2.5).abs() < EPSILON);
                    beam.angle()
                })
                .collect();
            assert_eq!(angles.len(), 4);
            for pair in angles.windows(2) {
                assert!(angle_distance(pair[1] - pair[0], FRAC_PI_2) < EPSILON);
            }
        }
    }

    #[test]
    fn beam_transform_tracks_endpoints() {
        let mut app = app();
        let beam = app
            .world_mut()
            .spawn((Beam::new(1), Transform::default()))
            .id();

        app.update();

        let transform = app.world().get::<Transform>(beam).copied();
        let transform = transform.expect("beam exists");
        let top = transform.transform_point(Vec3::new(0.0, 0.5, 0.0));
        assert!(top.abs_diff_eq(Vec3::new(0.0, 2.5, 0.0), EPSILON));
    }

    #[test]
    fn beam_phase_keeps_up_with_real_time_after_long_frames() {
        let mut app = app();
        // Each step is longer than the virtual clock's max_delta
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs(1)));
        let beam = app
            .world_mut()
            .spawn((Beam::new(0), Transform::default()))
            .id();

        for _ in 0..4 {
            app.update();
        }

        let real = app.world().resource::<Time<Real>>().elapsed_secs();
        assert!((real - 3.0).abs() < EPSILON);
        let angle = app.world().get::<Beam>(beam).map(|b| b.angle());
        let angle = angle.expect("beam exists");
        assert!(angle_distance(angle, real) < EPSILON, "{angle} vs {real}");
    }

    #[test]
    fn wall_clock_is_after_epoch() {
        let time = Time::<Real>::default();
        assert!(clock_seconds(ClockSource::Wall, &time) > 1_600_000_000.0);
        assert_eq!(clock_seconds(ClockSource::Elapsed, &time), 0.0);
    }

    #[test]
    fn systems_report_to_profiler() {
        let mut app = app();
        spawn_cube_with_overlay(&mut app);
        app.update();

        let profiler = app.world().resource::<Profiler>();
        for name in [
            "Animation::spin_cube",
            "Animation::sync_edges",
            "Animation::update_beams",
        ] {
            assert!(profiler.monitor(name).is_some(), "{name} not recorded");
        }
    }
}
