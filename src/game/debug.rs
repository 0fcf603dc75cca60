use std::{
    hash::{DefaultHasher, Hasher},
    ops::RangeInclusive,
    time::Duration,
};

use bevy::{
    app::{App, Update},
    prelude::{Query, Res, ResMut, Resource},
    time::Time,
};
use bevy_egui::EguiContexts;
use egui::{Color32, Ui, WidgetText};
use egui_dock::{DockArea, DockState, TabViewer};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot};

use crate::{
    data::config::SceneConfig,
    game::{
        animation::{Beam, Cube},
        perf::{Profiler, ProfilerPoint},
        viewport::ViewportSize,
    },
};

/// Profiler window with one tab for the scene state and one for timings.
pub struct DebugPlugin;

impl bevy::prelude::Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugDock>();
        app.add_systems(Update, sys_update);
    }
}

impl Default for DebugPlugin {
    fn default() -> Self {
        DebugPlugin {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugTab {
    Scene,
    Profiler,
}

#[derive(Resource)]
pub struct DebugDock {
    pub state: DockState<DebugTab>,
}

impl Default for DebugDock {
    fn default() -> Self {
        DebugDock {
            state: DockState::new(vec![DebugTab::Scene, DebugTab::Profiler]),
        }
    }
}

/// What the scene tab shows, gathered before egui borrows everything.
#[derive(Debug, Clone, Default)]
pub struct SceneSnapshot {
    pub uptime: Duration,
    pub cube_rotation_degrees: Option<[f32; 3]>,
    /// Beam index and angle in degrees, sorted by index.
    pub beams: Vec<(usize, f32)>,
    pub viewport: Option<ViewportSize>,
    pub beam_radius: f32,
}

/// Stable plot colour for a monitor name.
pub fn monitor_color(name: &str) -> Color32 {
    let mut hasher = DefaultHasher::new();
    for byte in name.as_bytes() {
        hasher.write_u8(*byte);
    }
    let hash = hasher.finish();
    Color32::from_rgb(hash as u8, (hash >> 8) as u8, (hash >> 16) as u8)
}

struct DebugTabViewer<'a> {
    profiler: &'a Profiler,
    snapshot: &'a SceneSnapshot,
}

impl DebugTabViewer<'_> {
    fn scene_ui(&self, ui: &mut Ui) {
        let snapshot = self.snapshot;
        // Whole seconds, humantime would print nanoseconds otherwise
        let uptime = Duration::from_secs(snapshot.uptime.as_secs());
        ui.label(format!("Uptime: {}", humantime::format_duration(uptime)));

        match snapshot.cube_rotation_degrees {
            Some([x, y, z]) => ui.label(format!("Cube: ({x:.1}°, {y:.1}°, {z:.1}°)")),
            None => ui.label("Cube: -"),
        };

        if let Some(viewport) = snapshot.viewport {
            ui.label(format!(
                "Viewport: {}x{} ({:.3})",
                viewport.width,
                viewport.height,
                viewport.aspect_ratio()
            ));
        }

        ui.separator();
        ui.label(format!("Beams (r = {})", snapshot.beam_radius));
        for (index, angle) in &snapshot.beams {
            ui.label(format!("#{index}: {angle:.1}°"));
        }
    }

    fn profiler_ui(&self, ui: &mut Ui) {
        for monitor in self.profiler.iter() {
            ui.colored_label(
                monitor_color(&monitor.name),
                format!("{}: avg. {:.4}ms", monitor.name, monitor.average() * 1000.0),
            );
        }

        let plot = Plot::new("profiler_plot")
            .legend(Legend::default())
            .allow_drag(false)
            .allow_zoom(false)
            .height(180.0)
            .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
                format!("{}t", mark.value)
            })
            .y_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
                format!("{:.2}ms", mark.value)
            });

        plot.show(ui, |plot_ui| {
            let mut charts: Vec<BarChart> = Vec::new();
            for monitor in self.profiler.iter() {
                let bars = monitor
                    .points
                    .iter()
                    .map(|point: &ProfilerPoint| {
                        Bar::new(
                            point.age as f64,
                            point.duration().as_secs_f64() * 1000.0,
                        )
                    })
                    .collect();
                let chart = BarChart::new(bars)
                    .color(monitor_color(&monitor.name))
                    .width(0.5)
                    .name(monitor.name.clone())
                    .stack_on(&charts.iter().collect::<Vec<&BarChart>>());
                charts.push(chart);
            }

            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
    }
}

impl TabViewer for DebugTabViewer<'_> {
    type Tab = DebugTab;

    fn title(&mut self, tab: &mut Self::Tab) -> WidgetText {
        match tab {
            DebugTab::Scene => "Scene".into(),
            DebugTab::Profiler => "Profiler".into(),
        }
    }

    fn ui(&mut self, ui: &mut Ui, tab: &mut Self::Tab) {
        match tab {
            DebugTab::Scene => self.scene_ui(ui),
            DebugTab::Profiler => self.profiler_ui(ui),
        }
    }

    fn closeable(&mut self, _tab: &mut Self::Tab) -> bool {
        false
    }
}

/// Collects the scene state shown in the debug window.
pub fn snapshot(
    time: &Time,
    config: &SceneConfig,
    viewport: Option<&ViewportSize>,
    cubes: impl IntoIterator<Item = Cube>,
    beams: impl IntoIterator<Item = Beam>,
) -> SceneSnapshot {
    let cube_rotation_degrees = cubes.into_iter().next().map(|cube| {
        let r = cube.rotation;
        [r.x.to_degrees(), r.y.to_degrees(), r.z.to_degrees()]
    });

    let mut beams: Vec<(usize, f32)> = beams
        .into_iter()
        .map(|beam| (beam.index, beam.angle().to_degrees().rem_euclid(360.0)))
        .collect();
    beams.sort_by_key(|(index, _)| *index);

    SceneSnapshot {
        uptime: time.elapsed(),
        cube_rotation_degrees,
        beams,
        viewport: viewport.copied(),
        beam_radius: config.beam_radius,
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Systems                                  */
/* -------------------------------------------------------------------------- */

fn sys_update(
    time: Res<Time>,
    config: Res<SceneConfig>,
    viewport: Option<Res<ViewportSize>>,
    mut profiler: ResMut<Profiler>,
    mut dock: ResMut<DebugDock>,
    cubes: Query<&Cube>,
    beams: Query<&Beam>,
    mut egui_contexts: EguiContexts,
) {
    let mut recorder_point = ProfilerPoint::new();
    {
        let _recorder = recorder_point.record();

        let snapshot = snapshot(
            &time,
            &config,
            viewport.as_deref(),
            cubes.iter().copied(),
            beams.iter().copied(),
        );
        let mut viewer = DebugTabViewer {
            profiler: &profiler,
            snapshot: &snapshot,
        };

        let ctx = egui_contexts.ctx_mut();
        egui::Window::new("Debug")
            .default_size([360.0, 320.0])
            .show(ctx, |ui| {
                DockArea::new(&mut dock.state)
                    .id(egui::Id::new("debug_dock"))
                    .show_inside(ui, &mut viewer);
            });
    }

    profiler.record_manual("Debug::sys_update", recorder_point);
}

#[cfg(test)]
mod tests {
    use bevy::math::Vec3;

    use super::*;
    use crate::data::beam::beam_endpoints;

    #[test]
    fn monitor_colors_are_stable() {
        assert_eq!(
            monitor_color("Animation::spin_cube"),
            monitor_color("Animation::spin_cube")
        );
    }

    #[test]
    fn snapshot_sorts_beams_and_converts_to_degrees() {
        let beams = (0..4).rev().map(|index| Beam {
            index,
            endpoints: beam_endpoints(index as f32 * std::f32::consts::FRAC_PI_2, 2.5),
        });
        let cube = Cube {
            rotation: Vec3::new(std::f32::consts::PI, 0.0, 0.0),
        };

        let snapshot = snapshot(
            &Time::<()>::default(),
            &SceneConfig::default(),
            None,
            [cube],
            beams,
        );

        let indices: Vec<usize> = snapshot.beams.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        for (index, angle) in &snapshot.beams {
            let expected = *index as f32 * 90.0;
            assert!((angle - expected).abs() < 1e-3, "{angle} vs {expected}");
        }
        let rotation = snapshot.cube_rotation_degrees.expect("cube present");
        assert!((rotation[0] - 180.0).abs() < 1e-3);
        assert_eq!(snapshot.uptime, Duration::ZERO);
    }
}
