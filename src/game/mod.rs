use bevy::{
    app::{App, PluginGroup},
    log::{Level, LogPlugin},
    prelude::Plugin,
    utils::default,
    window::{Window, WindowPlugin},
    DefaultPlugins,
};

use crate::data::config::SceneConfig;

pub mod animation;
pub mod debug;
pub mod perf;
pub mod viewport;

pub const WINDOW_TITLE: &str = "Laser Cube";
/// Canvas the app draws into when built for the web.
pub const CANVAS_SELECTOR: &str = "#laser-cube";
const LOG_FILTER: &str = "wgpu=error,naga=warn,laser_cube=debug";

/// Builds the app with the engine's default plugins, set up for this scene.
pub fn app() -> App {
    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: WINDOW_TITLE.to_string(),
                    canvas: Some(CANVAS_SELECTOR.to_string()),
                    fit_canvas_to_parent: true,
                    ..default()
                }),
                ..default()
            })
            .set(LogPlugin {
                level: Level::INFO,
                filter: LOG_FILTER.to_string(),
                ..default()
            }),
    );

    app
}

/* -------------------------------------------------------------------------- */
/*                                   Plugin                                   */
/* -------------------------------------------------------------------------- */

/// Everything that animates the scene, without any rendering.
///
/// The config is sanitised once here and then shared as a resource.
pub struct LaserCubePlugin {
    config: SceneConfig,
}

impl LaserCubePlugin {
    pub fn new(config: SceneConfig) -> LaserCubePlugin {
        LaserCubePlugin { config }
    }
}

impl Default for LaserCubePlugin {
    fn default() -> Self {
        LaserCubePlugin::new(SceneConfig::default())
    }
}

impl Plugin for LaserCubePlugin {
    fn build(&self, app: &mut App) {
        let config = self.config.clone().sanitized();

        app.add_plugins(perf::ProfilerPlugin {
            max_ticks: config.profiler_history,
        });
        app.insert_resource(config);
        app.add_plugins(viewport::ViewportPlugin::default());
        app.add_plugins(animation::AnimationPlugin::default());
    }
}
