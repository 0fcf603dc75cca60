use bevy::{
    app::{App, Startup, Update},
    dev_tools::fps_overlay::FpsOverlayPlugin,
    log::info,
    prelude::IntoSystemConfigs,
    winit::WinitSettings,
};
use bevy_egui::EguiPlugin;
use bevy_flycam::{MovementSettings, NoCameraPlayerPlugin};

use crate::{
    data::config::{CameraControl, SceneConfig},
    game::{self, animation::AnimationSet, debug::DebugPlugin, LaserCubePlugin},
};
mod renderer;
mod systems;

pub use renderer::SceneRenderer;
pub use systems::camera::OrbitCamera;

pub struct Runtime {
    config: SceneConfig,
}

impl Runtime {
    pub fn new() -> Runtime {
        Runtime {
            config: SceneConfig::default(),
        }
    }

    pub fn with_config(config: SceneConfig) -> Runtime {
        Runtime { config }
    }

    /// Opens the window (or takes over the canvas on the web) and runs the
    /// scene until the window closes.
    pub fn run(&self) {
        let mut app = game::app();
        self.install(&mut app);
        app.run();
    }

    /// Adds the scene, camera and debug tooling to an app that already has
    /// the engine plugins.
    pub fn install(&self, app: &mut App) {
        let config = self.config.clone().sanitized();
        info!("Starting with {:?}", config);
        app.add_plugins(LaserCubePlugin::new(config.clone()));

        // Redraw every display refresh even without input
        app.insert_resource(WinitSettings::game());

        app.add_plugins(SceneRenderer::default());
        app.add_systems(Startup, systems::camera::setup_camera);
        match config.camera {
            CameraControl::Orbit => {
                app.add_systems(
                    Update,
                    systems::camera::update_orbit_camera.before(AnimationSet::SpinCube),
                );
            }
            CameraControl::Fly => {
                app.insert_resource(MovementSettings {
                    sensitivity: 0.00012,
                    speed: 3.0,
                });
                app.add_plugins(NoCameraPlayerPlugin);
            }
            CameraControl::Fixed => {}
        }

        if config.show_debug {
            app.add_plugins(FpsOverlayPlugin::default());
            app.add_plugins(EguiPlugin);
            app.add_plugins(DebugPlugin::default());
            app.add_systems(Startup, systems::debug::setup_debug_text);
            app.add_systems(Update, systems::debug::update_debug_text);
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new()
    }
}
