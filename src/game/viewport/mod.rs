use std::ops::DerefMut;

use bevy::{
    app::{App, Plugin, PreStartup, Update},
    log::debug,
    prelude::{
        Component, EventReader, IntoSystemConfigs, Projection, Query, ResMut, Resource, With,
    },
    window::{PrimaryWindow, Window, WindowResized},
};

use crate::game::animation::AnimationSet;

/// Size of the output surface in logical pixels, as last reported by the
/// window.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        ViewportSize {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl ViewportSize {
    /// `None` for an empty surface, which is what a minimised window reports.
    pub fn new(width: f32, height: f32) -> Option<ViewportSize> {
        (width > 0.0 && height > 0.0).then_some(ViewportSize { width, height })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// Cameras whose projection follows the viewport.
#[derive(Component, Debug, Default)]
pub struct SceneCamera;

/* -------------------------------------------------------------------------- */
/*                                   Plugin                                   */
/* -------------------------------------------------------------------------- */

pub struct ViewportPlugin {}

impl Default for ViewportPlugin {
    fn default() -> Self {
        ViewportPlugin {}
    }
}

impl Plugin for ViewportPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewportSize>();
        app.add_event::<WindowResized>();
        app.add_systems(PreStartup, sys_setup);
        app.add_systems(Update, sys_resize.before(AnimationSet::SpinCube));
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Systems                                  */
/* -------------------------------------------------------------------------- */

/// Applies a new viewport size to the viewport record and every given camera
/// projection.
///
/// Returns `false` (and leaves everything untouched) for empty viewports.
pub fn apply_resize<P>(
    width: f32,
    height: f32,
    viewport: &mut ViewportSize,
    projections: impl IntoIterator<Item = P>,
) -> bool
where
    P: DerefMut<Target = Projection>,
{
    let Some(size) = ViewportSize::new(width, height) else {
        return false;
    };

    *viewport = size;
    for mut projection in projections {
        if let Projection::Perspective(perspective) = &mut *projection {
            perspective.aspect_ratio = width / height;
        }
    }
    true
}

fn sys_setup(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<ViewportSize>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    if let Some(size) = ViewportSize::new(window.width(), window.height()) {
        *viewport = size;
    }
}

pub fn sys_resize(
    mut events: EventReader<WindowResized>,
    mut viewport: ResMut<ViewportSize>,
    mut cameras: Query<&mut Projection, With<SceneCamera>>,
) {
    for event in events.read() {
        if apply_resize(event.width, event.height, &mut viewport, cameras.iter_mut()) {
            debug!("Viewport resized to {}x{}", event.width, event.height);
        } else {
            debug!("Ignoring resize to {}x{}", event.width, event.height);
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::{
        prelude::{OrthographicProjection, PerspectiveProjection},
        MinimalPlugins,
    };

    use super::*;
    use crate::game::animation::AnimationPlugin;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(AnimationPlugin::default());
        app.add_plugins(ViewportPlugin::default());
        app
    }

    fn spawn_camera(app: &mut App) -> bevy::prelude::Entity {
        app.world_mut()
            .spawn((
                SceneCamera,
                Projection::Perspective(PerspectiveProjection::default()),
            ))
            .id()
    }

    fn resize(app: &mut App, width: f32, height: f32) {
        let window = app.world_mut().spawn_empty().id();
        app.world_mut().send_event(WindowResized {
            window,
            width,
            height,
        });
        app.update();
    }

    fn aspect(app: &App, camera: bevy::prelude::Entity) -> Option<f32> {
        match app.world().get::<Projection>(camera) {
            Some(Projection::Perspective(perspective)) => Some(perspective.aspect_ratio),
            _ => None,
        }
    }

    #[test]
    fn resize_sets_aspect_and_viewport() {
        let mut app = app();
        let camera = spawn_camera(&mut app);

        resize(&mut app, 1920.0, 1080.0);

        assert_eq!(aspect(&app, camera), Some(1920.0 / 1080.0));
        assert_eq!(
            *app.world().resource::<ViewportSize>(),
            ViewportSize {
                width: 1920.0,
                height: 1080.0
            }
        );
    }

    #[test]
    fn resize_is_idempotent() {
        let mut once = app();
        let camera_once = spawn_camera(&mut once);
        resize(&mut once, 800.0, 600.0);

        let mut twice = app();
        let camera_twice = spawn_camera(&mut twice);
        resize(&mut twice, 800.0, 600.0);
        resize(&mut twice, 800.0, 600.0);

        assert_eq!(aspect(&once, camera_once), aspect(&twice, camera_twice));
        assert_eq!(
            once.world().resource::<ViewportSize>(),
            twice.world().resource::<ViewportSize>()
        );
    }

    #[test]
    fn empty_viewport_is_ignored() {
        let mut app = app();
        let camera = spawn_camera(&mut app);
        resize(&mut app, 640.0, 480.0);

        resize(&mut app, 0.0, 0.0);

        assert_eq!(aspect(&app, camera), Some(640.0 / 480.0));
        assert_eq!(app.world().resource::<ViewportSize>().width, 640.0);
    }

    #[test]
    fn last_event_in_a_tick_wins() {
        let mut app = app();
        let camera = spawn_camera(&mut app);
        let window = app.world_mut().spawn_empty().id();
        for (width, height) in [(300.0, 300.0), (1000.0, 500.0)] {
            app.world_mut().send_event(WindowResized {
                window,
                width,
                height,
            });
        }
        app.update();

        assert_eq!(aspect(&app, camera), Some(2.0));
        assert_eq!(app.world().resource::<ViewportSize>().aspect_ratio(), 2.0);
    }

    #[test]
    fn startup_reads_the_primary_window_size() {
        let mut app = app();
        let mut window = Window::default();
        window.resolution.set(1024.0, 256.0);
        app.world_mut().spawn((window, PrimaryWindow));
        app.update();

        assert_eq!(
            *app.world().resource::<ViewportSize>(),
            ViewportSize {
                width: 1024.0,
                height: 256.0
            }
        );
    }

    #[test]
    fn empty_primary_window_keeps_the_default_size() {
        let mut app = app();
        let mut window = Window::default();
        window.resolution.set(0.0, 0.0);
        app.world_mut().spawn((window, PrimaryWindow));
        app.update();

        assert_eq!(*app.world().resource::<ViewportSize>(), ViewportSize::default());
    }

    #[test]
    fn viewport_size_rejects_empty_surfaces() {
        assert_eq!(ViewportSize::new(0.0, 720.0), None);
        assert_eq!(ViewportSize::new(1280.0, -1.0), None);
        assert_eq!(ViewportSize::new(f32::NAN, 720.0), None);
        assert_eq!(
            ViewportSize::new(1280.0, 720.0),
            Some(ViewportSize::default())
        );
    }

    #[test]
    fn orthographic_cameras_keep_their_projection() {
        let mut viewport = ViewportSize::default();
        let mut projection = Projection::Orthographic(OrthographicProjection::default_3d());
        assert!(apply_resize(100.0, 50.0, &mut viewport, Some(&mut projection)));
        assert!(matches!(projection, Projection::Orthographic(_)));
        assert_eq!(viewport.aspect_ratio(), 2.0);
    }
}
