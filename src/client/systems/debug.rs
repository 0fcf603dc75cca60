use bevy::{
    prelude::{Commands, Component, Entity, Query, Res, Text, With},
    time::Time,
    ui::{Node, PositionType, Val},
    utils::default,
};

use crate::game::{animation::Cube, viewport::ViewportSize};

#[derive(Component, Debug, Default)]
pub struct DebugTextComponent;

pub fn setup_debug_text(mut commands: Commands) {
    commands.spawn((
        Text("Debug".to_string()),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            bottom: Val::Px(12.0),
            ..default()
        },
        DebugTextComponent,
    ));
}

/// Formats the overlay text.
pub fn debug_text(
    entities: usize,
    fps: f64,
    rotation: Option<&Cube>,
    viewport: Option<&ViewportSize>,
) -> String {
    let rotation = match rotation {
        Some(cube) => format!(
            "({:.1}, {:.1}, {:.1})",
            cube.rotation.x.to_degrees(),
            cube.rotation.y.to_degrees(),
            cube.rotation.z.to_degrees()
        ),
        None => "-".to_string(),
    };
    let viewport = match viewport {
        Some(viewport) => format!("{}x{}", viewport.width, viewport.height),
        None => "-".to_string(),
    };
    format!(
        "Entities: {}\nFPS: {:.2}\nCube: {}\nViewport: {}",
        entities, fps, rotation, viewport
    )
}

pub fn update_debug_text(
    time: Res<Time>,
    viewport: Option<Res<ViewportSize>>,
    mut query: Query<&mut Text, With<DebugTextComponent>>,
    cubes: Query<&Cube>,
    entities_query: Query<Entity, With<bevy::prelude::Transform>>,
) {
    // FPS from the last frame only
    let delta = time.delta_secs_f64();
    let fps = if delta > 0.0 { 1.0 / delta } else { 0.0 };

    for mut text in query.iter_mut() {
        text.0 = debug_text(
            entities_query.iter().count(),
            fps,
            cubes.iter().next(),
            viewport.as_deref(),
        );
    }
}
