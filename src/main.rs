use bevy::prelude::*;

use bevy_orbital_defense::config::load_scene_config;
use bevy_orbital_defense::systems::camera::{OrbitCamPlugin, OrbitCamera};
use bevy_orbital_defense::systems::earth::EarthPlugin;
use bevy_orbital_defense::systems::scene::ScenePlugin;
use bevy_orbital_defense::systems::time::SceneClockPlugin;
use bevy_orbital_defense::systems::ui::HudPlugin;

fn main() -> bevy::app::AppExit {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(OrbitCamPlugin)
        .add_plugins(SceneClockPlugin)
        .add_plugins(EarthPlugin)
        .add_plugins(ScenePlugin)
        .add_plugins(HudPlugin)
        .insert_resource(ClearColor(Color::srgb(0.0, 0.0, 0.0)))
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 80.0,
            ..default()
        })
        .add_systems(PreStartup, load_scene_config)
        .add_systems(Startup, setup)
        .run()
}

// scene setup here
fn setup(mut commands: Commands) {
    // sun light
    commands.spawn((
        DirectionalLight {
            illuminance: 3_000.,
            ..default()
        },
        Transform::from_xyz(80.0, 60.0, 80.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // spawn camera
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(20.0, 12.0, 28.0).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitCamera::looking_from(Vec3::new(20.0, 12.0, 28.0), 0.5)
            .with_target(Vec3::ZERO)
            .with_zoom_limits(6.0, 90.0),
    ));
}
