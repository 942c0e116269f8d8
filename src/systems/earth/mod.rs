use bevy::prelude::*;

pub mod materials;
pub mod textures;

use materials::shell_material;
use textures::load_body_textures;
use crate::config::SceneConfig;
use crate::sim::body::{CelestialBody, ShellLayer};
use crate::systems::time::{ClockSet, SceneClock};

const SPHERE_SECTORS: u32 = 64;
const SPHERE_STACKS: u32 = 32;

pub struct EarthPlugin;

impl Plugin for EarthPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, start)
            .add_systems(Update, rotate.after(ClockSet));
    }
}

// root of all shells
#[derive(Component)]
pub struct Earth;

// one spinning layer of the body
#[derive(Component, Debug, Clone, Copy)]
pub struct Shell(pub ShellLayer);

#[derive(Resource, Debug, Clone)]
pub struct Body(pub CelestialBody);

fn start(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    asset_server: Res<AssetServer>,
    config: Res<SceneConfig>,
) {
    let body = CelestialBody::new(&config.body);
    let textures = load_body_textures(&config.textures, &asset_server, &mut images);

    let earth = commands
        .spawn((Earth, Transform::default(), Visibility::default()))
        .id();

    for layer in ShellLayer::ALL {
        let mut mesh = Sphere::new(layer.radius(body.radius))
            .mesh()
            .uv(SPHERE_SECTORS, SPHERE_STACKS);

        // normal maps need tangents
        if layer == ShellLayer::Surface && textures.normal.is_some() {
            if let Err(e) = mesh.generate_tangents() {
                warn!("Could not generate body tangents: {e}");
            }
        }

        commands.spawn((
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(materials.add(shell_material(layer, &textures))),
            Transform::default(),
            Shell(layer),
            ChildOf(earth),
        ));
    }

    info!("Body spawned, radius {}", body.radius);
    commands.insert_resource(Body(body));
}

// spin each shell from scene time so pausing the clock freezes them too
fn rotate(
    clock: Res<SceneClock>,
    body: Option<Res<Body>>,
    mut shells: Query<(&Shell, &mut Transform)>,
) {
    let Some(body) = body else { return };
    for (shell, mut transform) in shells.iter_mut() {
        transform.rotation = body.0.shell_rotation(shell.0, clock.elapsed);
    }
}
