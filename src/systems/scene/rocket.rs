use bevy::prelude::*;

use crate::sim::EntityId;
use crate::sim::attack::ExhaustLook;
use crate::systems::scene::hostile::shown;
use crate::systems::scene::models::{SceneAssets, exhaust_transform, spawn_rocket};
use crate::systems::scene::{ActiveScene, SceneEntity, SceneVisuals, prune};

const EXHAUST_GLOW: LinearRgba = LinearRgba::rgb(1.0, 0.5, 0.1);

#[derive(Component)]
pub struct RocketVisual {
    exhaust: Entity,
    exhaust_material: Handle<StandardMaterial>,
}

// what a rocket needs from the sim, attack or payload vehicle alike
struct RocketState {
    id: EntityId,
    position: Vec3,
    rotation: Quat,
    scale: f32,
    visible: bool,
    exhaust: ExhaustLook,
}

pub fn sync_rockets(
    mut commands: Commands,
    scene: Option<Res<ActiveScene>>,
    assets: Res<SceneAssets>,
    mut visuals: ResMut<SceneVisuals>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut roots: Query<(&RocketVisual, &mut Transform, &mut Visibility)>,
    mut plumes: Query<(&mut Transform, &mut Visibility), Without<RocketVisual>>,
) {
    let Some(scene) = scene else { return };
    if scene.director.is_torn_down() {
        return;
    }
    let director = &scene.director;

    let mut rockets = Vec::with_capacity(2);
    if let Some(v) = director.attack_vehicle() {
        rockets.push(RocketState {
            id: v.id,
            position: v.position(),
            rotation: v.rotation(),
            scale: v.scale(),
            visible: v.is_visible(),
            exhaust: v.exhaust(),
        });
    }
    if let Some(v) = director.payload_vehicle() {
        rockets.push(RocketState {
            id: v.id,
            position: v.position(),
            rotation: v.rotation(),
            scale: v.scale(),
            visible: v.is_visible(),
            exhaust: v.exhaust(),
        });
    }

    prune(&mut commands, &mut visuals.rockets, |id| rockets.iter().any(|r| r.id == id));

    for rocket in &rockets {
        let transform = Transform {
            translation: rocket.position,
            rotation: rocket.rotation,
            scale: Vec3::splat(rocket.scale),
        };

        let Some(&root) = visuals.rockets.get(&rocket.id) else {
            let root = commands
                .spawn((transform, shown(rocket.visible), SceneEntity))
                .id();
            let (exhaust, exhaust_material) = spawn_rocket(&mut commands, &assets, &mut materials, root);
            commands.entity(root).insert(RocketVisual { exhaust, exhaust_material });
            visuals.rockets.insert(rocket.id, root);
            debug!("Rocket {:?} visual spawned", rocket.id);
            continue;
        };

        let Ok((visual, mut root_transform, mut visibility)) = roots.get_mut(root) else {
            continue;
        };
        *root_transform = transform;
        *visibility = shown(rocket.visible);

        if let Ok((mut plume, mut plume_visibility)) = plumes.get_mut(visual.exhaust) {
            let burning = rocket.exhaust.visible && rocket.exhaust.length > 0.0;
            if burning {
                *plume = exhaust_transform(rocket.exhaust.length);
            }
            *plume_visibility = shown(burning);
        }
        if let Some(material) = materials.get_mut(&visual.exhaust_material) {
            material.emissive = EXHAUST_GLOW * rocket.exhaust.intensity;
        }
    }
}
