use bevy::prelude::*;

use crate::sim::EntityId;
use crate::systems::scene::models::{SceneAssets, create_trail_mesh, spawn_payload};
use crate::systems::scene::{ActiveScene, SceneEntity, SceneVisuals};

const RING_RESOLUTION: usize = 128;

#[derive(Component)]
pub struct PayloadVisual {
    pub id: EntityId,
    parts: Vec<Entity>,
    ring: Entity,
    highlighted: bool,
}

pub fn sync_payloads(
    mut commands: Commands,
    scene: Option<Res<ActiveScene>>,
    assets: Res<SceneAssets>,
    mut visuals: ResMut<SceneVisuals>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut roots: Query<(&mut PayloadVisual, &mut Transform)>,
) {
    let Some(scene) = scene else { return };
    if scene.director.is_torn_down() {
        return;
    }
    let now = scene.director.now();
    let payloads = scene.director.payloads();

    // rings are not children, so they go with their payload by hand
    visuals.payloads.retain(|id, entity| {
        if payloads.iter().any(|p| p.id == *id) {
            return true;
        }
        if let Ok((visual, _)) = roots.get(*entity) {
            if let Ok(mut ring) = commands.get_entity(visual.ring) {
                ring.despawn();
            }
        }
        if let Ok(mut root) = commands.get_entity(*entity) {
            root.despawn();
        }
        false
    });

    for payload in payloads {
        let transform = Transform::from_translation(payload.position(now))
            .with_rotation(payload.rotation(now));
        let highlighted = payload.is_highlighted(now);

        let Some(&root) = visuals.payloads.get(&payload.id) else {
            let ring = commands
                .spawn((
                    Mesh3d(meshes.add(create_trail_mesh(&payload.orbit.ring(RING_RESOLUTION)))),
                    MeshMaterial3d(assets.orbit_material.clone()),
                    Transform::default(),
                    Pickable::IGNORE,
                    SceneEntity,
                ))
                .id();
            let root = commands.spawn((transform, Visibility::default(), SceneEntity)).id();
            let parts = spawn_payload(&mut commands, &assets, root);
            commands
                .entity(root)
                .insert(PayloadVisual {
                    id: payload.id,
                    parts,
                    ring,
                    highlighted: false,
                })
                .observe(on_payload_click);
            visuals.payloads.insert(payload.id, root);
            info!("Payload {:?} visual spawned", payload.id);
            continue;
        };

        let Ok((mut visual, mut root_transform)) = roots.get_mut(root) else {
            continue;
        };
        *root_transform = transform;

        if visual.highlighted != highlighted {
            let material = if highlighted {
                assets.highlight_material.clone()
            } else {
                assets.payload_material.clone()
            };
            for part in &visual.parts {
                commands.entity(*part).insert(MeshMaterial3d(material.clone()));
            }
            visual.highlighted = highlighted;
        }
    }
}

// clicks on any part bubble up to the payload root
fn on_payload_click(
    trigger: Trigger<Pointer<Click>>,
    payloads: Query<&PayloadVisual>,
    scene: Option<ResMut<ActiveScene>>,
) {
    let Some(mut scene) = scene else { return };
    let Ok(visual) = payloads.get(trigger.target()) else {
        return;
    };
    if scene.director.highlight_payload(visual.id) {
        info!("Payload {:?} selected", visual.id);
    }
}
