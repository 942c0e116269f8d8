use bevy::prelude::*;

use crate::systems::scene::models::{SceneAssets, UFO_PILOT_Y, UfoParts, glow, spawn_ufo};
use crate::systems::scene::{ActiveScene, LUMENS_PER_UNIT, SceneEntity, SceneVisuals};

const ENGINE_GLOW: Vec3 = Vec3::new(0.3, 0.9, 1.0);
const FLAME_GLOW: Vec3 = Vec3::new(0.4, 0.9, 1.0);

// root of the saucer model
#[derive(Component)]
pub struct HostileVisual {
    parts: UfoParts,
}

pub fn sync_hostile(
    mut commands: Commands,
    scene: Option<Res<ActiveScene>>,
    assets: Res<SceneAssets>,
    mut visuals: ResMut<SceneVisuals>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut roots: Query<(&HostileVisual, &mut Transform, &mut Visibility)>,
    mut parts: Query<(&mut Transform, &mut Visibility), Without<HostileVisual>>,
    mut lights: Query<&mut PointLight>,
) {
    let Some(scene) = scene else { return };
    if scene.director.is_torn_down() {
        return;
    }

    let Some(craft) = scene.director.hostile() else {
        // vanished
        if let Some(entity) = visuals.hostile.take() {
            commands.entity(entity).despawn();
        }
        return;
    };

    let transform = Transform {
        translation: craft.position(),
        rotation: craft.rotation(),
        scale: Vec3::splat(craft.scale()),
    };

    let Some(root) = visuals.hostile else {
        let root = commands.spawn((transform, Visibility::default(), SceneEntity)).id();
        let parts = spawn_ufo(&mut commands, &assets, &mut materials, root);
        commands.entity(root).insert(HostileVisual { parts });
        visuals.hostile = Some(root);
        info!("Hostile craft visual spawned");
        return;
    };

    let Ok((visual, mut root_transform, mut root_visibility)) = roots.get_mut(root) else {
        return;
    };
    let look = craft.look();
    let ufo = &visual.parts;

    *root_transform = transform;
    *root_visibility = shown(look.visible);

    if let Some(hull) = materials.get_mut(&ufo.hull) {
        hull.emissive = glow(look.hull.color, look.hull.intensity);
    }
    if let Some(dome) = materials.get_mut(&ufo.dome) {
        dome.emissive = glow(look.dome.color, look.dome.intensity);
    }
    if let Some(engine) = materials.get_mut(&ufo.engine) {
        engine.emissive = glow(ENGINE_GLOW, look.engine_intensity);
    }
    for (handle, intensity) in ufo.rim.iter().zip(look.rim_intensities.iter()) {
        if let Some(rim) = materials.get_mut(handle) {
            let base = rim.base_color.to_srgba();
            rim.emissive = glow(Vec3::new(base.red, base.green, base.blue), *intensity);
        }
    }
    if let Some(flame) = materials.get_mut(&ufo.flame) {
        flame.base_color.set_alpha(look.flame.opacity);
        flame.emissive = glow(FLAME_GLOW, look.flame.intensity);
    }

    if let Ok((mut flame_transform, mut flame_visibility)) = parts.get_mut(ufo.flame_entity) {
        flame_transform.scale = look.flame.scale;
        *flame_visibility = shown(look.flame.visible);
    }
    if let Ok((mut pilot_transform, mut pilot_visibility)) = parts.get_mut(ufo.pilot_entity) {
        pilot_transform.translation.y = UFO_PILOT_Y + look.pilot_bob;
        pilot_transform.rotation = Quat::from_rotation_y(look.pilot_spin);
        *pilot_visibility = shown(look.pilot_visible);
    }

    if let Ok(mut light) = lights.get_mut(ufo.flame_light) {
        light.intensity = look.flame.light_intensity * LUMENS_PER_UNIT;
    }
    if let Ok(mut light) = lights.get_mut(ufo.cabin_light) {
        light.intensity = look.cabin_light * LUMENS_PER_UNIT;
    }
}

pub(crate) fn shown(visible: bool) -> Visibility {
    if visible { Visibility::Inherited } else { Visibility::Hidden }
}
