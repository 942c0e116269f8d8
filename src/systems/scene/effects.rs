use bevy::prelude::*;

use crate::sim::orbital::heading_rotation;
use crate::systems::scene::models::SceneAssets;
use crate::systems::scene::{ActiveScene, LUMENS_PER_UNIT, SceneEntity, SceneVisuals, prune};

const FIREBALL_COLOR: LinearRgba = LinearRgba::rgb(1.0, 0.45, 0.1);
const SPARK_COLOR: LinearRgba = LinearRgba::rgb(1.0, 0.8, 0.3);

pub fn sync_projectiles(
    mut commands: Commands,
    scene: Option<Res<ActiveScene>>,
    assets: Res<SceneAssets>,
    mut visuals: ResMut<SceneVisuals>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(scene) = scene else { return };
    if scene.director.is_torn_down() {
        return;
    }
    let projectiles = scene.director.projectiles();

    prune(&mut commands, &mut visuals.projectiles, |id| {
        projectiles.iter().any(|p| p.id == id && !p.is_finished())
    });

    for projectile in projectiles.iter().filter(|p| !p.is_finished()) {
        let transform = Transform::from_translation(projectile.position())
            .with_rotation(heading_rotation(projectile.direction()));

        match visuals.projectiles.get(&projectile.id) {
            Some(&entity) => {
                if let Ok(mut current) = transforms.get_mut(entity) {
                    *current = transform;
                }
            }
            None => {
                let entity = commands
                    .spawn((
                        Mesh3d(assets.missile.clone()),
                        MeshMaterial3d(assets.missile_material.clone()),
                        transform,
                        SceneEntity,
                    ))
                    .id();
                visuals.projectiles.insert(projectile.id, entity);
            }
        }
    }
}

#[derive(Component)]
pub struct ExplosionVisual {
    fireball: Entity,
    fireball_material: Handle<StandardMaterial>,
    spark_material: Handle<StandardMaterial>,
    sparks: Vec<Entity>,
}

pub fn sync_explosions(
    mut commands: Commands,
    scene: Option<Res<ActiveScene>>,
    assets: Res<SceneAssets>,
    mut visuals: ResMut<SceneVisuals>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut roots: Query<(&ExplosionVisual, &mut PointLight)>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(scene) = scene else { return };
    if scene.director.is_torn_down() {
        return;
    }
    let explosions = scene.director.explosions();

    prune(&mut commands, &mut visuals.explosions, |id| {
        explosions.iter().any(|e| e.id == id && !e.is_finished())
    });

    for explosion in explosions.iter().filter(|e| !e.is_finished()) {
        let look = explosion.look();

        let Some(&root) = visuals.explosions.get(&explosion.id) else {
            let fireball_material = materials.add(StandardMaterial {
                base_color: Color::srgba(1.0, 0.6, 0.2, look.opacity),
                alpha_mode: AlphaMode::Add,
                emissive: FIREBALL_COLOR * look.emissive,
                unlit: true,
                ..default()
            });
            let spark_material = materials.add(StandardMaterial {
                base_color: Color::srgba(1.0, 0.85, 0.4, look.opacity),
                alpha_mode: AlphaMode::Add,
                emissive: SPARK_COLOR * look.emissive,
                unlit: true,
                ..default()
            });

            let root = commands
                .spawn((
                    Transform::from_translation(explosion.position),
                    Visibility::default(),
                    PointLight {
                        color: Color::srgb(1.0, 0.6, 0.25),
                        intensity: look.light_intensity * LUMENS_PER_UNIT,
                        range: look.light_range,
                        ..default()
                    },
                    SceneEntity,
                ))
                .id();
            let fireball = commands
                .spawn((
                    Mesh3d(assets.fireball.clone()),
                    MeshMaterial3d(fireball_material.clone()),
                    Transform::from_scale(Vec3::splat(look.scale)),
                    ChildOf(root),
                ))
                .id();
            let sparks = explosion
                .sparks()
                .iter()
                .map(|spark| {
                    commands
                        .spawn((
                            Mesh3d(assets.spark.clone()),
                            MeshMaterial3d(spark_material.clone()),
                            Transform::from_translation(explosion.spark_offset(spark) * look.scale)
                                .with_scale(Vec3::splat(spark.size)),
                            ChildOf(root),
                        ))
                        .id()
                })
                .collect();

            commands.entity(root).insert(ExplosionVisual {
                fireball,
                fireball_material,
                spark_material,
                sparks,
            });
            visuals.explosions.insert(explosion.id, root);
            continue;
        };

        let Ok((visual, mut light)) = roots.get_mut(root) else {
            continue;
        };
        light.intensity = look.light_intensity * LUMENS_PER_UNIT;
        light.range = look.light_range;

        if let Ok(mut fireball) = transforms.get_mut(visual.fireball) {
            fireball.scale = Vec3::splat(look.scale);
        }
        for (spark, entity) in explosion.sparks().iter().zip(visual.sparks.iter()) {
            if let Ok(mut transform) = transforms.get_mut(*entity) {
                transform.translation = explosion.spark_offset(spark) * look.scale;
            }
        }

        if let Some(material) = materials.get_mut(&visual.fireball_material) {
            material.base_color.set_alpha(look.opacity);
            material.emissive = FIREBALL_COLOR * look.emissive;
        }
        if let Some(material) = materials.get_mut(&visual.spark_material) {
            material.base_color.set_alpha(look.opacity);
            material.emissive = SPARK_COLOR * look.emissive;
        }
    }
}
