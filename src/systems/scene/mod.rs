//! Mounts a `SceneDirector` into the app and mirrors its state onto entities.
//!
//! The director never sees the `World`. Each frame `advance` feeds it the scene
//! clock, then the sync systems read its numbers and write them into
//! transforms, visibility, materials and lights. Sim ids map to spawned
//! entities through `SceneVisuals`; a visual whose sim entity is gone is
//! despawned on the next sync.

use std::collections::HashMap;

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub mod effects;
pub mod hostile;
pub mod models;
pub mod payloads;
pub mod rocket;

use crate::config::SceneConfig;
use crate::sim::random::RandomSource;
use crate::sim::{EntityId, SceneDirector};
use crate::systems::time::{ClockSet, SceneClock};

/// Light levels coming out of the sim are unitless; this maps them to lumens.
pub const LUMENS_PER_UNIT: f32 = 60_000.0;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneVisuals>()
            .configure_sets(
                Update,
                (
                    SceneSet::Advance.after(ClockSet),
                    SceneSet::Sync.after(SceneSet::Advance),
                ),
            )
            .add_systems(Startup, (models::setup_scene_assets, mount_scene).chain())
            .add_systems(Update, (restart_scene, advance).chain().in_set(SceneSet::Advance))
            .add_systems(
                Update,
                (
                    hostile::sync_hostile,
                    rocket::sync_rockets,
                    effects::sync_projectiles,
                    effects::sync_explosions,
                    payloads::sync_payloads,
                )
                    .in_set(SceneSet::Sync),
            )
            .add_systems(Last, teardown_on_exit);
    }
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneSet {
    Advance,
    Sync,
}

#[derive(Resource)]
pub struct ActiveScene {
    pub director: SceneDirector,
}

/// Spawned root entity per sim entity.
#[derive(Resource, Default, Debug)]
pub struct SceneVisuals {
    pub hostile: Option<Entity>,
    pub rockets: HashMap<EntityId, Entity>,
    pub projectiles: HashMap<EntityId, Entity>,
    pub explosions: HashMap<EntityId, Entity>,
    pub payloads: HashMap<EntityId, Entity>,
}

impl SceneVisuals {
    fn clear(&mut self) {
        *self = SceneVisuals::default();
    }
}

/// Tags every root spawned for the running scene, so unmount can sweep them.
#[derive(Component)]
pub struct SceneEntity;

// drop visuals whose sim entity no longer exists
pub(crate) fn prune(
    commands: &mut Commands,
    visuals: &mut HashMap<EntityId, Entity>,
    is_live: impl Fn(EntityId) -> bool,
) {
    visuals.retain(|id, entity| {
        if is_live(*id) {
            return true;
        }
        if let Ok(mut entity) = commands.get_entity(*entity) {
            entity.despawn();
        }
        false
    });
}

pub fn new_director(config: &SceneConfig, now: f32) -> SceneDirector {
    let rng: Box<dyn RandomSource + Send + Sync> = match config.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(StdRng::from_os_rng()),
    };
    SceneDirector::new(config.clone(), rng, now)
}

fn mount_scene(
    mut commands: Commands,
    config: Res<SceneConfig>,
    clock: Res<SceneClock>,
) {
    commands.insert_resource(ActiveScene {
        director: new_director(&config, clock.elapsed),
    });
}

fn advance(
    scene: Option<ResMut<ActiveScene>>,
    clock: Res<SceneClock>,
) {
    if let Some(mut scene) = scene {
        scene.director.update(clock.elapsed);
    }
}

fn restart_scene(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<SceneConfig>,
    mut clock: ResMut<SceneClock>,
    mut visuals: ResMut<SceneVisuals>,
    scene: Option<ResMut<ActiveScene>>,
    spawned: Query<Entity, With<SceneEntity>>,
) {
    if !keys.just_pressed(KeyCode::KeyR) {
        return;
    }

    if let Some(mut scene) = scene {
        scene.director.teardown();
    }
    despawn_all(&mut commands, &spawned, &mut visuals);

    clock.restart();
    commands.insert_resource(ActiveScene {
        director: new_director(&config, clock.elapsed),
    });
    info!("Scene restarted");
}

// unmount on exit
fn teardown_on_exit(
    mut commands: Commands,
    mut exit: EventReader<AppExit>,
    mut visuals: ResMut<SceneVisuals>,
    scene: Option<ResMut<ActiveScene>>,
    spawned: Query<Entity, With<SceneEntity>>,
) {
    if exit.read().next().is_none() {
        return;
    }
    if let Some(mut scene) = scene {
        scene.director.teardown();
    }
    despawn_all(&mut commands, &spawned, &mut visuals);
}

fn despawn_all(
    commands: &mut Commands,
    spawned: &Query<Entity, With<SceneEntity>>,
    visuals: &mut SceneVisuals,
) {
    for entity in spawned.iter() {
        commands.entity(entity).despawn();
    }
    visuals.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hostile::CraftStatus;
    use crate::systems::time::SceneClockPlugin;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    fn scene_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .insert_resource(SceneConfig {
                seed: Some(42),
                ..default()
            })
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
            .add_plugins((SceneClockPlugin, ScenePlugin));
        app
    }

    #[test]
    fn mounts_and_mirrors_the_hostile_craft() {
        let mut app = scene_app();
        for _ in 0..40 {
            app.update();
        }

        let scene = app.world().resource::<ActiveScene>();
        let status = scene.director.hostile().map(|h| h.status());
        assert_eq!(status, Some(CraftStatus::Operational));
        assert!(scene.director.attack_vehicle().is_some());

        let visuals = app.world().resource::<SceneVisuals>();
        assert!(visuals.hostile.is_some());
        assert_eq!(visuals.rockets.len(), 1);
    }

    #[test]
    fn restart_sweeps_the_old_scene() {
        let mut app = scene_app();
        for _ in 0..40 {
            app.update();
        }

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyR);
        app.update();

        let clock = app.world().resource::<SceneClock>();
        assert!(clock.elapsed < 0.5);
        let scene = app.world().resource::<ActiveScene>();
        assert!(!scene.director.is_torn_down());
        assert!(scene.director.attack_vehicle().is_none());
    }

    #[test]
    fn exit_tears_the_director_down() {
        let mut app = scene_app();
        for _ in 0..5 {
            app.update();
        }
        app.world_mut().send_event(AppExit::Success);
        app.update();

        let scene = app.world().resource::<ActiveScene>();
        assert!(scene.director.is_torn_down());
        let visuals = app.world().resource::<SceneVisuals>();
        assert!(visuals.hostile.is_none());
    }
}
