use bevy::prelude::*;

use crate::sim::GamePhase;
use crate::sim::hostile::CraftStatus;
use crate::systems::scene::{ActiveScene, SceneSet};
use crate::systems::time::SceneClock;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_hud)
            .add_systems(
                Update,
                (update_scene_readout, update_clock_readout).after(SceneSet::Sync),
            );
    }
}

// which line of the readout a text node shows
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudLine {
    Phase,
    Hostile,
    Payloads,
    Effects,
    Clock,
}

fn setup_hud(mut commands: Commands) {
    // create UI container
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Start,
                justify_content: JustifyContent::Start,
                padding: UiRect::all(Val::Px(20.0)),
                ..default()
            },
            BackgroundColor(Color::NONE),
            Pickable::IGNORE,
        ))
        .with_children(|parent| {
            for (i, line) in [
                HudLine::Phase,
                HudLine::Hostile,
                HudLine::Payloads,
                HudLine::Effects,
                HudLine::Clock,
            ]
            .into_iter()
            .enumerate()
            {
                parent.spawn((
                    Text::new(""),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                    line,
                    Node {
                        margin: UiRect::top(Val::Px(if i == 0 { 0.0 } else { 5.0 })), // spacing
                        ..default()
                    },
                ));
            }
        });
}

fn update_scene_readout(
    scene: Option<Res<ActiveScene>>,
    mut text_query: Query<(&HudLine, &mut Text)>,
) {
    let Some(scene) = scene else { return };
    let director = &scene.director;

    for (line, mut text) in text_query.iter_mut() {
        let content = match line {
            HudLine::Phase => match director.phase() {
                GamePhase::AlienAttack => "Phase: Alien attack".to_string(),
                GamePhase::PayloadDeployment => "Phase: Payload deployment".to_string(),
            },
            HudLine::Hostile => match director.hostile() {
                Some(craft) => format!(
                    "Hostile: {} ({}/{})",
                    status_label(craft.status()),
                    craft.health(),
                    craft.max_health()
                ),
                None => "Hostile: gone".to_string(),
            },
            HudLine::Payloads => format!(
                "Payloads: {}/{}",
                director.payloads().len(),
                director.config().payloads.max_payloads
            ),
            HudLine::Effects => format!(
                "Projectiles: {}  Explosions: {}",
                director.projectiles().iter().filter(|p| !p.is_finished()).count(),
                director.explosions().iter().filter(|e| !e.is_finished()).count()
            ),
            HudLine::Clock => continue,
        };
        text.0 = content;
    }
}

fn update_clock_readout(
    clock: Res<SceneClock>,
    mut text_query: Query<(&HudLine, &mut Text)>,
) {
    for (line, mut text) in text_query.iter_mut() {
        if *line == HudLine::Clock {
            text.0 = clock_label(&clock);
        }
    }
}

fn status_label(status: CraftStatus) -> &'static str {
    match status {
        CraftStatus::Entering => "entering",
        CraftStatus::Operational => "operational",
        CraftStatus::Dying => "breaking up",
        CraftStatus::Destroyed => "destroyed",
    }
}

fn clock_label(clock: &SceneClock) -> String {
    let paused = if clock.is_paused { " (paused)" } else { "" };
    format!("T+{:.1}s  x{}{}", clock.elapsed, clock.speed_mult, paused)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::systems::scene::ScenePlugin;
    use crate::systems::time::SceneClockPlugin;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    fn readout(app: &mut App, wanted: HudLine) -> String {
        let mut lines = app.world_mut().query::<(&HudLine, &Text)>();
        lines
            .iter(app.world())
            .find(|(line, _)| **line == wanted)
            .map(|(_, text)| text.0.clone())
            .unwrap_or_default()
    }

    #[test]
    fn readout_matches_the_current_frame() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .insert_resource(SceneConfig {
                seed: Some(11),
                ..default()
            })
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
            .add_plugins((SceneClockPlugin, ScenePlugin, HudPlugin));

        for _ in 0..5 {
            app.update();
            let clock = app.world().resource::<SceneClock>().clone();
            assert_eq!(readout(&mut app, HudLine::Clock), clock_label(&clock));
        }
        assert_eq!(readout(&mut app, HudLine::Payloads), "Payloads: 0/5");
        assert_eq!(readout(&mut app, HudLine::Phase), "Phase: Alien attack");
    }

    #[test]
    fn clock_label_shows_pause() {
        let mut clock = SceneClock::default();
        clock.toggle_pause();
        let label = clock_label(&clock);
        assert!(label.starts_with("T+0.0s"));
        assert!(label.ends_with("(paused)"));
    }

    #[test]
    fn status_labels_are_distinct() {
        let labels = [
            CraftStatus::Entering,
            CraftStatus::Operational,
            CraftStatus::Dying,
            CraftStatus::Destroyed,
        ]
        .map(status_label);
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
