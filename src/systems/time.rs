//! time.rs
//!
//! Scene clock resource. The director reads `elapsed` once per frame, so
//! pausing or changing speed here is all the time control the scene needs.

use bevy::prelude::*;

const MIN_SPEED: f32 = 0.25;
const MAX_SPEED: f32 = 8.0;

pub struct SceneClockPlugin;

impl Plugin for SceneClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneClock>()
           .add_systems(Update, (handle_time_keys, update).chain().in_set(ClockSet));
    }
}

/// Anything reading `SceneClock::elapsed` for the current frame runs after this.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClockSet;

/// Seconds since the scene was mounted, scaled by the speed multiplier.
/// Never runs backwards.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SceneClock {
    pub is_paused: bool,
    pub speed_mult: f32,
    pub elapsed: f32,
}

impl Default for SceneClock {
    fn default() -> Self {
        Self {
            is_paused: false,
            speed_mult: 1.0,
            elapsed: 0.0,
        }
    }
}

impl SceneClock {
    pub fn toggle_pause(&mut self) {
        self.is_paused = !self.is_paused;
    }

    // halve speed
    pub fn step_backward(&mut self) {
        self.is_paused = false;
        self.speed_mult = (self.speed_mult / 2.0).clamp(MIN_SPEED, MAX_SPEED);
    }

    // double speed
    pub fn step_forward(&mut self) {
        self.is_paused = false;
        self.speed_mult = (self.speed_mult * 2.0).clamp(MIN_SPEED, MAX_SPEED);
    }

    pub fn reset_to_normal(&mut self) {
        self.speed_mult = 1.0;
        self.is_paused = false;
    }

    // back to zero for a fresh scene
    pub fn restart(&mut self) {
        *self = SceneClock::default();
    }

    pub fn advance(&mut self, real_delta: f32) {
        if !self.is_paused {
            self.elapsed += real_delta.max(0.0) * self.speed_mult;
        }
    }
}

fn handle_time_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut clock: ResMut<SceneClock>,
) {
    if keys.just_pressed(KeyCode::Space) {
        clock.toggle_pause();
        info!("Scene clock {}", if clock.is_paused { "paused" } else { "resumed" });
    }
    if keys.just_pressed(KeyCode::BracketRight) {
        clock.step_forward();
        info!("Scene speed x{}", clock.speed_mult);
    }
    if keys.just_pressed(KeyCode::BracketLeft) {
        clock.step_backward();
        info!("Scene speed x{}", clock.speed_mult);
    }
    if keys.just_pressed(KeyCode::Backspace) {
        clock.reset_to_normal();
    }
}

fn update(
    mut clock: ResMut<SceneClock>,
    time: Res<Time>
) {
    clock.advance(time.delta_secs());
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    #[test]
    fn speed_stays_in_range() {
        let mut clock = SceneClock::default();
        for _ in 0..10 {
            clock.step_forward();
        }
        assert_eq!(clock.speed_mult, MAX_SPEED);
        for _ in 0..10 {
            clock.step_backward();
        }
        assert_eq!(clock.speed_mult, MIN_SPEED);
        clock.reset_to_normal();
        assert_eq!(clock.speed_mult, 1.0);
    }

    #[test]
    fn paused_clock_holds_still() {
        let mut clock = SceneClock::default();
        clock.advance(0.5);
        clock.toggle_pause();
        clock.advance(3.0);
        assert_eq!(clock.elapsed, 0.5);
        clock.step_forward();
        assert!(!clock.is_paused);
        clock.advance(1.0);
        assert_eq!(clock.elapsed, 2.5);
        clock.advance(-4.0);
        assert_eq!(clock.elapsed, 2.5);
    }

    #[test]
    fn follows_app_time() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
            .add_plugins(SceneClockPlugin);

        for _ in 0..11 {
            app.update();
        }

        let clock = app.world().resource::<SceneClock>();
        assert!((clock.elapsed - 1.0).abs() < 0.11, "elapsed {}", clock.elapsed);
    }
}
