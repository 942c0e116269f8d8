//! Straight-line missile. Reports exactly one hit or miss.

use bevy::math::Vec3;

use crate::sim::events::{EntityId, EventBus, SceneEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileState {
    InFlight,
    Hit,
    Missed,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EntityId,
    pub start: Vec3,
    pub target: Vec3,
    pub speed: f32,
    pub distance_traveled: f32,
    total_distance: f32,
    direction: Vec3,
    position: Vec3,
    state: ProjectileState,
}

impl Projectile {
    pub fn new(id: EntityId, start: Vec3, target: Vec3, speed: f32) -> Self {
        let offset = target - start;
        Self {
            id,
            start,
            target,
            speed,
            distance_traveled: 0.0,
            total_distance: offset.length(),
            direction: offset.normalize_or_zero(),
            position: start,
            state: ProjectileState::InFlight,
        }
    }

    pub fn advance(&mut self, dt: f32, bus: &mut EventBus) {
        if self.state != ProjectileState::InFlight {
            return;
        }

        // a path we can't measure will never arrive
        if !self.total_distance.is_finite() || !self.direction.is_finite() {
            self.state = ProjectileState::Missed;
            bus.emit(SceneEvent::ProjectileMissed { id: self.id });
            return;
        }

        let step = self.speed * dt;
        if !step.is_finite() {
            self.state = ProjectileState::Missed;
            bus.emit(SceneEvent::ProjectileMissed { id: self.id });
            return;
        }
        self.distance_traveled += step;

        if self.distance_traveled >= self.total_distance {
            self.position = self.target;
            self.state = ProjectileState::Hit;
            bus.emit(SceneEvent::ProjectileHit { id: self.id, point: self.target });
            return;
        }

        self.position += self.direction * step;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn state(&self) -> ProjectileState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state != ProjectileState::InFlight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(bus: &mut EventBus) -> Vec<SceneEvent> {
        std::iter::from_fn(|| bus.next_event()).collect()
    }

    #[test]
    fn reports_a_single_hit_on_arrival() {
        let mut bus = EventBus::default();
        let target = Vec3::new(12.0, 0.0, 0.0);
        let mut missile = Projectile::new(EntityId(1), Vec3::ZERO, target, 24.0);

        let mut frames = 0;
        while !missile.is_finished() {
            missile.advance(1.0 / 60.0, &mut bus);
            frames += 1;
            assert!(frames < 1000);
        }
        // 12 units at 24 u/s is half a second
        assert!((29..=31).contains(&frames));

        for _ in 0..10 {
            missile.advance(1.0 / 60.0, &mut bus);
        }

        let events = drain(&mut bus);
        assert_eq!(events, vec![SceneEvent::ProjectileHit { id: EntityId(1), point: target }]);
        assert_eq!(missile.position(), target);
        assert_eq!(missile.state(), ProjectileState::Hit);
    }

    #[test]
    fn moves_along_the_line() {
        let mut bus = EventBus::default();
        let mut missile = Projectile::new(EntityId(2), Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0), 10.0);
        missile.advance(1.0, &mut bus);
        assert!((missile.position() - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);
        assert_eq!(missile.distance_traveled, 10.0);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn zero_length_path_hits_immediately() {
        let mut bus = EventBus::default();
        let mut missile = Projectile::new(EntityId(3), Vec3::ONE, Vec3::ONE, 24.0);
        missile.advance(0.016, &mut bus);
        assert_eq!(missile.state(), ProjectileState::Hit);
    }

    #[test]
    fn unmeasurable_path_misses_once() {
        let mut bus = EventBus::default();
        let mut missile = Projectile::new(EntityId(4), Vec3::ZERO, Vec3::new(f32::NAN, 0.0, 0.0), 24.0);
        missile.advance(0.016, &mut bus);
        missile.advance(0.016, &mut bus);
        assert_eq!(drain(&mut bus), vec![SceneEvent::ProjectileMissed { id: EntityId(4) }]);
    }

    #[test]
    fn unmeasurable_step_misses_instead_of_drifting() {
        let mut bus = EventBus::default();
        let mut missile = Projectile::new(EntityId(5), Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0), f32::NAN);
        missile.advance(0.016, &mut bus);
        assert_eq!(missile.state(), ProjectileState::Missed);
        assert_eq!(missile.position(), Vec3::ZERO);
        assert_eq!(drain(&mut bus), vec![SceneEvent::ProjectileMissed { id: EntityId(5) }]);
    }
}
