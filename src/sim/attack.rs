use bevy::log::{debug, info};
use bevy::math::{Quat, Vec3};

use crate::config::{AttackConfig, LAUNCH_PAD_CLEARANCE, ROCKET_TOTAL_LENGTH};
use crate::sim::events::{EntityId, EventBus, SceneEvent};
use crate::sim::orbital::{follow, heading_rotation, random_point_on_sphere};
use crate::sim::random::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttackPhase {
    PreLaunch,
    VerticalAscent,
    ApproachingTarget,
    FiringMissiles,
    MissionComplete,
    Disappeared,
}

// what the vehicle may know about its target each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub position: Vec3,
    pub operational: bool,
}

// plume state, shared by both rockets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExhaustLook {
    pub visible: bool,
    pub intensity: f32,
    pub length: f32,
}

impl ExhaustLook {
    pub const OFF: Self = Self { visible: false, intensity: 0.0, length: 0.0 };

    pub fn burning(intensity: f32, rng: &mut dyn RandomSource) -> Self {
        Self {
            visible: true,
            intensity,
            length: 1.3 + rng.next_f32() * 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttackVehicle {
    pub id: EntityId,
    config: AttackConfig,
    phase: AttackPhase,
    phase_started_at: f32,
    launch_position: Vec3,
    up: Vec3,
    position: Vec3,
    heading: Vec3,
    last_fire_at: Option<f32>,
    exhaust: ExhaustLook,
}

impl AttackVehicle {
    pub fn new(id: EntityId, config: &AttackConfig, body_radius: f32, now: f32, rng: &mut dyn RandomSource) -> Self {
        let launch_position = random_point_on_sphere(body_radius, rng);
        let up = launch_position.normalize_or(Vec3::Y);
        let position = launch_position + up * LAUNCH_PAD_CLEARANCE;
        info!(
            "Attack vehicle {} on the pad at ({:.1}, {:.1}, {:.1})",
            id, launch_position.x, launch_position.y, launch_position.z
        );

        Self {
            id,
            config: config.clone(),
            phase: AttackPhase::PreLaunch,
            phase_started_at: now,
            launch_position,
            up,
            position,
            heading: up,
            last_fire_at: None,
            exhaust: ExhaustLook::OFF,
        }
    }

    pub fn advance(
        &mut self,
        now: f32,
        dt: f32,
        target: Option<TargetView>,
        rng: &mut dyn RandomSource,
        bus: &mut EventBus,
    ) {
        let elapsed = now - self.phase_started_at;
        let next = match self.phase {
            AttackPhase::PreLaunch => self.tick_pre_launch(elapsed),
            AttackPhase::VerticalAscent => self.tick_ascent(elapsed, rng),
            AttackPhase::ApproachingTarget => self.tick_approach(elapsed, dt, target, rng),
            AttackPhase::FiringMissiles => self.tick_firing(now, elapsed, dt, target, rng, bus),
            AttackPhase::MissionComplete => self.tick_retreat(elapsed, dt, rng),
            AttackPhase::Disappeared => None,
        };

        if let Some(phase) = next {
            self.enter(phase, now, bus);
        }
    }

    fn enter(&mut self, phase: AttackPhase, now: f32, bus: &mut EventBus) {
        debug!("Attack vehicle {} {:?} -> {:?}", self.id, self.phase, phase);
        self.phase = phase;
        self.phase_started_at = now;

        match phase {
            AttackPhase::FiringMissiles => {
                self.last_fire_at = None;
                info!("Attack vehicle {} in range, opening fire", self.id);
            }
            AttackPhase::MissionComplete => info!("Attack vehicle {} mission complete, breaking off", self.id),
            AttackPhase::Disappeared => {
                self.exhaust = ExhaustLook::OFF;
                bus.emit(SceneEvent::AttackMissionComplete { id: self.id });
            }
            _ => {}
        }
    }

    fn tick_pre_launch(&mut self, elapsed: f32) -> Option<AttackPhase> {
        self.exhaust = ExhaustLook::OFF;
        (elapsed >= self.config.pre_launch).then_some(AttackPhase::VerticalAscent)
    }

    fn tick_ascent(&mut self, elapsed: f32, rng: &mut dyn RandomSource) -> Option<AttackPhase> {
        self.position = self.pad() + self.up * self.config.ascent_speed * elapsed;
        self.heading = self.up;
        self.exhaust = ExhaustLook::burning(3.0, rng);
        (elapsed >= self.config.ascent).then_some(AttackPhase::ApproachingTarget)
    }

    fn tick_approach(
        &mut self,
        elapsed: f32,
        dt: f32,
        target: Option<TargetView>,
        rng: &mut dyn RandomSource,
    ) -> Option<AttackPhase> {
        let Some(target) = target.filter(|t| t.operational) else {
            return Some(AttackPhase::MissionComplete);
        };

        let t = (elapsed / self.config.approach).clamp(0.0, 1.0);
        self.close_in(target.position, t * t, dt);
        self.exhaust = ExhaustLook::burning(2.5, rng);
        (elapsed >= self.config.approach).then_some(AttackPhase::FiringMissiles)
    }

    fn tick_firing(
        &mut self,
        now: f32,
        elapsed: f32,
        dt: f32,
        target: Option<TargetView>,
        rng: &mut dyn RandomSource,
        bus: &mut EventBus,
    ) -> Option<AttackPhase> {
        let Some(target) = target.filter(|t| t.operational) else {
            return Some(AttackPhase::MissionComplete);
        };

        self.close_in(target.position, 1.0, dt);
        self.exhaust = ExhaustLook::burning(2.0, rng);

        let due = self
            .last_fire_at
            .is_none_or(|last| now - last >= self.config.fire_interval);
        if due {
            self.last_fire_at = Some(now);
            let spread = rng.range(0.0, self.config.missile_spread);
            let aim = target.position + random_point_on_sphere(spread, rng);
            bus.emit(SceneEvent::MissileFired { start: self.nose(), target: aim });
        }

        (elapsed >= self.config.firing).then_some(AttackPhase::MissionComplete)
    }

    fn tick_retreat(&mut self, elapsed: f32, dt: f32, rng: &mut dyn RandomSource) -> Option<AttackPhase> {
        self.position += self.heading * self.config.retreat_speed * dt;
        self.exhaust = ExhaustLook::burning(3.0, rng);
        (elapsed >= self.config.mission_complete).then_some(AttackPhase::Disappeared)
    }

    // ease from the top of the ascent toward a point short of the target
    fn close_in(&mut self, target: Vec3, t: f32, dt: f32) {
        let standoff = target - (target - self.position).normalize_or_zero() * self.config.standoff;
        let desired = self.ascent_end().lerp(standoff, t);
        self.position = follow(self.position, desired, self.config.follow_rate, dt);
        self.heading = (target - self.position).normalize_or(self.heading);
    }

    fn pad(&self) -> Vec3 {
        self.launch_position + self.up * LAUNCH_PAD_CLEARANCE
    }

    fn ascent_end(&self) -> Vec3 {
        self.pad() + self.up * self.config.ascent * self.config.ascent_speed
    }

    pub fn nose(&self) -> Vec3 {
        self.position + self.heading * ROCKET_TOTAL_LENGTH * self.config.scale
    }

    pub fn phase(&self) -> AttackPhase {
        self.phase
    }

    pub fn is_disappeared(&self) -> bool {
        self.phase == AttackPhase::Disappeared
    }

    pub fn is_visible(&self) -> bool {
        self.phase != AttackPhase::Disappeared
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    pub fn rotation(&self) -> Quat {
        heading_rotation(self.heading)
    }

    pub fn scale(&self) -> f32 {
        self.config.scale
    }

    pub fn exhaust(&self) -> ExhaustLook {
        self.exhaust
    }

    pub fn launch_position(&self) -> Vec3 {
        self.launch_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const FRAME: f32 = 1.0 / 60.0;

    fn run(
        vehicle: &mut AttackVehicle,
        until: f32,
        mut target: impl FnMut(f32) -> Option<TargetView>,
        rng: &mut StdRng,
        bus: &mut EventBus,
    ) -> Vec<AttackPhase> {
        let mut phases = vec![vehicle.phase()];
        let mut now = 0.0;
        while now < until {
            now += FRAME;
            vehicle.advance(now, FRAME, target(now), rng, bus);
            if phases.last() != Some(&vehicle.phase()) {
                phases.push(vehicle.phase());
            }
        }
        phases
    }

    fn parked_target(_: f32) -> Option<TargetView> {
        Some(TargetView { position: Vec3::new(10.5, 1.2, 0.0), operational: true })
    }

    #[test]
    fn flies_every_phase_in_order() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut bus = EventBus::default();
        let mut vehicle = AttackVehicle::new(EntityId(1), &AttackConfig::default(), 5.0, 0.0, &mut rng);

        let phases = run(&mut vehicle, 40.0, parked_target, &mut rng, &mut bus);
        assert_eq!(
            phases,
            vec![
                AttackPhase::PreLaunch,
                AttackPhase::VerticalAscent,
                AttackPhase::ApproachingTarget,
                AttackPhase::FiringMissiles,
                AttackPhase::MissionComplete,
                AttackPhase::Disappeared,
            ]
        );

        let completions = std::iter::from_fn(|| bus.next_event())
            .filter(|e| matches!(e, SceneEvent::AttackMissionComplete { .. }))
            .count();
        assert_eq!(completions, 1);
        assert!(!vehicle.is_visible());
    }

    #[test]
    fn lost_target_ends_the_mission_early() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut bus = EventBus::default();
        let mut vehicle = AttackVehicle::new(EntityId(2), &AttackConfig::default(), 5.0, 0.0, &mut rng);

        // target vanishes halfway through the approach
        let phases = run(
            &mut vehicle,
            16.0,
            |now| if now < 14.0 { parked_target(now) } else { None },
            &mut rng,
            &mut bus,
        );

        assert_eq!(
            phases,
            vec![
                AttackPhase::PreLaunch,
                AttackPhase::VerticalAscent,
                AttackPhase::ApproachingTarget,
                AttackPhase::MissionComplete,
            ]
        );
        let fired = std::iter::from_fn(|| bus.next_event())
            .filter(|e| matches!(e, SceneEvent::MissileFired { .. }))
            .count();
        assert_eq!(fired, 0);
    }

    #[test]
    fn dying_target_counts_as_lost() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut bus = EventBus::default();
        let mut vehicle = AttackVehicle::new(EntityId(3), &AttackConfig::default(), 5.0, 0.0, &mut rng);

        let phases = run(
            &mut vehicle,
            20.5,
            |now| {
                parked_target(now).map(|mut t| {
                    t.operational = now < 20.0;
                    t
                })
            },
            &mut rng,
            &mut bus,
        );
        assert_eq!(phases.last(), Some(&AttackPhase::MissionComplete));
        assert!(phases.contains(&AttackPhase::FiringMissiles));
    }

    #[test]
    fn fires_on_a_fixed_interval() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut bus = EventBus::default();
        let config = AttackConfig::default();
        let mut vehicle = AttackVehicle::new(EntityId(4), &config, 5.0, 0.0, &mut rng);

        run(&mut vehicle, 30.0, parked_target, &mut rng, &mut bus);

        let shots: Vec<(Vec3, Vec3)> = std::iter::from_fn(|| bus.next_event())
            .filter_map(|e| match e {
                SceneEvent::MissileFired { start, target } => Some((start, target)),
                _ => None,
            })
            .collect();
        // 5 s of firing every 0.4 s
        assert!((12..=14).contains(&shots.len()), "fired {} missiles", shots.len());

        let aim = parked_target(0.0).map(|t| t.position).unwrap_or_default();
        for (_, target) in shots {
            assert!(target.distance(aim) <= config.missile_spread + 1e-4);
        }
    }

    #[test]
    fn climbs_straight_up_from_the_pad() {
        let mut rng = StdRng::seed_from_u64(15);
        let mut bus = EventBus::default();
        let mut vehicle = AttackVehicle::new(EntityId(5), &AttackConfig::default(), 5.0, 0.0, &mut rng);
        let up = vehicle.launch_position().normalize();

        run(&mut vehicle, 5.0, parked_target, &mut rng, &mut bus);
        assert_eq!(vehicle.phase(), AttackPhase::VerticalAscent);
        let offset = vehicle.position() - vehicle.launch_position();
        assert!(offset.normalize().dot(up) > 0.999);
        assert!((vehicle.position().length() - (5.0 + 0.02 + 2.0 * 3.0)).abs() < 0.1);
    }
}
