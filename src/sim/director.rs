//! Owns every actor, advances them in a fixed order and drains their events
//! in the same frame.

use std::f32::consts::TAU;

use bevy::log::{debug, info};
use bevy::math::Vec3;

use crate::config::SceneConfig;
use crate::sim::attack::{AttackVehicle, TargetView};
use crate::sim::body::CelestialBody;
use crate::sim::events::{EntityId, EventBus, IdAllocator, SceneEvent};
use crate::sim::explosion::ExplosionEffect;
use crate::sim::hostile::{DamageOutcome, HostileCraft};
use crate::sim::launcher::PayloadVehicle;
use crate::sim::payload::Payload;
use crate::sim::projectile::Projectile;
use crate::sim::random::RandomSource;

// longest step one update integrates
const MAX_STEP: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    AlienAttack,
    PayloadDeployment,
}

pub struct SceneDirector {
    config: SceneConfig,
    rng: Box<dyn RandomSource + Send + Sync>,
    bus: EventBus,
    ids: IdAllocator,
    body: CelestialBody,
    now: f32,
    last_update: Option<f32>,
    phase: GamePhase,
    hostile: Option<HostileCraft>,
    craft_vanished: bool,
    attack: Option<AttackVehicle>,
    attack_missions_completed: u32,
    launcher: Option<PayloadVehicle>,
    // one-shot staggered launch timer, cancelled on teardown
    pending_launch: Option<f32>,
    projectiles: Vec<Projectile>,
    explosions: Vec<ExplosionEffect>,
    payloads: Vec<Payload>,
    torn_down: bool,
}

impl SceneDirector {
    pub fn new(config: SceneConfig, mut rng: Box<dyn RandomSource + Send + Sync>, now: f32) -> Self {
        let initial_angle = rng.range(0.0, TAU);
        let hostile = HostileCraft::new(&config.hostile, initial_angle, now);
        info!(
            "Scene mounted: hostile craft entering at angle {:.2}, {} payloads to deploy",
            initial_angle, config.payloads.max_payloads
        );

        Self {
            body: CelestialBody::new(&config.body),
            config,
            rng,
            bus: EventBus::default(),
            ids: IdAllocator::default(),
            now,
            last_update: None,
            phase: GamePhase::AlienAttack,
            hostile: Some(hostile),
            craft_vanished: false,
            attack: None,
            attack_missions_completed: 0,
            launcher: None,
            pending_launch: None,
            projectiles: Vec::new(),
            explosions: Vec::new(),
            payloads: Vec::new(),
            torn_down: false,
        }
    }

    pub fn update(&mut self, now: f32) {
        if self.torn_down {
            return;
        }

        let dt = self
            .last_update
            .map_or(0.0, |previous| (now - previous).clamp(0.0, MAX_STEP));
        self.last_update = Some(now);
        self.now = now;

        if self.pending_launch.is_some_and(|due| now >= due) {
            self.pending_launch = None;
            self.launch_payload_vehicle(now);
        }

        if let Some(hostile) = self.hostile.as_mut() {
            hostile.advance(now, &mut *self.rng, &mut self.bus);
        }

        let hostile_operational = self.hostile.as_ref().is_some_and(HostileCraft::is_operational);
        if self.phase == GamePhase::AlienAttack && hostile_operational && self.attack.is_none() {
            let id = self.ids.next_id();
            self.attack = Some(AttackVehicle::new(
                id,
                &self.config.attack,
                self.body.radius,
                now,
                &mut *self.rng,
            ));
        }

        let target = self.hostile.as_ref().map(|craft| TargetView {
            position: craft.position(),
            operational: craft.is_operational(),
        });
        if let Some(attack) = self.attack.as_mut() {
            attack.advance(now, dt, target, &mut *self.rng, &mut self.bus);
        }

        if let Some(launcher) = self.launcher.as_mut() {
            launcher.advance(now, dt, &mut *self.rng, &mut self.bus);
        }

        for projectile in &mut self.projectiles {
            projectile.advance(dt, &mut self.bus);
        }

        for explosion in &mut self.explosions {
            explosion.advance(now, &mut self.bus);
        }

        while let Some(event) = self.bus.next_event() {
            self.handle(event, now);
        }

        if self.phase == GamePhase::AlienAttack && self.attack_is_over() {
            self.phase = GamePhase::PayloadDeployment;
            info!("Hostile threat cleared, switching to payload deployment");
            self.launch_payload_vehicle(now);
        }
    }

    fn attack_is_over(&self) -> bool {
        self.craft_vanished
            && self.attack.is_none()
            && self.attack_missions_completed > 0
            && self.projectiles.is_empty()
            && self.explosions.is_empty()
    }

    fn handle(&mut self, event: SceneEvent, now: f32) {
        match event {
            SceneEvent::MissileFired { start, target } => {
                let id = self.ids.next_id();
                let cfg = &self.config.projectile;
                self.projectiles.push(Projectile::new(id, start, target, cfg.speed));
            }
            SceneEvent::ProjectileHit { id, point } => {
                self.projectiles.retain(|p| p.id != id);

                let amount = self
                    .rng
                    .range_u32(self.config.projectile.damage_min, self.config.projectile.damage_max);
                let outcome = match self.hostile.as_mut() {
                    Some(craft) => craft.take_damage(amount, point, now, &mut self.bus),
                    None => DamageOutcome::Immune,
                };

                let blasts = &self.config.explosion;
                let scale = match outcome {
                    DamageOutcome::Hit => blasts.hit_scale,
                    DamageOutcome::Destroyed => blasts.killing_blow_scale,
                    DamageOutcome::Immune => blasts.miss_scale,
                };
                self.spawn_explosion(point, scale, now);
            }
            SceneEvent::ProjectileMissed { id } => {
                debug!("Projectile {} missed", id);
                self.projectiles.retain(|p| p.id != id);
            }
            SceneEvent::HealthDepleted { position } => {
                self.spawn_explosion(position, self.config.explosion.terminal_scale, now);
            }
            SceneEvent::CraftVanished => {
                self.craft_vanished = true;
                self.hostile = None;
            }
            SceneEvent::ExplosionFinished { id } => {
                self.explosions.retain(|e| e.id != id);
            }
            SceneEvent::PayloadDeployed { orbit } => {
                if self.payloads.len() < self.config.payloads.max_payloads {
                    let id = self.ids.next_id();
                    self.payloads.push(Payload::new(id, orbit, now));
                    info!(
                        "Payload {} in orbit ({}/{})",
                        id,
                        self.payloads.len(),
                        self.config.payloads.max_payloads
                    );
                }
            }
            SceneEvent::AttackMissionComplete { id } => {
                if self.attack.as_ref().is_some_and(|a| a.id == id) {
                    self.attack = None;
                }
                self.attack_missions_completed += 1;
            }
            SceneEvent::LauncherMissionComplete { id } => {
                if self.launcher.as_ref().is_some_and(|l| l.id == id) {
                    self.launcher = None;
                }
                if self.phase == GamePhase::PayloadDeployment && !self.payload_cap_reached() {
                    self.schedule_payload_launch(now);
                } else if self.payload_cap_reached() {
                    info!("All {} payloads deployed", self.config.payloads.max_payloads);
                }
            }
        }
    }

    fn spawn_explosion(&mut self, position: Vec3, scale: f32, now: f32) {
        let id = self.ids.next_id();
        let duration = self.config.explosion_duration(scale);
        let large = scale > self.config.explosion.large_threshold;
        self.explosions.push(ExplosionEffect::new(
            id,
            position,
            scale,
            now,
            duration,
            large,
            &mut *self.rng,
        ));
    }

    fn schedule_payload_launch(&mut self, now: f32) {
        let cfg = &self.config.payloads;
        let delay = self.rng.range(cfg.launch_delay_min, cfg.launch_delay_max);
        self.pending_launch = Some(now + delay);
        info!("Next payload vehicle launches in {:.1}s", delay);
    }

    fn launch_payload_vehicle(&mut self, now: f32) {
        if self.launcher.is_some() || self.payload_cap_reached() {
            return;
        }
        let id = self.ids.next_id();
        self.launcher = Some(PayloadVehicle::new(
            id,
            &self.config.launcher,
            &self.config.payloads,
            self.body.radius,
            now,
            &mut *self.rng,
        ));
    }

    fn payload_cap_reached(&self) -> bool {
        self.payloads.len() >= self.config.payloads.max_payloads
    }

    // unmount: cancel the pending launch, go inert
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.pending_launch = None;
        self.bus.clear();
        self.attack = None;
        self.launcher = None;
        self.projectiles.clear();
        self.explosions.clear();
        info!("Scene torn down");
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SceneEvent) + Send + Sync + 'static) {
        self.bus.subscribe(listener);
    }

    /// Returns false for unknown ids.
    pub fn highlight_payload(&mut self, id: EntityId) -> bool {
        let now = self.now;
        let duration = self.config.payloads.highlight_duration;
        match self.payloads.iter_mut().find(|p| p.id == id) {
            Some(payload) => {
                payload.highlight(now, duration);
                true
            }
            None => false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn body(&self) -> &CelestialBody {
        &self.body
    }

    pub fn hostile(&self) -> Option<&HostileCraft> {
        self.hostile.as_ref()
    }

    pub fn attack_vehicle(&self) -> Option<&AttackVehicle> {
        self.attack.as_ref()
    }

    pub fn payload_vehicle(&self) -> Option<&PayloadVehicle> {
        self.launcher.as_ref()
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn explosions(&self) -> &[ExplosionEffect] {
        &self.explosions
    }

    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    pub fn pending_launch(&self) -> Option<f32> {
        self.pending_launch
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hostile::CraftStatus;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::{Arc, Mutex};

    const FRAME: f32 = 1.0 / 60.0;

    fn director(seed: u64) -> SceneDirector {
        SceneDirector::new(SceneConfig::default(), Box::new(StdRng::seed_from_u64(seed)), 0.0)
    }

    fn record(director: &mut SceneDirector) -> Arc<Mutex<Vec<SceneEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        director.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        log
    }

    #[test]
    fn starts_in_attack_phase_with_an_entering_craft() {
        let mut d = director(1);
        d.update(0.0);
        assert_eq!(d.phase(), GamePhase::AlienAttack);
        assert_eq!(d.hostile().map(|h| h.status()), Some(CraftStatus::Entering));
        assert!(d.attack_vehicle().is_none());
    }

    #[test]
    fn sends_an_attack_vehicle_once_the_craft_is_ready() {
        let mut d = director(2);
        let mut now = 0.0;
        while now < 3.0 {
            now += FRAME;
            d.update(now);
        }
        assert!(d.hostile().is_some_and(HostileCraft::is_operational));
        assert!(d.attack_vehicle().is_some());
    }

    #[test]
    fn full_scenario_ends_with_every_payload_deployed() {
        let mut d = director(3);
        let events = record(&mut d);

        let mut now = 0.0;
        let mut phase_switch_at = None;
        let mut max_attack = 0;
        let mut max_launchers = 0;
        while now < 400.0 {
            now += FRAME;
            d.update(now);

            max_attack = max_attack.max(d.attack_vehicle().iter().count());
            max_launchers = max_launchers.max(d.payload_vehicle().iter().count());
            assert!(d.payloads().len() <= 5);
            for p in d.projectiles() {
                assert!(!p.is_finished(), "finished projectile left in the live list");
            }

            if phase_switch_at.is_none() && d.phase() == GamePhase::PayloadDeployment {
                phase_switch_at = Some(now);
                assert!(d.hostile().is_none());
                assert!(d.attack_vehicle().is_none());
                assert!(d.projectiles().is_empty());
                assert!(d.explosions().is_empty());
            }
        }

        assert!(phase_switch_at.is_some(), "craft was never destroyed");
        assert_eq!(d.phase(), GamePhase::PayloadDeployment);
        assert_eq!(d.payloads().len(), 5);
        assert!(d.payload_vehicle().is_none());
        assert!(d.pending_launch().is_none());
        assert_eq!(max_attack, 1);
        assert_eq!(max_launchers, 1);

        let events = events.lock().unwrap();
        let count = |pred: fn(&SceneEvent) -> bool| events.iter().filter(|e| pred(e)).count();
        assert_eq!(count(|e| matches!(e, SceneEvent::HealthDepleted { .. })), 1);
        assert_eq!(count(|e| matches!(e, SceneEvent::CraftVanished)), 1);
        assert_eq!(count(|e| matches!(e, SceneEvent::PayloadDeployed { .. })), 5);
        assert_eq!(count(|e| matches!(e, SceneEvent::LauncherMissionComplete { .. })), 5);

        // every missile resolves exactly once
        let fired = count(|e| matches!(e, SceneEvent::MissileFired { .. }));
        let resolved = count(|e| matches!(e, SceneEvent::ProjectileHit { .. } | SceneEvent::ProjectileMissed { .. }));
        assert_eq!(fired, resolved);
    }

    #[test]
    fn hits_become_damage_and_sized_blasts() {
        let mut d = director(8);
        let mut seen = std::collections::HashSet::new();
        let mut blasts: Vec<(f32, Vec3)> = Vec::new();
        let mut drops = Vec::new();
        let mut craft_at = None;
        let mut terminal_near_craft = false;

        let mut now = 0.0;
        while !d.craft_vanished && now < 200.0 {
            let health_before = d.hostile().map(HostileCraft::health);
            now += FRAME;
            d.update(now);

            if let (Some(before), Some(after)) = (health_before, d.hostile().map(HostileCraft::health)) {
                if after < before {
                    drops.push(before - after);
                }
            }
            for blast in d.explosions() {
                if seen.insert(blast.id) {
                    blasts.push((blast.scale, blast.position));
                    if blast.scale == 7.0 {
                        let previous: Vec3 = craft_at.unwrap_or(Vec3::ZERO);
                        terminal_near_craft = blast.position.distance(previous) < 1.0;
                    }
                }
            }
            craft_at = d.hostile().map(HostileCraft::position);
        }
        assert!(d.craft_vanished, "craft was never destroyed");

        let scales: Vec<f32> = blasts.iter().map(|(scale, _)| *scale).collect();
        for scale in &scales {
            assert!([1.3, 2.2, 7.0, 0.8].contains(scale), "unexpected blast scale {scale}");
        }
        assert!(scales.contains(&1.3));
        assert_eq!(scales.iter().filter(|s| **s == 2.2).count(), 1);
        assert_eq!(scales.iter().filter(|s| **s == 7.0).count(), 1);
        assert!(terminal_near_craft);

        // 250 health at 18..=25 per hit, last hit may overkill
        assert!(!drops.is_empty());
        let (last, rest) = drops.split_last().unwrap();
        for drop in rest {
            assert!((18..=25).contains(drop), "health dropped by {drop}");
        }
        assert!((1..=25).contains(last));
        assert_eq!(drops.iter().sum::<u32>(), 250);

        // a late missile with nothing left to hit still leaves a small blast
        let before = d.explosions().len();
        d.handle(SceneEvent::ProjectileHit { id: EntityId(u64::MAX), point: Vec3::X * 9.0 }, now);
        assert_eq!(d.explosions().len(), before + 1);
        assert_eq!(d.explosions()[before].scale, 0.8);
    }

    #[test]
    fn hits_during_entry_leave_health_untouched() {
        let mut d = director(9);
        d.update(0.0);
        assert_eq!(d.hostile().map(|h| h.status()), Some(CraftStatus::Entering));

        d.handle(SceneEvent::ProjectileHit { id: EntityId(u64::MAX), point: Vec3::ZERO }, 0.0);
        assert_eq!(d.hostile().map(HostileCraft::health), Some(250));
        assert_eq!(d.explosions().len(), 1);
        assert_eq!(d.explosions()[0].scale, 0.8);
    }

    #[test]
    fn same_seed_replays_the_same_scene() {
        let mut a = director(4);
        let mut b = director(4);
        let mut now = 0.0;
        while now < 60.0 {
            now += FRAME;
            a.update(now);
            b.update(now);
        }
        assert_eq!(a.phase(), b.phase());
        assert_eq!(a.hostile().map(|h| h.health()), b.hostile().map(|h| h.health()));
        assert_eq!(
            a.attack_vehicle().map(|v| v.position()),
            b.attack_vehicle().map(|v| v.position())
        );
        assert_eq!(a.payloads().len(), b.payloads().len());
    }

    #[test]
    fn teardown_cancels_the_pending_launch() {
        let mut d = director(5);
        let mut now = 0.0;
        while d.pending_launch().is_none() && now < 400.0 {
            now += FRAME;
            d.update(now);
        }
        assert!(d.pending_launch().is_some());
        let deployed = d.payloads().len();

        d.teardown();
        assert!(d.is_torn_down());
        assert!(d.pending_launch().is_none());

        for _ in 0..600 {
            now += FRAME;
            d.update(now);
        }
        assert!(d.payload_vehicle().is_none());
        assert_eq!(d.payloads().len(), deployed);
    }

    #[test]
    fn highlight_targets_a_deployed_payload() {
        let mut d = director(6);
        let mut now = 0.0;
        while d.payloads().is_empty() && now < 400.0 {
            now += FRAME;
            d.update(now);
        }
        let id = d.payloads()[0].id;
        assert!(d.highlight_payload(id));
        assert!(d.payloads()[0].is_highlighted(now + 1.0));
        assert!(!d.highlight_payload(EntityId(u64::MAX)));
    }

    #[test]
    fn stalled_frames_are_clamped() {
        let mut d = director(7);
        let mut now = 0.0;
        while d.projectiles().is_empty() && now < 60.0 {
            now += FRAME;
            d.update(now);
        }
        let before = d.projectiles()[0].distance_traveled;
        d.update(now + 5.0);
        if let Some(p) = d.projectiles().first() {
            assert!(p.distance_traveled - before <= 24.0 * MAX_STEP + 1e-3);
        }
    }
}
