//! Hostile craft (the UFO). `Entering -> Operational -> Dying -> Destroyed`.

use std::f32::consts::PI;

use bevy::log::{debug, info};
use bevy::math::{EulerRot, Quat, Vec3};
use bevy::transform::components::Transform;

use crate::config::{HostileConfig, UFO_RIM_LIGHT_COUNT};
use crate::sim::events::{EventBus, SceneEvent};
use crate::sim::orbital::{OrbitalParams, lerp, smootherstep};
use crate::sim::random::RandomSource;

// srgb
pub const HULL_GLOW: Vec3 = Vec3::new(0.416, 0.051, 0.678);
pub const DOME_GLOW: Vec3 = Vec3::new(0.576, 0.439, 0.859);
pub const HIT_HULL_GLOW: Vec3 = Vec3::new(1.0, 0.1, 0.05);
pub const HIT_DOME_GLOW: Vec3 = Vec3::new(0.9, 0.2, 0.1);

const HULL_INTENSITY: f32 = 0.35;
const DOME_INTENSITY: f32 = 0.5;
const ENGINE_INTENSITY: f32 = 2.5;
const RIM_INTENSITY: f32 = 3.5;
const FLAME_INTENSITY: f32 = 2.5;
const FLAME_LIGHT_INTENSITY: f32 = 2.0;
const ENTRY_START_SCALE: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CraftStatus {
    Entering,
    Operational,
    Dying,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    Hit,
    Destroyed,
    Immune,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlameLook {
    pub visible: bool,
    pub opacity: f32,
    pub intensity: f32,
    pub scale: Vec3,
    pub light_intensity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CraftLook {
    pub visible: bool,
    pub hull: Glow,
    pub dome: Glow,
    pub engine_intensity: f32,
    pub rim_intensities: [f32; UFO_RIM_LIGHT_COUNT],
    pub flame: FlameLook,
    pub pilot_visible: bool,
    pub pilot_bob: f32,
    pub pilot_spin: f32,
    /// Cabin and rim-glow light levels, dimmed once the craft is dying.
    pub cabin_light: f32,
    pub hull_light: f32,
}

impl Default for CraftLook {
    fn default() -> Self {
        Self {
            visible: true,
            hull: Glow { color: HULL_GLOW, intensity: HULL_INTENSITY },
            dome: Glow { color: DOME_GLOW, intensity: DOME_INTENSITY },
            engine_intensity: ENGINE_INTENSITY,
            rim_intensities: [RIM_INTENSITY; UFO_RIM_LIGHT_COUNT],
            flame: FlameLook {
                visible: true,
                opacity: 0.8,
                intensity: FLAME_INTENSITY,
                scale: Vec3::ONE,
                light_intensity: FLAME_LIGHT_INTENSITY,
            },
            pilot_visible: true,
            pilot_bob: 0.0,
            pilot_spin: 0.0,
            cabin_light: 0.7,
            hull_light: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HostileCraft {
    orbit: OrbitalParams,
    config: HostileConfig,
    health: u32,
    status: CraftStatus,
    spawned_at: f32,
    ready_at: Option<f32>,
    last_hit_at: Option<f32>,
    dying_started_at: Option<f32>,
    position: Vec3,
    rotation: Quat,
    scale: f32,
    // accumulated shake while dying
    jitter_offset: Vec3,
    look: CraftLook,
}

impl HostileCraft {
    pub fn new(config: &HostileConfig, initial_angle: f32, now: f32) -> Self {
        let orbit = OrbitalParams {
            radius: config.orbit_radius,
            y_offset: config.y_offset,
            angular_speed: config.angular_speed,
            initial_angle,
        };
        let position = orbit.position(0.0);

        Self {
            orbit,
            config: config.clone(),
            health: config.max_health,
            status: CraftStatus::Entering,
            spawned_at: now,
            ready_at: None,
            last_hit_at: None,
            dying_started_at: None,
            position,
            rotation: facing_body(position),
            scale: ENTRY_START_SCALE,
            jitter_offset: Vec3::ZERO,
            look: CraftLook::default(),
        }
    }

    pub fn advance(&mut self, now: f32, rng: &mut dyn RandomSource, bus: &mut EventBus) {
        match self.status {
            CraftStatus::Entering => self.tick_entering(now),
            CraftStatus::Operational => self.tick_operational(now, rng),
            CraftStatus::Dying => self.tick_dying(now, rng, bus),
            CraftStatus::Destroyed => {}
        }
    }

    fn tick_entering(&mut self, now: f32) {
        let progress = ((now - self.spawned_at) / self.config.entry_duration).clamp(0.0, 1.0);
        self.scale = lerp(ENTRY_START_SCALE, 1.0, smootherstep(progress));
        self.position = self.orbit.position(0.0);
        self.rotation = facing_body(self.position);

        if progress >= 1.0 {
            self.scale = 1.0;
            self.ready_at = Some(now);
            self.status = CraftStatus::Operational;
            info!("Hostile craft entry complete, now operational");
        }
    }

    fn tick_operational(&mut self, now: f32, rng: &mut dyn RandomSource) {
        let since_ready = now - self.ready_at.unwrap_or(now);
        self.position = self.orbit_position(since_ready, now);

        let sway_x = (now * 0.25).sin() * 0.03;
        let sway_z = (now * 0.35).cos() * 0.025;
        self.rotation = facing_body(self.position) * Quat::from_euler(EulerRot::XYZ, sway_x, 0.0, sway_z);

        let look = &mut self.look;
        look.engine_intensity = ENGINE_INTENSITY + (now * 2.5).sin() * ENGINE_INTENSITY * 0.6;
        for (i, rim) in look.rim_intensities.iter_mut().enumerate() {
            *rim = RIM_INTENSITY + (now * (3.0 + (i as f32 * 0.1).sin())).sin() * 2.0;
        }

        let pulse = (now * 5.0).sin() * 0.8 + 0.8;
        look.flame = FlameLook {
            visible: true,
            opacity: 0.6 + pulse * 0.2,
            intensity: FLAME_INTENSITY * pulse,
            scale: Vec3::new(0.7 + pulse * 0.15, 0.8 + pulse * 0.25, 0.7 + pulse * 0.15),
            light_intensity: FLAME_INTENSITY * pulse * 0.8,
        };

        look.pilot_bob = (now * 1.2).sin() * 0.05;
        look.pilot_spin = now * 0.2;

        let flickering = self
            .last_hit_at
            .is_some_and(|hit| now < hit + self.config.hit_flicker);
        if flickering {
            let intensity = 6.0 + rng.next_f32() * 4.0;
            look.hull = Glow { color: HIT_HULL_GLOW, intensity };
            look.dome = Glow { color: HIT_DOME_GLOW, intensity: intensity * 0.6 };
        } else {
            look.hull = Glow { color: HULL_GLOW, intensity: HULL_INTENSITY };
            look.dome = Glow { color: DOME_GLOW, intensity: DOME_INTENSITY };
        }
    }

    fn tick_dying(&mut self, now: f32, rng: &mut dyn RandomSource, bus: &mut EventBus) {
        let started = self.dying_started_at.unwrap_or(now);
        let progress = ((now - started) / self.config.dying_duration).clamp(0.0, 1.0);

        self.jitter_offset += Vec3::new(rng.centered() * 0.2, rng.centered() * 0.1, rng.centered() * 0.2) * progress;
        self.rotation = self.rotation
            * Quat::from_euler(
                EulerRot::XYZ,
                rng.centered() * 0.1 * progress,
                rng.centered() * 0.1 * progress,
                rng.centered() * 0.1 * progress,
            );

        let remaining = 1.0 - progress;
        let look = &mut self.look;
        look.engine_intensity = ENGINE_INTENSITY * remaining * (0.5 + rng.next_f32() * 0.5);
        for rim in look.rim_intensities.iter_mut() {
            *rim = (RIM_INTENSITY + rng.next_f32() * 2.0) * remaining;
        }

        if look.flame.visible {
            look.flame.opacity = (0.8 * remaining * (0.5 + rng.next_f32() * 0.5)).max(0.0);
            look.flame.intensity = (FLAME_INTENSITY * remaining * (0.5 + rng.next_f32() * 0.5)).max(0.0);
            look.flame.light_intensity = (FLAME_LIGHT_INTENSITY * remaining * (0.5 + rng.next_f32() * 0.5)).max(0.0);
            if look.flame.opacity <= 0.01 {
                look.flame.visible = false;
            }
        }
        look.pilot_visible = remaining > 0.1;
        look.cabin_light = 0.2;
        look.hull_light = 0.3;

        if progress >= 1.0 {
            self.status = CraftStatus::Destroyed;
            look.visible = false;
            look.flame.visible = false;
            look.pilot_visible = false;
            info!("Hostile craft dying sequence complete, vanished");
            bus.emit(SceneEvent::CraftVanished);
        }
    }

    /// Applies damage while operational. Any other state (including the entry
    /// animation) reports `Immune` and leaves health untouched.
    pub fn take_damage(&mut self, amount: u32, hit_point: Vec3, now: f32, bus: &mut EventBus) -> DamageOutcome {
        if self.status != CraftStatus::Operational || amount == 0 {
            return DamageOutcome::Immune;
        }

        self.last_hit_at = Some(now);
        self.health = self.health.saturating_sub(amount);
        debug!(
            "Hostile craft hit for {} at ({:.1}, {:.1}, {:.1}), health {}/{}",
            amount, hit_point.x, hit_point.y, hit_point.z, self.health, self.config.max_health
        );

        if self.health == 0 {
            self.status = CraftStatus::Dying;
            self.dying_started_at = Some(now);
            info!("Hostile craft health depleted, dying");
            bus.emit(SceneEvent::HealthDepleted { position: self.position() });
            return DamageOutcome::Destroyed;
        }

        DamageOutcome::Hit
    }

    // no jitter, just orbit plus bob
    pub fn orbit_position(&self, since_ready: f32, now: f32) -> Vec3 {
        let mut position = self.orbit.position(since_ready);
        position.y += (now * self.config.bob_frequency).sin() * self.config.bob_amplitude;
        position
    }

    pub fn status(&self) -> CraftStatus {
        self.status
    }

    pub fn is_operational(&self) -> bool {
        self.status == CraftStatus::Operational
    }

    pub fn is_destroyed(&self) -> bool {
        self.status == CraftStatus::Destroyed
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.config.max_health
    }

    pub fn orbit(&self) -> &OrbitalParams {
        &self.orbit
    }

    pub fn position(&self) -> Vec3 {
        self.position + self.jitter_offset
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn look(&self) -> &CraftLook {
        &self.look
    }
}

// saucer underside toward the body, dome away from it
fn facing_body(position: Vec3) -> Quat {
    Transform::from_translation(position)
        .looking_at(Vec3::ZERO, Vec3::Y)
        .rotation
        * Quat::from_rotation_y(PI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const FRAME: f32 = 1.0 / 60.0;

    fn ready_craft(rng: &mut StdRng, bus: &mut EventBus) -> (HostileCraft, f32) {
        let config = HostileConfig::default();
        let mut craft = HostileCraft::new(&config, 0.5, 0.0);
        let mut now = 0.0;
        while craft.status() == CraftStatus::Entering {
            now += FRAME;
            craft.advance(now, rng, bus);
        }
        (craft, now)
    }

    fn count_depleted(bus: &mut EventBus) -> usize {
        std::iter::from_fn(|| bus.next_event())
            .filter(|e| matches!(e, SceneEvent::HealthDepleted { .. }))
            .count()
    }

    #[test]
    fn immune_while_entering() {
        let mut bus = EventBus::default();
        let mut craft = HostileCraft::new(&HostileConfig::default(), 0.0, 0.0);
        assert_eq!(craft.take_damage(50, Vec3::ZERO, 0.5, &mut bus), DamageOutcome::Immune);
        assert_eq!(craft.health(), 250);
        assert!(craft.scale() < 0.02);
    }

    #[test]
    fn entry_grows_to_full_size_then_operates() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bus = EventBus::default();
        let (craft, now) = ready_craft(&mut rng, &mut bus);
        assert_eq!(craft.scale(), 1.0);
        assert!((now - 2.8).abs() < 2.0 * FRAME);
        assert!(craft.is_operational());
    }

    #[test]
    fn health_is_monotone_and_never_negative() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut bus = EventBus::default();
        let (mut craft, mut now) = ready_craft(&mut rng, &mut bus);

        let mut last = craft.health();
        for amount in [18, 25, 0, 21, 100, 70, 33, 40] {
            now += 0.4;
            craft.advance(now, &mut rng, &mut bus);
            craft.take_damage(amount, craft.position(), now, &mut bus);
            assert!(craft.health() <= last);
            last = craft.health();
        }
        assert_eq!(craft.health(), 0);
        assert_eq!(craft.status(), CraftStatus::Dying);

        for _ in 0..5 {
            assert_eq!(craft.take_damage(25, Vec3::ZERO, now, &mut bus), DamageOutcome::Immune);
            assert_eq!(craft.health(), 0);
        }
        assert_eq!(count_depleted(&mut bus), 1);
    }

    #[test]
    fn overkill_clamps_to_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut bus = EventBus::default();
        let (mut craft, now) = ready_craft(&mut rng, &mut bus);

        assert_eq!(craft.take_damage(240, Vec3::ZERO, now, &mut bus), DamageOutcome::Hit);
        assert_eq!(craft.health(), 10);
        assert_eq!(craft.take_damage(25, Vec3::ZERO, now, &mut bus), DamageOutcome::Destroyed);
        assert_eq!(craft.health(), 0);
    }

    #[test]
    fn dying_lasts_its_duration_then_vanishes_for_good() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut bus = EventBus::default();
        let (mut craft, mut now) = ready_craft(&mut rng, &mut bus);

        while now < 10.0 {
            now += FRAME;
            craft.advance(now, &mut rng, &mut bus);
        }
        let depleted_at = now;
        assert_eq!(craft.take_damage(250, Vec3::ZERO, depleted_at, &mut bus), DamageOutcome::Destroyed);

        let mut destroyed_at = None;
        let mut statuses = Vec::new();
        while now < 20.0 {
            now += FRAME;
            craft.advance(now, &mut rng, &mut bus);
            statuses.push(craft.status());
            if craft.is_destroyed() && destroyed_at.is_none() {
                destroyed_at = Some(now);
            }
        }

        let destroyed_at = destroyed_at.unwrap();
        assert!((destroyed_at - (depleted_at + 2.5)).abs() <= FRAME + 1e-4);
        // destroyed is terminal
        let first = statuses.iter().position(|s| *s == CraftStatus::Destroyed).unwrap();
        assert!(statuses[first..].iter().all(|s| *s == CraftStatus::Destroyed));
        assert!(!craft.look().visible);

        let vanished = std::iter::from_fn(|| bus.next_event())
            .filter(|e| *e == SceneEvent::CraftVanished)
            .count();
        assert_eq!(vanished, 1);
    }

    #[test]
    fn pilot_hides_late_in_the_dying_sequence() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut bus = EventBus::default();
        let (mut craft, now) = ready_craft(&mut rng, &mut bus);
        craft.take_damage(250, Vec3::ZERO, now, &mut bus);

        craft.advance(now + 1.0, &mut rng, &mut bus);
        assert!(craft.look().pilot_visible);
        craft.advance(now + 2.4, &mut rng, &mut bus);
        assert!(!craft.look().pilot_visible);
    }

    #[test]
    fn hit_flicker_is_brief() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut bus = EventBus::default();
        let (mut craft, now) = ready_craft(&mut rng, &mut bus);

        craft.take_damage(20, Vec3::ZERO, now, &mut bus);
        craft.advance(now + 0.1, &mut rng, &mut bus);
        assert_eq!(craft.look().hull.color, HIT_HULL_GLOW);
        assert!(craft.look().hull.intensity >= 6.0);

        craft.advance(now + 0.5, &mut rng, &mut bus);
        assert_eq!(craft.look().hull.color, HULL_GLOW);
    }

    #[test]
    fn orbit_is_reproducible() {
        let config = HostileConfig::default();
        let a = HostileCraft::new(&config, 1.0, 0.0);
        let b = HostileCraft::new(&config, 1.0, 0.0);
        assert_eq!(a.orbit_position(7.5, 10.3), b.orbit_position(7.5, 10.3));

        let p = a.orbit_position(0.0, 0.0);
        assert!((Vec3::new(p.x, 0.0, p.z).length() - config.orbit_radius).abs() < 1e-4);
        assert!((p.y - config.y_offset).abs() < 1e-6);
    }

    #[test]
    fn operational_craft_follows_its_orbit() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut bus = EventBus::default();
        let (mut craft, ready) = ready_craft(&mut rng, &mut bus);
        let later = ready + 4.0;
        craft.advance(later, &mut rng, &mut bus);
        assert!((craft.position() - craft.orbit_position(later - ready, later)).length() < 1e-4);
    }
}
