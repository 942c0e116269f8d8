use bevy::log::{debug, info};
use bevy::math::{Quat, Vec3};

use crate::config::{LAUNCH_PAD_CLEARANCE, LauncherConfig, PayloadConfig, ROCKET_TOTAL_LENGTH};
use crate::sim::attack::ExhaustLook;
use crate::sim::events::{EntityId, EventBus, SceneEvent};
use crate::sim::orbital::{PlaneOrbit, follow, heading_rotation, plane_angle, random_point_on_sphere, rotate_about};
use crate::sim::random::RandomSource;

// return target sits just under the surface
const RETURN_DEPTH: f32 = 0.98;
const HIDE_ALTITUDE: f32 = 0.1;
const LOOK_AHEAD: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LauncherPhase {
    PreLaunch,
    VerticalAscent,
    OrbitalInsertion,
    Deploying,
    DeorbitBurn,
    Returning,
    MissionComplete,
    Disappeared,
}

#[derive(Debug, Clone)]
pub struct PayloadVehicle {
    pub id: EntityId,
    config: LauncherConfig,
    payload_speed: (f32, f32),
    body_radius: f32,
    phase: LauncherPhase,
    phase_started_at: f32,
    launch_position: Vec3,
    up: Vec3,
    target_orbit_radius: f32,
    plane_normal: Vec3,
    azimuth: Vec3,
    position: Vec3,
    heading: Vec3,
    deployed: Option<PlaneOrbit>,
    deorbit_start: Option<Vec3>,
    return_target: Option<Vec3>,
    visible: bool,
    exhaust: ExhaustLook,
}

impl PayloadVehicle {
    pub fn new(
        id: EntityId,
        config: &LauncherConfig,
        payloads: &PayloadConfig,
        body_radius: f32,
        now: f32,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let launch_position = random_point_on_sphere(body_radius, rng);
        let up = launch_position.normalize_or(Vec3::Y);
        let target_orbit_radius = body_radius + config.min_altitude + rng.next_f32() * config.altitude_spread;

        // tilt the launch vertical by the inclination to get the plane normal
        let tilt_axis = Vec3::X.cross(up).normalize_or(Vec3::Z);
        let plane_normal = rotate_about(up, tilt_axis, config.inclination);
        let azimuth = up.cross(Vec3::Y).normalize_or(Vec3::X);

        info!(
            "Payload vehicle {} on the pad, target orbit radius {:.2}",
            id, target_orbit_radius
        );

        Self {
            id,
            config: config.clone(),
            payload_speed: (payloads.angular_speed_min, payloads.angular_speed_max),
            body_radius,
            phase: LauncherPhase::PreLaunch,
            phase_started_at: now,
            launch_position,
            up,
            target_orbit_radius,
            plane_normal,
            azimuth,
            position: launch_position + up * LAUNCH_PAD_CLEARANCE,
            heading: up,
            deployed: None,
            deorbit_start: None,
            return_target: None,
            visible: true,
            exhaust: ExhaustLook::OFF,
        }
    }

    pub fn advance(&mut self, now: f32, dt: f32, rng: &mut dyn RandomSource, bus: &mut EventBus) {
        let elapsed = now - self.phase_started_at;
        let next = match self.phase {
            LauncherPhase::PreLaunch => {
                self.exhaust = ExhaustLook::OFF;
                (elapsed >= self.config.pre_launch).then_some(LauncherPhase::VerticalAscent)
            }
            LauncherPhase::VerticalAscent => self.tick_ascent(elapsed, rng),
            LauncherPhase::OrbitalInsertion => self.tick_insertion(elapsed, dt, rng),
            LauncherPhase::Deploying => {
                self.coast(dt);
                self.exhaust = ExhaustLook::OFF;
                (elapsed >= self.config.deploying).then_some(LauncherPhase::DeorbitBurn)
            }
            LauncherPhase::DeorbitBurn => {
                self.coast(dt);
                self.exhaust = ExhaustLook::burning(1.5, rng);
                (elapsed >= self.config.deorbit_burn).then_some(LauncherPhase::Returning)
            }
            LauncherPhase::Returning => self.tick_returning(elapsed, dt, rng),
            LauncherPhase::MissionComplete => {
                self.visible = false;
                (elapsed >= self.config.mission_complete).then_some(LauncherPhase::Disappeared)
            }
            LauncherPhase::Disappeared => None,
        };

        if let Some(phase) = next {
            self.enter(phase, now, rng, bus);
        }
    }

    fn enter(&mut self, phase: LauncherPhase, now: f32, rng: &mut dyn RandomSource, bus: &mut EventBus) {
        debug!("Payload vehicle {} {:?} -> {:?}", self.id, self.phase, phase);
        self.phase = phase;
        self.phase_started_at = now;

        match phase {
            LauncherPhase::Deploying => {
                let orbit = self.release_orbit(rng);
                info!(
                    "Payload vehicle {} released payload, r={:.2} w={:.3}",
                    self.id, orbit.radius, orbit.angular_speed
                );
                self.deployed = Some(orbit);
                bus.emit(SceneEvent::PayloadDeployed { orbit });
            }
            LauncherPhase::DeorbitBurn => {
                self.deorbit_start = Some(self.position);
                self.return_target = Some(random_point_on_sphere(self.body_radius * RETURN_DEPTH, rng));
                self.heading = -self.heading;
            }
            LauncherPhase::MissionComplete => {
                self.visible = false;
                self.exhaust = ExhaustLook::OFF;
            }
            LauncherPhase::Disappeared => {
                info!("Payload vehicle {} back on the surface", self.id);
                bus.emit(SceneEvent::LauncherMissionComplete { id: self.id });
            }
            _ => {}
        }
    }

    fn tick_ascent(&mut self, elapsed: f32, rng: &mut dyn RandomSource) -> Option<LauncherPhase> {
        self.position = self.pad() + self.up * self.config.ascent_speed * elapsed;
        self.heading = self.up;
        self.exhaust = ExhaustLook::burning(3.0, rng);
        (elapsed >= self.config.ascent).then_some(LauncherPhase::OrbitalInsertion)
    }

    fn tick_insertion(&mut self, elapsed: f32, dt: f32, rng: &mut dyn RandomSource) -> Option<LauncherPhase> {
        let progress = (elapsed / self.config.insertion).clamp(0.0, 1.0);
        let desired = self.insertion_point(progress);
        self.position = follow(self.position, desired, self.config.follow_rate, dt);

        let ahead = self.insertion_point(progress + LOOK_AHEAD);
        self.heading = (ahead - self.position).normalize_or(self.heading);
        self.exhaust = ExhaustLook::burning(2.5, rng);
        (elapsed >= self.config.insertion).then_some(LauncherPhase::Deploying)
    }

    fn tick_returning(&mut self, elapsed: f32, dt: f32, rng: &mut dyn RandomSource) -> Option<LauncherPhase> {
        let progress = (elapsed / self.config.returning).clamp(0.0, 1.0);
        if let (Some(start), Some(target)) = (self.deorbit_start, self.return_target) {
            let desired = start.lerp(target, progress * progress);
            self.position = follow(self.position, desired, self.config.follow_rate, dt);
            self.heading = (target - self.position).normalize_or(self.heading);
        }
        self.exhaust = ExhaustLook::burning(2.0, rng);

        if self.position.length() < self.body_radius + HIDE_ALTITUDE {
            self.visible = false;
            self.exhaust = ExhaustLook::OFF;
        }
        (elapsed >= self.config.returning).then_some(LauncherPhase::MissionComplete)
    }

    fn coast(&mut self, dt: f32) {
        self.position += self.heading * self.config.coast_speed * dt;
    }

    // insertion arc, bends into the target orbit as progress goes to 1
    fn insertion_point(&self, progress: f32) -> Vec3 {
        let on_orbit = rotate_about(self.azimuth, self.plane_normal, progress * self.config.sweep)
            * self.target_orbit_radius;
        self.ascent_end().lerp(on_orbit, progress * progress)
    }

    /// Orbit for a payload released from the nose with the current heading.
    fn release_orbit(&self, rng: &mut dyn RandomSource) -> PlaneOrbit {
        let release = self.position + self.heading * ROCKET_TOTAL_LENGTH * self.config.scale * 0.98;
        let radial = release.normalize_or(Vec3::Y);

        // keep only the tangential part of the heading
        let tangent = self.heading - radial * self.heading.dot(radial);
        let velocity = tangent
            .try_normalize()
            .unwrap_or_else(|| radial.any_orthonormal_vector());

        let axis = release.cross(velocity).try_normalize().unwrap_or(Vec3::Y);
        let (lo, hi) = self.payload_speed;
        let speed = rng.range(lo, hi);

        PlaneOrbit {
            radius: release.length(),
            // either direction around the plane
            angular_speed: speed * rng.sign(),
            initial_angle: plane_angle(release, axis),
            axis,
        }
    }

    fn pad(&self) -> Vec3 {
        self.launch_position + self.up * LAUNCH_PAD_CLEARANCE
    }

    fn ascent_end(&self) -> Vec3 {
        self.pad() + self.up * self.config.ascent * self.config.ascent_speed
    }

    pub fn phase(&self) -> LauncherPhase {
        self.phase
    }

    pub fn is_disappeared(&self) -> bool {
        self.phase == LauncherPhase::Disappeared
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn deployed_orbit(&self) -> Option<PlaneOrbit> {
        self.deployed
    }

    pub fn position(&self) -> Vec3 {
        self.position
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

    pub fn target_orbit_radius(&self) -> f32 {
        self.target_orbit_radius
    }
}
