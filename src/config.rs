//! config.rs
//!
//! Fixed model geometry as constants, everything tunable in `SceneConfig`.
//! The tunables can be overridden from `assets/scene.ron`.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

// body measurements (scene units)
pub const EARTH_RADIUS: f32 = 5.0;
// shell heights above the surface
pub const NIGHT_LIGHTS_OFFSET: f32 = 0.005;
pub const CLOUD_OFFSET: f32 = 0.08;
pub const INNER_GLOW_OFFSET: f32 = 0.25;
pub const OUTER_GLOW_OFFSET: f32 = 0.4;

// ufo model
pub const UFO_MAX_RADIUS: f32 = 3.0;
pub const UFO_TOTAL_THICKNESS: f32 = 0.8;
pub const UFO_UPPER_TAPER_RADIUS: f32 = 0.5;
pub const UFO_LOWER_TAPER_RADIUS: f32 = 0.7;
pub const UFO_DOME_BASE_RADIUS: f32 = 1.4;
pub const UFO_DOME_HEIGHT_FACTOR: f32 = 0.65;
pub const UFO_ENGINE_RADIUS: f32 = 0.8;
pub const UFO_ENGINE_HEIGHT: f32 = 0.3;
pub const UFO_FLAME_RADIUS: f32 = UFO_ENGINE_RADIUS * 0.9;
pub const UFO_FLAME_HEIGHT: f32 = 1.5;
pub const UFO_PILOT_SIZE: f32 = 0.35;
pub const UFO_RIM_LIGHT_COUNT: usize = 36;

// rocket model, stacked along local +Y starting at the nozzle exit
pub const NOZZLE_HEIGHT: f32 = 0.6;
pub const LOWER_STAGE_HEIGHT: f32 = 2.0;
pub const INTERSTAGE_HEIGHT: f32 = 0.15;
pub const UPPER_STAGE_HEIGHT: f32 = 1.5;
pub const FAIRING_HEIGHT: f32 = 0.85;
pub const ROCKET_MAIN_RADIUS: f32 = 0.3;
pub const ROCKET_TOTAL_LENGTH: f32 =
    NOZZLE_HEIGHT + LOWER_STAGE_HEIGHT + INTERSTAGE_HEIGHT + UPPER_STAGE_HEIGHT + FAIRING_HEIGHT;

// launch pads sit slightly above the surface
pub const LAUNCH_PAD_CLEARANCE: f32 = 0.02;

pub const SCENE_CONFIG_PATH: &str = "assets/scene.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scene config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scene config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid scene config: {0}")]
    Invalid(String),
}

/// Every tunable of the scene, supplied to the director at construction.
#[derive(Resource, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Fixed seed for the director's random source, entropy when absent.
    pub seed: Option<u64>,
    pub body: BodyConfig,
    pub hostile: HostileConfig,
    pub attack: AttackConfig,
    pub launcher: LauncherConfig,
    pub projectile: ProjectileConfig,
    pub explosion: ExplosionConfig,
    pub payloads: PayloadConfig,
    pub textures: TextureSource,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    pub radius: f32,
    pub surface_rate: f32,
    pub night_rate: f32,
    pub cloud_rate: f32,
    pub inner_glow_rate: f32,
    pub outer_glow_rate: f32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HostileConfig {
    pub max_health: u32,
    pub orbit_radius: f32,
    pub y_offset: f32,
    pub angular_speed: f32,
    pub entry_duration: f32,
    pub dying_duration: f32,
    pub hit_flicker: f32,
    pub bob_amplitude: f32,
    pub bob_frequency: f32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AttackConfig {
    pub pre_launch: f32,
    pub ascent: f32,
    pub approach: f32,
    pub firing: f32,
    pub mission_complete: f32,
    pub ascent_speed: f32,
    pub fire_interval: f32,
    pub missile_spread: f32,
    pub standoff: f32,
    pub retreat_speed: f32,
    pub follow_rate: f32,
    pub scale: f32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LauncherConfig {
    pub pre_launch: f32,
    pub ascent: f32,
    pub insertion: f32,
    pub deploying: f32,
    pub deorbit_burn: f32,
    pub returning: f32,
    pub mission_complete: f32,
    pub ascent_speed: f32,
    pub min_altitude: f32,
    pub altitude_spread: f32,
    pub inclination: f32,
    pub sweep: f32,
    pub coast_speed: f32,
    pub follow_rate: f32,
    pub scale: f32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProjectileConfig {
    pub speed: f32,
    pub damage_min: u32,
    pub damage_max: u32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExplosionConfig {
    pub base_duration: f32,
    pub large_extra_duration: f32,
    pub large_threshold: f32,
    pub hit_scale: f32,
    pub killing_blow_scale: f32,
    pub miss_scale: f32,
    pub terminal_scale: f32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PayloadConfig {
    pub max_payloads: usize,
    pub launch_delay_min: f32,
    pub launch_delay_max: f32,
    pub angular_speed_min: f32,
    pub angular_speed_max: f32,
    pub highlight_duration: f32,
}

/// Where the body textures come from.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub enum TextureSource {
    Files {
        day: String,
        normal: Option<String>,
        clouds: String,
        night: String,
    },
    Procedural {
        seed: u32,
    },
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: None,
            body: BodyConfig::default(),
            hostile: HostileConfig::default(),
            attack: AttackConfig::default(),
            launcher: LauncherConfig::default(),
            projectile: ProjectileConfig::default(),
            explosion: ExplosionConfig::default(),
            payloads: PayloadConfig::default(),
            textures: TextureSource::default(),
        }
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            radius: EARTH_RADIUS,
            surface_rate: 0.03,
            night_rate: 0.03,
            cloud_rate: 0.035,
            inner_glow_rate: 0.0,
            outer_glow_rate: 0.0,
        }
    }
}

impl Default for HostileConfig {
    fn default() -> Self {
        Self {
            max_health: 250,
            orbit_radius: EARTH_RADIUS + 5.5,
            y_offset: 1.2,
            angular_speed: 0.065,
            entry_duration: 2.8,
            dying_duration: 2.5,
            hit_flicker: 0.4,
            bob_amplitude: 0.5,
            bob_frequency: 0.6,
        }
    }
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            pre_launch: 2.0,
            ascent: 7.0,
            approach: 10.0,
            firing: 5.0,
            mission_complete: 5.0,
            ascent_speed: 2.0,
            fire_interval: 0.4,
            missile_spread: UFO_MAX_RADIUS * 0.5,
            standoff: 3.0,
            retreat_speed: 1.8,
            follow_rate: 0.1,
            scale: 0.35,
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            pre_launch: 1.5,
            ascent: 6.0,
            insertion: 8.0,
            deploying: 2.0,
            deorbit_burn: 2.0,
            returning: 10.0,
            mission_complete: 1.0,
            ascent_speed: 1.5,
            min_altitude: 2.0,
            altitude_spread: 1.5,
            inclination: std::f32::consts::PI * 0.15,
            sweep: std::f32::consts::PI * 0.45,
            coast_speed: 0.45,
            follow_rate: 0.15,
            scale: 0.3,
        }
    }
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 0.8 * 30.0,
            damage_min: 18,
            damage_max: 25,
        }
    }
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            base_duration: 1.2,
            large_extra_duration: 0.8,
            large_threshold: 3.0,
            hit_scale: 1.3,
            killing_blow_scale: 2.2,
            miss_scale: 0.8,
            terminal_scale: 7.0,
        }
    }
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            max_payloads: 5,
            launch_delay_min: 2.0,
            launch_delay_max: 3.5,
            angular_speed_min: 0.1,
            angular_speed_max: 0.15,
            highlight_duration: 1.5,
        }
    }
}

impl Default for TextureSource {
    fn default() -> Self {
        TextureSource::Procedural { seed: 7 }
    }
}

impl SceneConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("hostile.entry_duration", self.hostile.entry_duration),
            ("hostile.dying_duration", self.hostile.dying_duration),
            ("attack.pre_launch", self.attack.pre_launch),
            ("attack.ascent", self.attack.ascent),
            ("attack.approach", self.attack.approach),
            ("attack.firing", self.attack.firing),
            ("attack.mission_complete", self.attack.mission_complete),
            ("attack.fire_interval", self.attack.fire_interval),
            ("launcher.pre_launch", self.launcher.pre_launch),
            ("launcher.ascent", self.launcher.ascent),
            ("launcher.insertion", self.launcher.insertion),
            ("launcher.deploying", self.launcher.deploying),
            ("launcher.deorbit_burn", self.launcher.deorbit_burn),
            ("launcher.returning", self.launcher.returning),
            ("launcher.mission_complete", self.launcher.mission_complete),
            ("explosion.base_duration", self.explosion.base_duration),
            ("projectile.speed", self.projectile.speed),
            ("body.radius", self.body.radius),
        ];
        for (name, value) in durations {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        // NaN slips through every ordered comparison below
        let tunables = [
            ("body.surface_rate", self.body.surface_rate),
            ("body.night_rate", self.body.night_rate),
            ("body.cloud_rate", self.body.cloud_rate),
            ("body.inner_glow_rate", self.body.inner_glow_rate),
            ("body.outer_glow_rate", self.body.outer_glow_rate),
            ("hostile.orbit_radius", self.hostile.orbit_radius),
            ("hostile.y_offset", self.hostile.y_offset),
            ("hostile.angular_speed", self.hostile.angular_speed),
            ("hostile.hit_flicker", self.hostile.hit_flicker),
            ("hostile.bob_amplitude", self.hostile.bob_amplitude),
            ("hostile.bob_frequency", self.hostile.bob_frequency),
            ("attack.ascent_speed", self.attack.ascent_speed),
            ("attack.missile_spread", self.attack.missile_spread),
            ("attack.standoff", self.attack.standoff),
            ("attack.retreat_speed", self.attack.retreat_speed),
            ("attack.follow_rate", self.attack.follow_rate),
            ("attack.scale", self.attack.scale),
            ("launcher.ascent_speed", self.launcher.ascent_speed),
            ("launcher.min_altitude", self.launcher.min_altitude),
            ("launcher.altitude_spread", self.launcher.altitude_spread),
            ("launcher.inclination", self.launcher.inclination),
            ("launcher.sweep", self.launcher.sweep),
            ("launcher.coast_speed", self.launcher.coast_speed),
            ("launcher.follow_rate", self.launcher.follow_rate),
            ("launcher.scale", self.launcher.scale),
            ("explosion.large_extra_duration", self.explosion.large_extra_duration),
            ("explosion.large_threshold", self.explosion.large_threshold),
            ("explosion.hit_scale", self.explosion.hit_scale),
            ("explosion.killing_blow_scale", self.explosion.killing_blow_scale),
            ("explosion.miss_scale", self.explosion.miss_scale),
            ("explosion.terminal_scale", self.explosion.terminal_scale),
            ("payloads.launch_delay_min", self.payloads.launch_delay_min),
            ("payloads.launch_delay_max", self.payloads.launch_delay_max),
            ("payloads.angular_speed_min", self.payloads.angular_speed_min),
            ("payloads.angular_speed_max", self.payloads.angular_speed_max),
            ("payloads.highlight_duration", self.payloads.highlight_duration),
        ];
        for (name, value) in tunables {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
            }
        }

        if self.hostile.max_health == 0 {
            return Err(ConfigError::Invalid("hostile.max_health must be at least 1".into()));
        }
        if self.hostile.orbit_radius <= self.body.radius {
            return Err(ConfigError::Invalid("hostile.orbit_radius must clear the body".into()));
        }
        if self.projectile.damage_min == 0 || self.projectile.damage_min > self.projectile.damage_max {
            return Err(ConfigError::Invalid(format!(
                "damage range {}..={} is empty or zero",
                self.projectile.damage_min, self.projectile.damage_max
            )));
        }
        if self.payloads.max_payloads == 0 {
            return Err(ConfigError::Invalid("payloads.max_payloads must be at least 1".into()));
        }
        if self.payloads.launch_delay_min < 0.0
            || self.payloads.launch_delay_min > self.payloads.launch_delay_max
        {
            return Err(ConfigError::Invalid("payload launch delay range is empty".into()));
        }
        for (name, rate) in [("attack.follow_rate", self.attack.follow_rate), ("launcher.follow_rate", self.launcher.follow_rate)] {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(ConfigError::Invalid(format!("{name} must be in (0, 1], got {rate}")));
            }
        }

        Ok(())
    }

    /// Explosion lifetime for a given blast scale.
    pub fn explosion_duration(&self, scale: f32) -> f32 {
        let extra = if scale > self.explosion.large_threshold {
            self.explosion.large_extra_duration
        } else {
            0.0
        };
        self.explosion.base_duration + extra
    }
}

// reads the optional override file, falls back to defaults
pub fn load_scene_config(mut commands: Commands) {
    let config = if Path::new(SCENE_CONFIG_PATH).exists() {
        match SceneConfig::load(SCENE_CONFIG_PATH) {
            Ok(config) => {
                info!("Loaded scene config from {}", SCENE_CONFIG_PATH);
                config
            }
            Err(e) => {
                warn!("{e}, using defaults");
                SceneConfig::default()
            }
        }
    } else {
        info!("No {} found, using default scene config", SCENE_CONFIG_PATH);
        SceneConfig::default()
    };

    commands.insert_resource(config);
}
