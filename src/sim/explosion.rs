use std::f32::consts::PI;

use bevy::math::Vec3;

use crate::sim::events::{EntityId, EventBus, SceneEvent};
use crate::sim::orbital::{ease_sine, lerp, random_point_on_sphere};
use crate::sim::random::RandomSource;

const MAX_SPARKS: usize = 150;

#[derive(Debug, Clone, Copy)]
pub struct Spark {
    pub direction: Vec3,
    pub speed: f32,
    pub size: f32,
}

/// Per-frame look of the blast, in the blast's local frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExplosionLook {
    pub progress: f32,
    pub scale: f32,
    pub opacity: f32,
    pub emissive: f32,
    pub light_intensity: f32,
    pub light_range: f32,
}

#[derive(Debug, Clone)]
pub struct ExplosionEffect {
    pub id: EntityId,
    pub position: Vec3,
    pub scale: f32,
    pub started_at: f32,
    pub duration: f32,
    large: bool,
    sparks: Vec<Spark>,
    look: ExplosionLook,
    finished: bool,
}

impl ExplosionEffect {
    pub fn new(
        id: EntityId,
        position: Vec3,
        scale: f32,
        started_at: f32,
        duration: f32,
        large: bool,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let count = ((30.0 * scale * scale) as usize).min(MAX_SPARKS);
        let sparks = (0..count)
            .map(|_| Spark {
                direction: random_point_on_sphere(1.0, rng),
                speed: rng.range(0.3, 0.75),
                size: rng.range(0.5, 1.0),
            })
            .collect();

        let mut effect = Self {
            id,
            position,
            scale,
            started_at,
            duration,
            large,
            sparks,
            look: ExplosionLook::default(),
            finished: false,
        };
        effect.look = effect.look_at(0.0);
        effect
    }

    pub fn advance(&mut self, now: f32, bus: &mut EventBus) {
        if self.finished {
            return;
        }

        let progress = ((now - self.started_at) / self.duration).clamp(0.0, 1.0);
        self.look = self.look_at(progress);

        if progress >= 1.0 {
            self.finished = true;
            bus.emit(SceneEvent::ExplosionFinished { id: self.id });
        }
    }

    fn look_at(&self, progress: f32) -> ExplosionLook {
        let eased = if self.large {
            // slow start then a second swell
            let s = (progress * PI * 0.5).sin();
            s * s
        } else {
            ease_sine(progress)
        };
        let opacity = 1.0 - progress * progress;

        ExplosionLook {
            progress,
            scale: lerp(0.1, 2.5 * self.scale, eased),
            opacity,
            emissive: opacity * (2.0 + self.scale),
            light_intensity: 5.0 * self.scale * self.scale * opacity,
            light_range: 10.0 * self.scale,
        }
    }

    pub fn look(&self) -> ExplosionLook {
        self.look
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    /// Spark offset inside the blast's local (already scaled) frame.
    pub fn spark_offset(&self, spark: &Spark) -> Vec3 {
        spark.direction * (0.2 + spark.speed * ease_sine(self.look.progress))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
