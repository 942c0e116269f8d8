use bevy::math::{Quat, Vec3};

use crate::sim::events::EntityId;
use crate::sim::orbital::{PlaneOrbit, heading_rotation};

#[derive(Debug, Clone)]
pub struct Payload {
    pub id: EntityId,
    pub orbit: PlaneOrbit,
    pub deployed_at: f32,
    highlight_until: Option<f32>,
}

impl Payload {
    pub fn new(id: EntityId, orbit: PlaneOrbit, deployed_at: f32) -> Self {
        Self {
            id,
            orbit,
            deployed_at,
            highlight_until: None,
        }
    }

    pub fn position(&self, now: f32) -> Vec3 {
        self.orbit.position(now - self.deployed_at)
    }

    // antenna (local +Y) faces the body
    pub fn rotation(&self, now: f32) -> Quat {
        heading_rotation(-self.position(now))
    }

    pub fn highlight(&mut self, now: f32, duration: f32) {
        self.highlight_until = Some(now + duration);
    }

    pub fn is_highlighted(&self, now: f32) -> bool {
        self.highlight_until.is_some_and(|until| now < until)
    }
}
