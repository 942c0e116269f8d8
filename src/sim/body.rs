use bevy::math::Quat;

use crate::config::{
    BodyConfig, CLOUD_OFFSET, INNER_GLOW_OFFSET, NIGHT_LIGHTS_OFFSET, OUTER_GLOW_OFFSET,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellLayer {
    Surface,
    NightLights,
    Clouds,
    InnerGlow,
    OuterGlow,
}

impl ShellLayer {
    pub const ALL: [ShellLayer; 5] = [
        ShellLayer::Surface,
        ShellLayer::NightLights,
        ShellLayer::Clouds,
        ShellLayer::InnerGlow,
        ShellLayer::OuterGlow,
    ];

    pub fn radius(self, body_radius: f32) -> f32 {
        body_radius
            + match self {
                ShellLayer::Surface => 0.0,
                ShellLayer::NightLights => NIGHT_LIGHTS_OFFSET,
                ShellLayer::Clouds => CLOUD_OFFSET,
                ShellLayer::InnerGlow => INNER_GLOW_OFFSET,
                ShellLayer::OuterGlow => OUTER_GLOW_OFFSET,
            }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    pub radius: f32,
    rates: [f32; 5],
}

impl CelestialBody {
    pub fn new(config: &BodyConfig) -> Self {
        Self {
            radius: config.radius,
            rates: [
                config.surface_rate,
                config.night_rate,
                config.cloud_rate,
                config.inner_glow_rate,
                config.outer_glow_rate,
            ],
        }
    }

    pub fn rate(&self, layer: ShellLayer) -> f32 {
        self.rates[layer as usize]
    }

    // spin about the vertical axis
    pub fn shell_rotation(&self, layer: ShellLayer, now: f32) -> Quat {
        Quat::from_rotation_y(self.rate(layer) * now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shells_spin_independently() {
        let body = CelestialBody::new(&BodyConfig::default());
        let t = 10.0;
        let surface = body.shell_rotation(ShellLayer::Surface, t);
        let clouds = body.shell_rotation(ShellLayer::Clouds, t);
        assert!(surface.angle_between(clouds) > 0.04);
        assert_eq!(body.shell_rotation(ShellLayer::InnerGlow, t), Quat::IDENTITY);
    }

    #[test]
    fn shell_radii_grow_outward() {
        let radii: Vec<f32> = ShellLayer::ALL.iter().map(|l| l.radius(5.0)).collect();
        assert!(radii.windows(2).all(|w| w[0] < w[1]));
        assert!((ShellLayer::OuterGlow.radius(5.0) - 5.4).abs() < 1e-5);
    }
}
