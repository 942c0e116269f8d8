use std::f32::consts::{PI, TAU};

use bevy::math::{Quat, Vec3};

use crate::sim::random::RandomSource;

// smoothing rates are per frame at this rate
const REFERENCE_FPS: f32 = 60.0;

// circle around the vertical axis (hostile craft)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalParams {
    pub radius: f32,
    pub y_offset: f32,
    pub angular_speed: f32,
    pub initial_angle: f32,
}

impl OrbitalParams {
    pub fn position(&self, elapsed: f32) -> Vec3 {
        let angle = self.initial_angle + elapsed * self.angular_speed;
        Vec3::new(angle.cos() * self.radius, self.y_offset, angle.sin() * self.radius)
    }
}

// circle on a tilted plane through the origin (payloads)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneOrbit {
    pub radius: f32,
    // signed, rad/s
    pub angular_speed: f32,
    pub initial_angle: f32,
    // plane normal
    pub axis: Vec3,
}

impl PlaneOrbit {
    pub fn position(&self, elapsed: f32) -> Vec3 {
        let (u, v) = orbital_basis(self.axis);
        point_on_plane(u, v, self.radius, self.initial_angle + elapsed * self.angular_speed)
    }

    pub fn ring(&self, resolution: usize) -> Vec<Vec3> {
        let (u, v) = orbital_basis(self.axis);
        (0..resolution)
            .map(|i| point_on_plane(u, v, self.radius, TAU * i as f32 / resolution as f32))
            .collect()
    }
}

// https://mathworld.wolfram.com/SpherePointPicking.html
pub fn random_point_on_sphere(radius: f32, rng: &mut dyn RandomSource) -> Vec3 {
    let u = rng.next_f32();
    let v = rng.next_f32();
    let theta = TAU * u;
    let phi = (2.0 * v - 1.0).clamp(-1.0, 1.0).acos();

    Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos()) * radius
}

/// Two orthonormal vectors spanning the plane perpendicular to `axis`.
/// Falls back to other reference axes when `axis` is close to vertical.
pub fn orbital_basis(axis: Vec3) -> (Vec3, Vec3) {
    let normal = axis.normalize_or(Vec3::Y);

    let mut u = if normal.dot(Vec3::Y).abs() > 0.99 {
        Vec3::X.cross(normal).normalize_or_zero()
    } else {
        Vec3::Y.cross(normal).normalize_or_zero()
    };
    if u.length_squared() < 0.1 {
        u = Vec3::Z.cross(normal).normalize_or_zero();
    }

    let v = normal.cross(u).normalize_or_zero();
    (u, v)
}

pub fn point_on_plane(u: Vec3, v: Vec3, radius: f32, angle: f32) -> Vec3 {
    u * radius * angle.cos() + v * radius * angle.sin()
}

pub fn plane_angle(point: Vec3, axis: Vec3) -> f32 {
    let (u, v) = orbital_basis(axis);
    point.dot(v).atan2(point.dot(u))
}

pub fn rotate_about(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    Quat::from_axis_angle(axis.normalize_or(Vec3::Y), angle) * v
}

// local +Y (rocket nose) along direction
pub fn heading_rotation(direction: Vec3) -> Quat {
    match direction.try_normalize() {
        Some(dir) => Quat::from_rotation_arc(Vec3::Y, dir),
        None => Quat::IDENTITY,
    }
}

/// Frame-rate independent version of `current.lerp(desired, rate)` applied
/// once per 60 Hz frame.
pub fn follow(current: Vec3, desired: Vec3, rate_per_frame: f32, dt: f32) -> Vec3 {
    let t = 1.0 - (1.0 - rate_per_frame).powf(dt * REFERENCE_FPS);
    current.lerp(desired, t.clamp(0.0, 1.0))
}

pub fn smootherstep(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    x * x * x * (x * (x * 6.0 - 15.0) + 10.0)
}

pub fn ease_sine(p: f32) -> f32 {
    (p.clamp(0.0, 1.0) * PI * 0.5).sin()
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
