use bevy::prelude::*;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel};

pub struct OrbitCamPlugin;

impl Plugin for OrbitCamPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, update);
    }
}

// pixel scroll (trackpads) is much finer than line scroll
const LINE_ZOOM_STEP: f32 = 2.0;
const PIXEL_ZOOM_STEP: f32 = 0.05;

// camera component
#[derive(Component, Debug)]
pub struct OrbitCamera {
    pub radius: f32,
    pub speed: f32,
    pub angle: f32,
    pub v_angle: f32,
    pub is_dragging: bool,
    pub target: Vec3,

    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius: 36.0,
            speed: 0.5,
            angle: 0.0,
            v_angle: 0.3,
            is_dragging: false,
            target: Vec3::ZERO,

            min_radius: 6.0,
            max_radius: 90.0,
        }
    }
}

impl OrbitCamera {
    pub fn new(radius: f32, speed: f32) -> Self {
        Self {
            radius,
            speed,
            ..default()
        }
    }

    // start from an existing world position instead of raw angles
    pub fn looking_from(position: Vec3, speed: f32) -> Self {
        let radius = position.length().max(f32::EPSILON);
        Self {
            radius,
            speed,
            angle: position.z.atan2(position.x),
            v_angle: (position.y / radius).clamp(-1.0, 1.0).asin(),
            ..default()
        }
    }

    // set target point that for the camera to orbit
    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    // allow custom zoom limits
    pub fn with_zoom_limits(mut self, min_radius: f32, max_radius: f32) -> Self {
        self.min_radius = min_radius;
        self.max_radius = max_radius;
        self.radius = self.radius.clamp(min_radius, max_radius);
        self
    }

    pub fn zoom(&mut self, amount: f32) {
        self.radius = (self.radius - amount).clamp(self.min_radius, self.max_radius);
    }

    // calculate world position from spherical coordinates
    // https://en.wikipedia.org/wiki/Spherical_coordinate_system#Cartesian_coordinates
    pub fn calculate_position(&self) -> Vec3 {
        let x = self.radius * self.v_angle.cos() * self.angle.cos();
        let y = self.radius * self.v_angle.sin();
        let z = self.radius * self.v_angle.cos() * self.angle.sin();

        self.target + Vec3::new(x, y, z)
    }
}

fn update(
    mut camera_query: Query<(&mut Transform, &mut OrbitCamera)>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<CursorMoved>,
    mut scroll_events: EventReader<MouseWheel>,
) {
    // read once, shared by every orbit camera
    let drag: Vec2 = mouse_motion.read().filter_map(|motion| motion.delta).sum();
    let scroll: f32 = scroll_events
        .read()
        .map(|scroll| match scroll.unit {
            MouseScrollUnit::Line => scroll.y * LINE_ZOOM_STEP,
            MouseScrollUnit::Pixel => scroll.y * PIXEL_ZOOM_STEP,
        })
        .sum();

    for (mut transform, mut camera) in camera_query.iter_mut() {
        // handle mouse drag
        if mouse_buttons.just_pressed(MouseButton::Right) {
            camera.is_dragging = true;
        }
        if mouse_buttons.just_released(MouseButton::Right) {
            camera.is_dragging = false;
        }

        // update camera angles
        if camera.is_dragging {
            camera.angle += drag.x * camera.speed * 0.01;
            camera.v_angle += drag.y * camera.speed * 0.01;
            // clamp pitch
            camera.v_angle = camera.v_angle.clamp(-1.5, 1.5);
        }

        if scroll != 0.0 {
            camera.zoom(scroll);
        }

        // update camera position/orientation
        transform.translation = camera.calculate_position();
        transform.look_at(camera.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_from_round_trips() {
        let start = Vec3::new(20.0, 12.0, 28.0);
        let camera = OrbitCamera::looking_from(start, 0.5);
        assert!(camera.calculate_position().distance(start) < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = OrbitCamera::new(30.0, 0.5).with_zoom_limits(6.0, 90.0);
        camera.zoom(100.0);
        assert_eq!(camera.radius, 6.0);
        camera.zoom(-500.0);
        assert_eq!(camera.radius, 90.0);
    }
}
