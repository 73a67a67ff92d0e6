//! Orbit camera controls with damping.
//!
//! Left-drag orbits the camera around its target and the wheel dollies it in
//! and out. Input only accumulates pending motion; [`OrbitControls::update`]
//! runs once per tick and applies a damped fraction of it, so the camera keeps
//! gliding briefly after the pointer stops.

use std::f32::consts::PI;

use glam::Vec3;

use crate::config::ControlsConfig;
use crate::gpu::camera::PerspectiveCamera;

/// Keeps the camera short of the poles, where the up vector degenerates.
const POLAR_EPSILON: f32 = 1.0e-3;

/// Pending motion below this is dropped.
const REST_EPSILON: f32 = 1.0e-6;

/// Orbit state owned by the controls, not the camera.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    config: ControlsConfig,
    /// Pending azimuth change (radians).
    delta_theta: f32,
    /// Pending polar change (radians).
    delta_phi: f32,
    /// Pending radius multiplier.
    scale: f32,
    dragging: bool,
    last_pointer: Option<(f64, f64)>,
}

impl OrbitControls {
    pub fn new(config: ControlsConfig) -> Self {
        Self {
            config,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            dragging: false,
            last_pointer: None,
        }
    }

    /// Primary button pressed or released.
    pub fn pointer_button(&mut self, pressed: bool) {
        self.dragging = pressed;
        if !pressed {
            self.last_pointer = None;
        }
    }

    /// Pointer moved to `(x, y)` in physical pixels.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if !self.dragging {
            return;
        }
        if let Some((last_x, last_y)) = self.last_pointer {
            let dx = (x - last_x) as f32;
            let dy = (y - last_y) as f32;
            self.delta_theta -= dx * self.config.rotate_speed;
            self.delta_phi -= dy * self.config.rotate_speed;
        }
        self.last_pointer = Some((x, y));
    }

    /// Wheel scrolled by `lines`; positive moves the camera closer.
    pub fn wheel(&mut self, lines: f32) {
        self.scale *= self.config.zoom_step.powf(lines);
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Apply damped pending motion to `camera`. Returns `true` if it moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - camera.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return false;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let damping = self.config.damping_factor;
        theta += self.delta_theta * damping;
        phi += self.delta_phi * damping;
        phi = phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        let new_radius = (radius * self.scale)
            .clamp(self.config.min_distance, self.config.max_distance);

        let new_offset = Vec3::new(
            new_radius * phi.sin() * theta.sin(),
            new_radius * phi.cos(),
            new_radius * phi.sin() * theta.cos(),
        );
        let new_position = camera.target + new_offset;
        let moved = new_position.distance(camera.position) > REST_EPSILON;
        camera.position = new_position;

        self.delta_theta *= 1.0 - damping;
        self.delta_phi *= 1.0 - damping;
        if self.delta_theta.abs() < REST_EPSILON {
            self.delta_theta = 0.0;
        }
        if self.delta_phi.abs() < REST_EPSILON {
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;

        moved
    }
}
