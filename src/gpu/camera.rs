//! Perspective camera.

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Perspective camera looking at a target point.
///
/// Changing the aspect ratio only marks the projection dirty; the matrix is
/// rebuilt on the next [`update_projection_matrix`](Self::update_projection_matrix)
/// or [`projection_matrix`](Self::projection_matrix) call.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Camera world position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    aspect: f32,
    projection: Mat4,
    projection_dirty: bool,
}

impl PerspectiveCamera {
    /// Create a camera on +Z at the configured distance, looking at the origin.
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            fov_y: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            position: Vec3::new(0.0, 0.0, config.distance),
            target: Vec3::ZERO,
            aspect,
            projection: Mat4::IDENTITY,
            projection_dirty: true,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Set width / height of the render target.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.projection_dirty = true;
    }

    pub fn is_projection_dirty(&self) -> bool {
        self.projection_dirty
    }

    /// Rebuild the projection matrix from the current parameters.
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        self.projection_dirty = false;
    }

    /// Current projection, rebuilt first if dirty.
    pub fn projection_matrix(&mut self) -> Mat4 {
        if self.projection_dirty {
            self.update_projection_matrix();
        }
        self.projection
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Distance from the camera to its target.
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_placement() {
        let camera = PerspectiveCamera::new(&CameraConfig::default(), 16.0 / 9.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 3.0));
        assert!((camera.distance() - 3.0).abs() < 1e-6);
        assert!(!camera.is_projection_dirty());
    }

    #[test]
    fn test_set_aspect_marks_dirty_until_rebuilt() {
        let mut camera = PerspectiveCamera::new(&CameraConfig::default(), 1.0);
        let before = camera.projection_matrix();
        camera.set_aspect(2.0);
        assert!(camera.is_projection_dirty());

        let after = camera.projection_matrix();
        assert!(!camera.is_projection_dirty());
        assert_ne!(before, after);
        // x scale shrinks by the aspect, y scale is fixed by the fov
        assert!((after.x_axis.x * 2.0 - after.y_axis.y).abs() < 1e-5);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let mut camera = PerspectiveCamera::new(&CameraConfig::default(), 1.5);
        let clip = camera.projection_matrix() * camera.view_matrix() * glam::Vec4::W;
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!((0.0..1.0).contains(&ndc.z));
    }
}
