//! Fixed scene parameters.
//!
//! Nothing here is user-facing. Every value is the constant the visual was
//! tuned with; the structs exist so the composer, camera, controls and bloom
//! read their numbers from one place and tests can build variants.

/// All tunables of the visual, grouped by the component that consumes them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrbConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub animation: AnimationConfig,
    pub geometry: GeometryConfig,
    pub wireframe: WireframeConfig,
    pub particles: ParticleConfig,
    pub bloom: BloomSettings,
}

/// Initial window title and logical size.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "icoglow".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Perspective camera setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Starting distance from the origin along +Z.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 3.0,
        }
    }
}

/// Orbit control behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlsConfig {
    /// Fraction of the pending motion applied per update.
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians of orbit per pixel of drag.
    pub rotate_speed: f32,
    /// Zoom scale applied per wheel line.
    pub zoom_step: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            min_distance: 2.0,
            max_distance: 6.0,
            rotate_speed: 0.005,
            zoom_step: 0.95,
        }
    }
}

/// Rotation rates of the main group, in radians per second of elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationConfig {
    pub rotation_rate_x: f32,
    pub rotation_rate_y: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            rotation_rate_x: 0.1,
            rotation_rate_y: 0.15,
        }
    }
}

/// Base geometry parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryConfig {
    pub radius: f32,
    /// Number of edge splits per icosahedron face.
    pub detail: u32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            detail: 4,
        }
    }
}

/// Flat-color line material of the wireframe overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireframeConfig {
    /// Linear RGB, `#80aaff`.
    pub color: [f32; 3],
    pub opacity: f32,
}

impl Default for WireframeConfig {
    fn default() -> Self {
        Self {
            color: [128.0 / 255.0, 170.0 / 255.0, 1.0],
            opacity: 0.1,
        }
    }
}

/// Sprite material of the particle cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleConfig {
    pub color: [f32; 3],
    /// World-space sprite size, attenuated with depth.
    pub size: f32,
    /// Edge length of the generated sprite texture.
    pub texture_size: u32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            size: 0.03,
            texture_size: 64,
        }
    }
}

/// Bloom pass parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    pub strength: f32,
    /// Blend between sharp (0.0) and wide (1.0) glow.
    pub radius: f32,
    /// Luminance below which pixels do not glow.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 1.2,
            radius: 0.5,
            threshold: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_visual() {
        let config = OrbConfig::default();
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.camera.distance, 3.0);
        assert_eq!(config.geometry.detail, 4);
        assert_eq!(config.bloom.strength, 1.2);
        assert_eq!(config.bloom.radius, 0.5);
        assert_eq!(config.bloom.threshold, 0.0);
        assert_eq!(config.wireframe.opacity, 0.1);
        assert_eq!(config.particles.texture_size, 64);
    }

    #[test]
    fn test_distance_limits_contain_start() {
        let config = OrbConfig::default();
        assert!(config.controls.min_distance <= config.camera.distance);
        assert!(config.camera.distance <= config.controls.max_distance);
    }
}
