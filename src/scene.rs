//! Scene composition.
//!
//! [`Scene::compose`] builds the whole object graph once: a main group holding
//! the noise-shaded core mesh, a wireframe overlay over the same geometry, and
//! a particle cloud seeded from the geometry's vertex positions, plus a dim
//! ambient light. Nothing is added or removed afterwards; per frame only the
//! group rotation and the surface material's `time` change.
//!
//! The base [`Geometry`] is owned behind an [`Rc`] and shared by the core and
//! wireframe meshes. The particle cloud takes its own copy of the positions.

use std::rc::Rc;

use glam::{EulerRot, Mat4, Vec3};

use crate::config::{OrbConfig, ParticleConfig, WireframeConfig};
use crate::geometry::Geometry;
use crate::textures::{particle_sprite, TextureConfig};

/// How a material's fragments combine with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending (default).
    #[default]
    Alpha,

    /// Additive blending. Overlaps get brighter, which reads as glow.
    Additive,
}

impl BlendMode {
    /// The wgpu blend state for this mode.
    pub fn blend_state(self) -> wgpu::BlendState {
        match self {
            BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
            BlendMode::Additive => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            },
        }
    }
}

/// Fixed-function state a material needs from its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    pub blend: BlendMode,
    pub depth_write: bool,
    /// Depth testing is always on; this only controls culling.
    pub cull_back_faces: bool,
}

/// Common interface of the scene's materials.
pub trait Material {
    fn render_state(&self) -> RenderState;
}

/// Noise-shaded glowing material of the core mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMaterial {
    time: f32,
}

impl SurfaceMaterial {
    pub fn new() -> Self {
        Self { time: 0.0 }
    }

    /// Current value of the `time` uniform, in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self::new()
    }
}

impl Material for SurfaceMaterial {
    fn render_state(&self) -> RenderState {
        RenderState {
            blend: BlendMode::Additive,
            depth_write: false,
            cull_back_faces: true,
        }
    }
}

/// Translucent flat-color line material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireframeMaterial {
    pub color: [f32; 3],
    pub opacity: f32,
}

impl From<WireframeConfig> for WireframeMaterial {
    fn from(config: WireframeConfig) -> Self {
        Self {
            color: config.color,
            opacity: config.opacity,
        }
    }
}

impl Material for WireframeMaterial {
    fn render_state(&self) -> RenderState {
        RenderState {
            blend: BlendMode::Alpha,
            depth_write: true,
            cull_back_faces: false,
        }
    }
}

/// Sprite material of the particle cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsMaterial {
    pub color: [f32; 3],
    /// World-space size; shrinks with distance from the camera.
    pub size: f32,
    pub sprite: Rc<TextureConfig>,
}

impl Material for PointsMaterial {
    fn render_state(&self) -> RenderState {
        RenderState {
            blend: BlendMode::Additive,
            depth_write: false,
            cull_back_faces: false,
        }
    }
}

/// Geometry drawn with a material. Meshes never own their geometry outright.
#[derive(Debug, Clone)]
pub struct Mesh<M> {
    geometry: Rc<Geometry>,
    pub material: M,
}

impl<M: Material> Mesh<M> {
    pub fn new(geometry: Rc<Geometry>, material: M) -> Self {
        Self { geometry, material }
    }

    pub fn geometry(&self) -> &Rc<Geometry> {
        &self.geometry
    }
}

/// Independent buffer of point positions drawn as sprites.
#[derive(Debug, Clone)]
pub struct PointCloud {
    positions: Vec<[f32; 3]>,
    pub material: PointsMaterial,
}

impl PointCloud {
    /// Snapshot the vertex positions of `geometry`.
    pub fn from_geometry(geometry: &Geometry, material: PointsMaterial) -> Self {
        Self {
            positions: geometry.positions(),
            material,
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// The three children that rotate together.
#[derive(Debug, Clone)]
pub struct ObjectGroup {
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,
    pub core: Mesh<SurfaceMaterial>,
    pub wireframe: Mesh<WireframeMaterial>,
    pub particles: PointCloud,
}

impl ObjectGroup {
    /// Local-to-world transform of every child.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }
}

/// Constant, shadowless fill light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 0.1,
        }
    }
}

/// Root of the object graph.
#[derive(Debug, Clone)]
pub struct Scene {
    pub group: ObjectGroup,
    pub ambient: AmbientLight,
}

impl Scene {
    /// Build the full scene from fixed parameters.
    pub fn compose(config: &OrbConfig) -> Self {
        let geometry = Rc::new(Geometry::icosahedron(
            config.geometry.radius,
            config.geometry.detail,
        ));

        let core = Mesh::new(Rc::clone(&geometry), SurfaceMaterial::new());
        let wireframe = Mesh::new(Rc::clone(&geometry), WireframeMaterial::from(config.wireframe));
        let particles = PointCloud::from_geometry(&geometry, points_material(&config.particles));

        log::debug!(
            "Composed scene: {} vertices, {} particles",
            geometry.vertex_count(),
            particles.len()
        );

        Self {
            group: ObjectGroup {
                rotation: Vec3::ZERO,
                core,
                wireframe,
                particles,
            },
            ambient: AmbientLight::default(),
        }
    }

    /// Geometry shared by the core and wireframe meshes.
    pub fn geometry(&self) -> &Rc<Geometry> {
        self.group.core.geometry()
    }
}

fn points_material(config: &ParticleConfig) -> PointsMaterial {
    PointsMaterial {
        color: config.color,
        size: config.size,
        sprite: Rc::new(particle_sprite(config.texture_size)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_and_wireframe_share_geometry() {
        let scene = Scene::compose(&OrbConfig::default());
        assert!(Rc::ptr_eq(
            scene.group.core.geometry(),
            scene.group.wireframe.geometry()
        ));
    }

    #[test]
    fn test_particles_snapshot_positions() {
        let scene = Scene::compose(&OrbConfig::default());
        let geometry = scene.geometry();
        let particles = scene.group.particles.positions();
        assert_eq!(particles.len(), geometry.vertices().len());
        for (p, v) in particles.iter().zip(geometry.vertices()) {
            assert_eq!(*p, v.position);
        }
    }

    #[test]
    fn test_material_states() {
        let scene = Scene::compose(&OrbConfig::default());
        let core = scene.group.core.material.render_state();
        assert_eq!(core.blend, BlendMode::Additive);
        assert!(!core.depth_write);

        let wire = scene.group.wireframe.material.render_state();
        assert_eq!(wire.blend, BlendMode::Alpha);
        assert_eq!(scene.group.wireframe.material.opacity, 0.1);

        let points = scene.group.particles.material.render_state();
        assert_eq!(points.blend, BlendMode::Additive);
        assert!(!points.depth_write);
        assert_eq!(scene.group.particles.material.size, 0.03);
    }

    #[test]
    fn test_initial_state() {
        let scene = Scene::compose(&OrbConfig::default());
        assert_eq!(scene.group.rotation, Vec3::ZERO);
        assert_eq!(scene.group.core.material.time(), 0.0);
        assert_eq!(scene.ambient.intensity, 0.1);
        assert_eq!(scene.group.model_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_additive_blend_adds() {
        let state = BlendMode::Additive.blend_state();
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::SrcAlpha);
    }
}
