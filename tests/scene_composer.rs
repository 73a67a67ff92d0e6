//! Integration tests for scene composition.
//!
//! These build the full object graph from the default parameters and check the
//! sharing and snapshot relationships between its parts.

use std::rc::Rc;

use glam::Vec3;
use icoglow::scene::{BlendMode, Material};
use icoglow::{OrbConfig, Scene};

// ============================================================================
// Geometry ownership
// ============================================================================

#[test]
fn test_core_and_wireframe_reference_one_geometry() {
    let scene = Scene::compose(&OrbConfig::default());
    let core = scene.group.core.geometry();
    let wire = scene.group.wireframe.geometry();

    assert!(Rc::ptr_eq(core, wire));
    // Core and wireframe handles only; no hidden copies.
    assert_eq!(Rc::strong_count(core), 2);
}

#[test]
fn test_particles_are_a_distinct_copy() {
    let scene = Scene::compose(&OrbConfig::default());
    let geometry = scene.geometry();
    let particles = scene.group.particles.positions();

    assert_eq!(particles.len(), geometry.vertices().len());
    assert!(particles
        .iter()
        .zip(geometry.vertices())
        .all(|(p, v)| *p == v.position));

    // Different allocations.
    let particle_ptr = particles.as_ptr() as *const u8;
    let vertex_ptr = geometry.vertices().as_ptr() as *const u8;
    assert_ne!(particle_ptr, vertex_ptr);
}

#[test]
fn test_particle_copy_survives_scene_changes() {
    let mut scene = Scene::compose(&OrbConfig::default());
    let before: Vec<[f32; 3]> = scene.group.particles.positions().to_vec();

    scene.group.rotation = Vec3::new(1.0, 2.0, 0.0);
    scene.group.core.material.set_time(42.0);

    assert_eq!(scene.group.particles.positions(), &before[..]);
}

// ============================================================================
// Materials
// ============================================================================

#[test]
fn test_core_is_additive_without_depth_write() {
    let scene = Scene::compose(&OrbConfig::default());
    let state = scene.group.core.material.render_state();
    assert_eq!(state.blend, BlendMode::Additive);
    assert!(!state.depth_write);
    assert!(state.cull_back_faces);
}

#[test]
fn test_particles_are_additive_without_depth_write() {
    let scene = Scene::compose(&OrbConfig::default());
    let state = scene.group.particles.material.render_state();
    assert_eq!(state.blend, BlendMode::Additive);
    assert!(!state.depth_write);
}

#[test]
fn test_wireframe_is_faint_alpha_blended() {
    let scene = Scene::compose(&OrbConfig::default());
    let material = &scene.group.wireframe.material;
    assert_eq!(material.render_state().blend, BlendMode::Alpha);
    assert_eq!(material.opacity, 0.1);
    assert_eq!(material.color, [128.0 / 255.0, 170.0 / 255.0, 1.0]);
}

#[test]
fn test_sprite_has_single_owner() {
    let scene = Scene::compose(&OrbConfig::default());
    let sprite = &scene.group.particles.material.sprite;
    assert_eq!((sprite.width, sprite.height), (64, 64));
    assert_eq!(Rc::strong_count(sprite), 1);
}

#[test]
fn test_ambient_light_is_dim_white() {
    let scene = Scene::compose(&OrbConfig::default());
    assert_eq!(scene.ambient.color, [1.0, 1.0, 1.0]);
    assert_eq!(scene.ambient.intensity, 0.1);
}

// ============================================================================
// Variants
// ============================================================================

#[test]
fn test_detail_controls_vertex_count() {
    let mut config = OrbConfig::default();
    config.geometry.detail = 1;
    let scene = Scene::compose(&config);
    assert_eq!(scene.geometry().vertex_count(), 20 * 4 * 3);
    assert_eq!(scene.group.particles.len(), 240);
}
