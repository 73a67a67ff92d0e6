//! Every generated WGSL module must parse and validate with naga before wgpu
//! ever sees it.

use icoglow::config::BloomSettings;
use icoglow::gpu::post_process::{blur_wgsl, composite_wgsl, high_pass_wgsl, KERNEL_RADII};
use icoglow::gpu::scene_pass::{particle_wgsl, wireframe_wgsl};
use icoglow::shading::surface_wgsl;
use icoglow::{OrbConfig, Scene};
use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

/// Parse and validate WGSL source, returning a readable error.
fn validate_wgsl(source: &str, name: &str) -> Result<naga::Module, String> {
    let module = wgsl::parse_str(source)
        .map_err(|err| format!("{name}: {}", err.emit_to_string(source)))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator
        .validate(&module)
        .map_err(|err| format!("{name}: {err:?}"))?;

    Ok(module)
}

fn assert_valid(source: &str, name: &str) -> naga::Module {
    match validate_wgsl(source, name) {
        Ok(module) => module,
        Err(message) => panic!("{message}\n--- source ---\n{source}"),
    }
}

fn entry_points(module: &naga::Module) -> Vec<&str> {
    module.entry_points.iter().map(|ep| ep.name.as_str()).collect()
}

#[test]
fn test_surface_shader_is_valid() {
    let module = assert_valid(&surface_wgsl(), "surface");
    let names = entry_points(&module);
    assert!(names.contains(&"vs_main"));
    assert!(names.contains(&"fs_main"));
}

#[test]
fn test_wireframe_shader_is_valid() {
    let scene = Scene::compose(&OrbConfig::default());
    assert_valid(&wireframe_wgsl(&scene.group.wireframe.material), "wireframe");
}

#[test]
fn test_particle_shader_is_valid() {
    let scene = Scene::compose(&OrbConfig::default());
    assert_valid(&particle_wgsl(&scene.group.particles.material), "particles");
}

#[test]
fn test_high_pass_shader_is_valid() {
    assert_valid(&high_pass_wgsl(0.0), "high pass");
    assert_valid(&high_pass_wgsl(0.75), "high pass");
}

#[test]
fn test_every_blur_level_is_valid() {
    for radius in KERNEL_RADII {
        assert_valid(&blur_wgsl(radius), &format!("blur r={radius}"));
    }
}

#[test]
fn test_composite_shader_is_valid() {
    assert_valid(&composite_wgsl(&BloomSettings::default()), "composite");
    let wide = BloomSettings {
        strength: 2.0,
        radius: 1.0,
        threshold: 0.3,
    };
    assert_valid(&composite_wgsl(&wide), "composite");
}

#[test]
fn test_invalid_source_is_reported() {
    let err = validate_wgsl("fn broken( {", "broken").unwrap_err();
    assert!(err.starts_with("broken:"));
}
