//! CPU-side texture data and the procedural particle sprite.
//!
//! Textures are described by a [`TextureConfig`] (raw RGBA8 data plus sampling
//! modes) and uploaded by the GPU layer. The only texture the scene uses is the
//! soft radial sprite produced by [`particle_sprite`].

use image::{Rgba, RgbaImage};

/// Filter mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Smooth linear filtering (default). Good for gradients.
    #[default]
    Linear,
    /// Sharp nearest-neighbor filtering.
    Nearest,
}

impl From<FilterMode> for wgpu::FilterMode {
    fn from(mode: FilterMode) -> Self {
        match mode {
            FilterMode::Linear => wgpu::FilterMode::Linear,
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
        }
    }
}

/// Address mode for texture wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    /// Clamp to edge color (default).
    #[default]
    ClampToEdge,
    /// Repeat the texture.
    Repeat,
}

impl From<AddressMode> for wgpu::AddressMode {
    fn from(mode: AddressMode) -> Self {
        match mode {
            AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            AddressMode::Repeat => wgpu::AddressMode::Repeat,
        }
    }
}

/// Configuration for a single texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureConfig {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// Filter mode for magnification/minification.
    pub filter: FilterMode,
    /// Address mode for UV coordinates outside 0-1.
    pub address_mode: AddressMode,
}

impl TextureConfig {
    /// Create a texture configuration from an RGBA8 image.
    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            width,
            height,
            filter: FilterMode::Linear,
            address_mode: AddressMode::ClampToEdge,
        }
    }

    /// Set the filter mode.
    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    /// Set the address mode for UV wrapping.
    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode = mode;
        self
    }

    /// RGBA of the pixel at `(x, y)`, or `None` outside the texture.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[i..i + 4]);
        Some(px)
    }

    /// Alpha of the pixel at `(x, y)` in `[0, 1]`.
    pub fn alpha(&self, x: u32, y: u32) -> Option<f32> {
        self.pixel(x, y).map(|px| px[3] as f32 / 255.0)
    }

    /// Bytes per row of the pixel data.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

/// A color stop of the sprite's radial gradient: offset in `[0, 1]` and
/// straight (non-premultiplied) RGBA with alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub rgb: [u8; 3],
    pub alpha: f32,
}

const fn stop(offset: f32, rgb: [u8; 3], alpha: f32) -> ColorStop {
    ColorStop { offset, rgb, alpha }
}

/// White core, warm orange falloff, transparent rim.
pub const SPRITE_STOPS: [ColorStop; 4] = [
    stop(0.0, [255, 255, 255], 1.0),
    stop(0.2, [255, 200, 100], 1.0),
    stop(0.4, [255, 100, 0], 0.4),
    stop(1.0, [0, 0, 0], 0.0),
];

/// Sample a gradient at `t`. Offsets outside the stop range hold the nearest
/// end stop.
fn sample_gradient(stops: &[ColorStop], t: f32) -> [u8; 4] {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return [0; 4],
    };
    if t <= first.offset {
        return to_rgba8(first.rgb, first.alpha);
    }
    if t >= last.offset {
        return to_rgba8(last.rgb, last.alpha);
    }
    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if t <= b.offset {
            let span = (b.offset - a.offset).max(f32::EPSILON);
            let f = (t - a.offset) / span;
            let rgb = [
                lerp_u8(a.rgb[0], b.rgb[0], f),
                lerp_u8(a.rgb[1], b.rgb[1], f),
                lerp_u8(a.rgb[2], b.rgb[2], f),
            ];
            return to_rgba8(rgb, a.alpha + (b.alpha - a.alpha) * f);
        }
    }
    to_rgba8(last.rgb, last.alpha)
}

fn to_rgba8(rgb: [u8; 3], alpha: f32) -> [u8; 4] {
    [rgb[0], rgb[1], rgb[2], (alpha.clamp(0.0, 1.0) * 255.0).round() as u8]
}

/// Helper function for linear interpolation of u8 values.
fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round() as u8
}

/// Generate the square particle sprite with edge length `size`.
///
/// A radial gradient centered on the image with radius `size / 2`, sampled at
/// pixel centers. Pure; the composer calls it once and shares the result.
pub fn particle_sprite(size: u32) -> TextureConfig {
    let center = size as f32 / 2.0;
    let radius = center.max(f32::EPSILON);
    let image = RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        let t = (dx * dx + dy * dy).sqrt() / radius;
        Rgba(sample_gradient(&SPRITE_STOPS, t))
    });
    TextureConfig::from_image(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_dimensions() {
        let sprite = particle_sprite(64);
        assert_eq!(sprite.width, 64);
        assert_eq!(sprite.height, 64);
        assert_eq!(sprite.data.len(), 64 * 64 * 4);
        assert_eq!(sprite.bytes_per_row(), 256);
    }

    #[test]
    fn test_sprite_center_opaque_white() {
        let sprite = particle_sprite(64);
        let px = sprite.pixel(32, 32).unwrap();
        assert_eq!(px[3], 255);
        assert!(px[0] == 255 && px[1] > 240 && px[2] > 230);
    }

    #[test]
    fn test_sprite_corners_transparent() {
        let sprite = particle_sprite(64);
        for (x, y) in [(0, 0), (63, 0), (0, 63), (63, 63)] {
            assert!(sprite.alpha(x, y).unwrap() < 0.01);
        }
    }

    #[test]
    fn test_sprite_alpha_non_increasing_along_radius() {
        let sprite = particle_sprite(64);
        let rays: [(i32, i32); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (-1, -1),
            (1, -1),
            (-1, 1),
        ];
        for (dx, dy) in rays {
            let (mut x, mut y) = (32i32, 32i32);
            if dx < 0 {
                x = 31;
            }
            if dy < 0 {
                y = 31;
            }
            let mut prev = f32::MAX;
            while (0..64).contains(&x) && (0..64).contains(&y) {
                let a = sprite.alpha(x as u32, y as u32).unwrap();
                assert!(a <= prev, "alpha rose to {a} at ({x}, {y})");
                prev = a;
                x += dx;
                y += dy;
            }
        }
    }

    #[test]
    fn test_gradient_holds_end_stops() {
        assert_eq!(sample_gradient(&SPRITE_STOPS, -0.5), [255, 255, 255, 255]);
        assert_eq!(sample_gradient(&SPRITE_STOPS, 1.5), [0, 0, 0, 0]);
        assert_eq!(sample_gradient(&SPRITE_STOPS, 0.4), [255, 100, 0, 102]);
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let sprite = particle_sprite(8);
        assert!(sprite.pixel(8, 0).is_none());
        assert!(sprite.pixel(0, 8).is_none());
    }

    #[test]
    fn test_builder_modes() {
        let tex = particle_sprite(4)
            .with_filter(FilterMode::Nearest)
            .with_address_mode(AddressMode::Repeat);
        assert_eq!(tex.filter, FilterMode::Nearest);
        assert_eq!(tex.address_mode, AddressMode::Repeat);
    }
}
