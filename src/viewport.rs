//! Render target dimensions and the resize operation.

use winit::dpi::{LogicalSize, PhysicalSize};

use crate::gpu::camera::PerspectiveCamera;

/// Size of the offscreen drawing buffer in pixels.
///
/// `pixel_ratio` is the device scale factor read once at setup and never
/// refreshed. Every later window size is mapped through it by
/// [`Viewport::drawing_buffer_size`], so a DPI change keeps the old scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    pixel_ratio: f64,
}

impl Viewport {
    /// Zero dimensions are clamped to 1 so the aspect ratio stays finite.
    pub fn new(width: u32, height: u32, pixel_ratio: f64) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            pixel_ratio,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Drawing-buffer size for a window reported as `physical` pixels at
    /// `scale_factor`: its logical size times the captured pixel ratio.
    pub fn drawing_buffer_size(
        &self,
        physical: PhysicalSize<u32>,
        scale_factor: f64,
    ) -> (u32, u32) {
        let logical: LogicalSize<f64> = physical.to_logical(scale_factor);
        let buffer: PhysicalSize<u32> = logical.to_physical(self.pixel_ratio);
        (buffer.width, buffer.height)
    }
}

/// What a resize event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// New dimensions were applied; render targets must follow.
    Resized { width: u32, height: u32 },
    /// Same dimensions as before; nothing changed.
    Unchanged,
    /// A zero dimension (minimised window); the previous size is kept.
    Ignored,
}

/// Apply a viewport change to the dimensions and the camera.
///
/// Updates the camera aspect and marks its projection dirty. Repeating the
/// same size is a no-op, so handling an event twice leaves identical state.
pub fn resize(
    viewport: &mut Viewport,
    camera: &mut PerspectiveCamera,
    width: u32,
    height: u32,
) -> ResizeOutcome {
    if width == 0 || height == 0 {
        log::debug!("Ignoring zero-sized resize to {width}x{height}");
        return ResizeOutcome::Ignored;
    }
    if (width, height) == viewport.size() {
        return ResizeOutcome::Unchanged;
    }

    viewport.width = width;
    viewport.height = height;
    camera.set_aspect(viewport.aspect());
    log::debug!("Viewport resized to {width}x{height}");
    ResizeOutcome::Resized { width, height }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    fn setup() -> (Viewport, PerspectiveCamera) {
        let viewport = Viewport::new(1280, 720, 2.0);
        let camera = PerspectiveCamera::new(&CameraConfig::default(), viewport.aspect());
        (viewport, camera)
    }

    #[test]
    fn test_resize_updates_aspect() {
        let (mut viewport, mut camera) = setup();
        let outcome = resize(&mut viewport, &mut camera, 1920, 1080);
        assert_eq!(
            outcome,
            ResizeOutcome::Resized {
                width: 1920,
                height: 1080
            }
        );
        assert_eq!(camera.aspect(), 1920.0 / 1080.0);
        assert!(camera.is_projection_dirty());
    }

    #[test]
    fn test_zero_size_ignored() {
        let (mut viewport, mut camera) = setup();
        assert_eq!(resize(&mut viewport, &mut camera, 0, 600), ResizeOutcome::Ignored);
        assert_eq!(viewport.size(), (1280, 720));
        assert!(!camera.is_projection_dirty());
    }

    #[test]
    fn test_pixel_ratio_survives_resize() {
        let (mut viewport, mut camera) = setup();
        resize(&mut viewport, &mut camera, 800, 800);
        assert_eq!(viewport.pixel_ratio(), 2.0);
    }

    #[test]
    fn test_drawing_buffer_uses_captured_ratio() {
        let event = PhysicalSize::new(1600, 900);
        let low = Viewport::new(800, 450, 1.0);
        let high = Viewport::new(1600, 900, 2.0);
        assert_eq!(low.drawing_buffer_size(event, 2.0), (800, 450));
        assert_eq!(high.drawing_buffer_size(event, 2.0), (1600, 900));
    }

    #[test]
    fn test_drawing_buffer_matches_window_at_captured_scale() {
        let viewport = Viewport::new(1280, 720, 1.5);
        let event = PhysicalSize::new(1920, 1080);
        assert_eq!(viewport.drawing_buffer_size(event, 1.5), (1920, 1080));
    }

    #[test]
    fn test_new_clamps_zero() {
        let viewport = Viewport::new(0, 0, 1.0);
        assert_eq!(viewport.size(), (1, 1));
        assert_eq!(viewport.aspect(), 1.0);
    }
}
