//! Application session and window event handling.
//!
//! A [`Session`] owns everything the visual needs: GPU context, scene, camera,
//! controls, frame driver, viewport and both render passes. The winit
//! [`App`] creates it once the window exists and forwards events to it. All
//! of it runs on the event loop thread; redraws and resizes never overlap.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::OrbConfig;
use crate::controls::OrbitControls;
use crate::error::{AppError, GpuError};
use crate::frame::FrameDriver;
use crate::gpu::camera::PerspectiveCamera;
use crate::gpu::post_process::PostProcess;
use crate::gpu::scene_pass::ScenePass;
use crate::gpu::uniforms::FrameUniforms;
use crate::gpu::GpuContext;
use crate::scene::Scene;
use crate::time::Clock;
use crate::viewport::{self, ResizeOutcome, Viewport};

/// Wheel pixels treated as one scroll line.
const PIXELS_PER_LINE: f64 = 100.0;

/// The single context passed to the frame driver and the resize handler.
pub struct Session {
    window: Arc<Window>,
    gpu: GpuContext,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    driver: FrameDriver<Clock>,
    viewport: Viewport,
    scene_pass: ScenePass,
    post_process: PostProcess,
    point_size: f32,
}

impl Session {
    /// Build the scene and every GPU resource for `window`.
    pub async fn new(window: Arc<Window>, config: &OrbConfig) -> Result<Self, GpuError> {
        let size = window.inner_size();
        let pixel_ratio = window.scale_factor();
        let viewport = Viewport::new(size.width, size.height, pixel_ratio);
        log::info!(
            "Viewport {}x{} at pixel ratio {pixel_ratio}",
            viewport.width(),
            viewport.height()
        );

        let gpu = GpuContext::new(Arc::clone(&window)).await?;

        let scene = Scene::compose(config);
        let camera = PerspectiveCamera::new(&config.camera, viewport.aspect());
        let controls = OrbitControls::new(config.controls);
        let driver = FrameDriver::new(Clock::new(), config.animation);

        let scene_pass = ScenePass::new(&gpu.device, &gpu.queue, &scene);
        let post_process = PostProcess::new(
            &gpu.device,
            &gpu.queue,
            viewport.width(),
            viewport.height(),
            gpu.format(),
            config.bloom,
        );

        Ok(Self {
            window,
            gpu,
            scene,
            camera,
            controls,
            driver,
            viewport,
            scene_pass,
            post_process,
            point_size: config.particles.size,
        })
    }

    /// Begin animating. Only the first call has an effect.
    pub fn start(&mut self) {
        self.driver.start();
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// Apply a window resize to the surface, camera and every render target.
    ///
    /// The surface follows the window. The offscreen targets follow the
    /// drawing buffer, scaled by the pixel ratio captured at setup.
    pub fn resize(&mut self, physical: PhysicalSize<u32>) {
        self.gpu.resize(physical.width, physical.height);

        let (width, height) = self
            .viewport
            .drawing_buffer_size(physical, self.window.scale_factor());
        if let ResizeOutcome::Resized { width, height } =
            viewport::resize(&mut self.viewport, &mut self.camera, width, height)
        {
            self.post_process
                .resize(&self.gpu.device, &self.gpu.queue, width, height);
        }
    }

    /// Reconfigure the surface at the current size after it was lost.
    pub fn reconfigure(&mut self) {
        self.gpu.reconfigure();
    }

    /// Advance one frame and present it. Does nothing while the driver is idle.
    pub fn redraw(&mut self) -> Result<(), wgpu::SurfaceError> {
        let Some(elapsed) = self.driver.tick(&mut self.scene) else {
            return Ok(());
        };
        self.controls.update(&mut self.camera);

        let model_view = self.camera.view_matrix() * self.scene.group.model_matrix();
        let uniforms = FrameUniforms::new(
            model_view,
            self.camera.projection_matrix(),
            elapsed,
            self.point_size,
        );
        self.scene_pass.update(&self.gpu.queue, &uniforms);

        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        self.scene_pass.encode(
            &mut encoder,
            self.post_process.scene_view(),
            self.post_process.depth_view(),
        );
        self.post_process.composite(&mut encoder, &view);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// winit application driving a [`Session`].
pub struct App {
    config: OrbConfig,
    session: Option<Session>,
    error: Option<AppError>,
}

impl App {
    pub fn new(config: OrbConfig) -> Self {
        Self {
            config,
            session: None,
            error: None,
        }
    }

    /// The setup error that ended the event loop, if any.
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn create_session(&self, event_loop: &ActiveEventLoop) -> Result<Session, AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.as_str())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let session = pollster::block_on(Session::new(window, &self.config))?;
        Ok(session)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }
        match self.create_session(event_loop) {
            Ok(mut session) => {
                session.start();
                session.window().request_redraw();
                self.session = Some(session);
            }
            Err(e) => {
                log::error!("Setup failed: {e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(session) = &mut self.session else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                session.resize(physical_size);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::debug!(
                    "Scale factor changed to {scale_factor}; keeping pixel ratio {}",
                    session.viewport().pixel_ratio()
                );
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    session
                        .controls_mut()
                        .pointer_button(state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                session.controls_mut().pointer_moved(position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
                };
                session.controls_mut().wheel(lines);
            }
            WindowEvent::RedrawRequested => {
                match session.redraw() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        session.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Surface out of memory");
                        event_loop.exit();
                    }
                    Err(e) => log::warn!("Render error: {e:?}"),
                }
                session.window().request_redraw();
            }
            _ => {}
        }
    }
}

/// Open the window and run the visual until it is closed.
pub fn run() -> Result<(), AppError> {
    run_with(OrbConfig::default())
}

/// [`run`] with explicit parameters.
pub fn run_with(config: OrbConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
