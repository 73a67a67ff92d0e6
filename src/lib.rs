//! # icoglow
//!
//! A glowing, noise-shaded icosahedron rendered in real time with wgpu.
//!
//! The scene is a subdivided icosahedron drawn three ways at once: an additive
//! surface shaded by animated simplex noise with a view-dependent edge glow, a
//! faint wireframe over the same geometry, and soft particle sprites sitting on
//! every vertex. The group slowly tumbles, and a multi-level bloom pass
//! composites the result to the window.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> Result<(), icoglow::AppError> {
//!     icoglow::run()
//! }
//! ```
//!
//! ## Structure
//!
//! - [`scene`] composes the object graph once ([`Scene::compose`]).
//! - [`frame`] advances it each redraw ([`FrameDriver::tick`]).
//! - [`viewport`] applies window resizes to the camera and render targets.
//! - [`gpu`] owns the device, the scene pass and the bloom post-process.
//! - [`session`] ties them together under a winit event loop.
//!
//! The CPU-side pieces ([`noise`], [`shading`], [`textures`], [`geometry`])
//! are pure and usable without a GPU.

pub mod config;
pub mod controls;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod gpu;
pub mod noise;
pub mod scene;
pub mod session;
pub mod shading;
pub mod textures;
pub mod time;
pub mod viewport;

pub use config::{BloomSettings, OrbConfig};
pub use error::{AppError, GpuError};
pub use frame::{FrameDriver, FrameState};
pub use geometry::Geometry;
pub use scene::Scene;
pub use session::{run, run_with, App, Session};
pub use viewport::{ResizeOutcome, Viewport};
