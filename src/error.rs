//! Error types.
//!
//! Only setup can fail. Once a session is running, per-frame surface problems
//! are handled in place and never surface as errors.

/// Errors that can occur during GPU initialization.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),

    /// The adapter cannot present to the window surface.
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,
}

/// Top-level application errors, reported by `main`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    Gpu(#[from] GpuError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_error_display() {
        assert_eq!(
            GpuError::NoAdapter.to_string(),
            "no compatible GPU adapter found"
        );
    }

    #[test]
    fn test_app_error_is_transparent_over_gpu() {
        let err = AppError::from(GpuError::UnsupportedSurface);
        assert_eq!(err.to_string(), "surface is not supported by the adapter");
        assert!(matches!(err, AppError::Gpu(GpuError::UnsupportedSurface)));
    }
}
