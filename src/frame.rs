//! Per-frame update loop.
//!
//! The host's redraw callback drives the loop: every redraw calls
//! [`FrameDriver::tick`], which reads the clock, rotates the main group and
//! writes the elapsed time into the surface material. The caller then renders
//! the composite exactly once and requests the next redraw.

use crate::config::AnimationConfig;
use crate::scene::Scene;
use crate::time::TimeSource;

/// Lifecycle of the frame loop. There is no terminal state; the loop ends
/// when the host tears the session down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    #[default]
    Idle,
    Running,
}

/// Tick-driven state machine that animates the scene.
#[derive(Debug)]
pub struct FrameDriver<T> {
    time: T,
    state: FrameState,
    animation: AnimationConfig,
}

impl<T: TimeSource> FrameDriver<T> {
    pub fn new(time: T, animation: AnimationConfig) -> Self {
        Self {
            time,
            state: FrameState::Idle,
            animation,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Leave `Idle`. Returns `false` if the driver was already running.
    pub fn start(&mut self) -> bool {
        match self.state {
            FrameState::Idle => {
                self.state = FrameState::Running;
                log::debug!("Frame driver running");
                true
            }
            FrameState::Running => false,
        }
    }

    /// Advance the scene to the current time.
    ///
    /// Returns the elapsed seconds the scene now reflects, or `None` without
    /// touching the scene while the driver is idle.
    pub fn tick(&mut self, scene: &mut Scene) -> Option<f32> {
        if self.state != FrameState::Running {
            return None;
        }
        let elapsed = self.time.elapsed();
        animate(scene, elapsed, &self.animation);
        Some(elapsed)
    }

    pub fn time_source(&self) -> &T {
        &self.time
    }

    pub fn time_source_mut(&mut self) -> &mut T {
        &mut self.time
    }
}

/// Set the group rotation and the surface time for `elapsed` seconds.
///
/// Rotation is a pure function of elapsed time, unbounded, never wrapped.
pub fn animate(scene: &mut Scene, elapsed: f32, animation: &AnimationConfig) {
    scene.group.rotation.x = elapsed * animation.rotation_rate_x;
    scene.group.rotation.y = elapsed * animation.rotation_rate_y;
    scene.group.core.material.set_time(elapsed);
}
