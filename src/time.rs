//! Time facilities for the frame loop.
//!
//! The [`Clock`] is created once at setup and never reset; the frame driver
//! reads it through the [`TimeSource`] trait so tests can substitute a manual
//! source.
//!
//! # Example
//!
//! ```
//! use icoglow::time::{Clock, TimeSource};
//!
//! let mut clock = Clock::new();
//!
//! // Once per frame:
//! let elapsed = clock.elapsed();
//! assert!(elapsed >= 0.0);
//! assert_eq!(clock.frame(), 1);
//! ```

use std::time::{Duration, Instant};

/// Monotonic source of elapsed seconds, read once per frame.
pub trait TimeSource {
    /// Seconds since the source was created. Never decreases.
    fn elapsed(&mut self) -> f32;
}

/// Wall clock with frame counting and periodic FPS measurement.
#[derive(Debug)]
pub struct Clock {
    /// When the clock was created.
    start: Instant,
    /// Total elapsed time in seconds at the last read.
    elapsed_secs: f32,
    /// Total reads since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl Clock {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            elapsed_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Elapsed seconds at the most recent read.
    #[inline]
    pub fn last_elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    fn update_fps(&mut self, now: Instant) {
        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            log::debug!("{:.1} fps", self.fps);
        }
    }
}

impl TimeSource for Clock {
    fn elapsed(&mut self) -> f32 {
        let now = Instant::now();
        self.elapsed_secs = now.duration_since(self.start).as_secs_f32();
        self.frame_count += 1;
        self.update_fps(now);
        self.elapsed_secs
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Time source advanced by hand.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualTime {
    pub now: f32,
}

impl ManualTime {
    pub fn new(now: f32) -> Self {
        Self { now }
    }

    /// Move time forward by `delta` seconds. Negative deltas are ignored.
    pub fn advance(&mut self, delta: f32) {
        self.now += delta.max(0.0);
    }
}

impl TimeSource for ManualTime {
    fn elapsed(&mut self) -> f32 {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = Clock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.last_elapsed(), 0.0);
    }

    #[test]
    fn test_clock_read() {
        let mut clock = Clock::new();
        thread::sleep(Duration::from_millis(10));
        let elapsed = clock.elapsed();

        assert!(elapsed > 0.0);
        assert_eq!(clock.frame(), 1);
        assert_eq!(clock.last_elapsed(), elapsed);
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut clock = Clock::new();
        let mut prev = clock.elapsed();
        for _ in 0..100 {
            let now = clock.elapsed();
            assert!(now >= prev);
            prev = now;
        }
        assert_eq!(clock.frame(), 101);
    }

    #[test]
    fn test_fps_measured_after_interval() {
        let mut clock = Clock::new();
        for _ in 0..5 {
            clock.elapsed();
        }
        thread::sleep(Duration::from_millis(520));
        clock.elapsed();
        assert!(clock.fps() > 0.0);
    }

    #[test]
    fn test_manual_time() {
        let mut time = ManualTime::new(1.0);
        time.advance(0.5);
        assert_eq!(time.elapsed(), 1.5);

        // Backwards steps clamp to 0
        time.advance(-1.0);
        assert_eq!(time.elapsed(), 1.5);
    }
}
