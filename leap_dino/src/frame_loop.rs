//! Frame scheduling and frame-rate sampling.
//!
//! [`FrameScheduler`] hands out generation-stamped [`FrameHandle`]s; a frame
//! callback holding a stale handle does nothing.  Stopping the scheduler
//! stops frames without touching game state, and starting it again simply
//! resumes from the next frame with no catch-up.

use std::time::{Duration, Instant};

// ════════════════════════════════════════════════════════════════════════════
// FrameScheduler
// ════════════════════════════════════════════════════════════════════════════

/// Token for one scheduling run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHandle(u64);

#[derive(Debug, Default)]
pub struct FrameScheduler {
    generation: u64,
    running:    bool,
}

impl FrameScheduler {
    pub fn new() -> Self { Self::default() }

    /// Begin a new run.  Any handle from an earlier run is invalidated, so
    /// starting twice never leaves two live schedules.
    pub fn start(&mut self) -> FrameHandle {
        self.generation += 1;
        self.running = true;
        FrameHandle(self.generation)
    }

    pub fn stop(&mut self) {
        if self.running {
            self.generation += 1;
            self.running = false;
        }
    }

    pub fn is_current(&self, handle: FrameHandle) -> bool {
        self.running && handle.0 == self.generation
    }

    pub fn is_running(&self) -> bool { self.running }
}

// ════════════════════════════════════════════════════════════════════════════
// FpsMeter
// ════════════════════════════════════════════════════════════════════════════

const SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// Frames per second, re-sampled at most once a second.
#[derive(Debug, Default)]
pub struct FpsMeter {
    window_start: Option<Instant>,
    frames:       u32,
    fps:          u32,
}

impl FpsMeter {
    pub fn new() -> Self { Self::default() }

    /// Count one rendered frame.  The first frame after a (re)start only
    /// opens the sampling window.
    pub fn frame(&mut self, now: Instant) {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            self.frames = 0;
            return;
        };

        self.frames += 1;
        let elapsed = now.saturating_duration_since(start);
        if elapsed >= SAMPLE_WINDOW {
            self.fps = (self.frames as f64 / elapsed.as_secs_f64()).round() as u32;
            self.frames = 0;
            self.window_start = Some(now);
        }
    }

    /// Forget the open window, e.g. after a pause.  The last sample is kept.
    pub fn restart(&mut self) {
        self.window_start = None;
        self.frames = 0;
    }

    pub fn fps(&self) -> u32 { self.fps }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_handle_is_ignored() {
        let mut s = FrameScheduler::new();
        let first = s.start();
        assert!(s.is_current(first));
        let second = s.start();
        assert!(!s.is_current(first));
        assert!(s.is_current(second));
    }

    #[test]
    fn stop_invalidates_handle() {
        let mut s = FrameScheduler::new();
        let h = s.start();
        s.stop();
        assert!(!s.is_running());
        assert!(!s.is_current(h));
        let h2 = s.start();
        assert!(s.is_current(h2));
        assert_ne!(h, h2);
    }

    #[test]
    fn sixty_frames_in_a_second() {
        let mut m = FpsMeter::new();
        let t0 = Instant::now();
        let frame = Duration::from_micros(16_667);
        for i in 0..=60u32 {
            m.frame(t0 + frame * i);
        }
        assert_eq!(m.fps(), 60);
    }

    #[test]
    fn no_sample_before_a_second() {
        let mut m = FpsMeter::new();
        let t0 = Instant::now();
        for i in 0..30u32 {
            m.frame(t0 + Duration::from_millis(20) * i);
        }
        assert_eq!(m.fps(), 0);
    }

    #[test]
    fn slow_frames() {
        let mut m = FpsMeter::new();
        let t0 = Instant::now();
        for i in 0..=20u32 {
            m.frame(t0 + Duration::from_millis(50) * i);
        }
        assert_eq!(m.fps(), 20);
    }

    #[test]
    fn restart_does_not_count_the_gap() {
        let mut m = FpsMeter::new();
        let t0 = Instant::now();
        m.frame(t0);
        m.restart();
        // A long pause, then a normal second of frames.
        let t1 = t0 + Duration::from_secs(30);
        for i in 0..=50u32 {
            m.frame(t1 + Duration::from_millis(20) * i);
        }
        assert_eq!(m.fps(), 50);
    }
}
