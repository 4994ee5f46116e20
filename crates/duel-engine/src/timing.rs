//! Frame pacing for the headless loop.
//!
//! Hands the match ticker one frame delta per loop iteration. In realtime
//! mode deltas come from the wall clock and frames are slept to the budget;
//! otherwise every frame is exactly one budget long and nothing sleeps.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frame pacing manager.
#[derive(Debug)]
pub struct FramePacer {
    /// Target frames per second
    target_fps: u32,
    /// Time budget per frame
    frame_budget: Duration,
    /// Time of last frame start
    last_frame: Instant,
    /// Maximum delta time to prevent spiral of death
    max_dt: f32,
    /// Measure and sleep against the wall clock
    realtime: bool,
    /// Recent frame times for averaging
    frame_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(60, false)
    }
}

impl FramePacer {
    /// Create a new frame pacer.
    #[must_use]
    pub fn new(target_fps: u32, realtime: bool) -> Self {
        let target_fps = target_fps.max(1);
        Self {
            target_fps,
            frame_budget: Duration::from_secs_f64(1.0 / f64::from(target_fps)),
            last_frame: Instant::now(),
            max_dt: 0.25,
            realtime,
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Target frames per second.
    #[must_use]
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Delta time for the frame that is starting.
    pub fn delta_time(&mut self) -> f32 {
        let dt = if self.realtime {
            let now = Instant::now();
            let dt = (now - self.last_frame).as_secs_f32();
            self.last_frame = now;
            dt.min(self.max_dt)
        } else {
            1.0 / self.target_fps as f32
        };

        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }
        dt
    }

    /// Sleep for the remainder of the frame budget (realtime only).
    pub fn sleep_remainder(&self) {
        if !self.realtime {
            return;
        }
        let elapsed = self.last_frame.elapsed();
        if elapsed < self.frame_budget {
            std::thread::sleep(self.frame_budget - elapsed);
        }
    }

    /// Average FPS over recent frames.
    #[must_use]
    pub fn current_fps(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        let avg_frame_time: f32 =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        if avg_frame_time > 0.0 {
            1.0 / avg_frame_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_pacing() {
        let mut pacer = FramePacer::new(60, false);
        let dt = pacer.delta_time();
        assert!((dt - 1.0 / 60.0).abs() < 1e-4);
        assert!((pacer.current_fps() - 60.0).abs() < 0.1);
    }

    #[test]
    fn test_realtime_delta() {
        let mut pacer = FramePacer::new(60, true);
        std::thread::sleep(Duration::from_millis(16));
        let dt = pacer.delta_time();
        assert!(dt >= 0.015);
        assert!(dt <= 0.25);
    }

    #[test]
    fn test_realtime_clamps_spikes() {
        let mut pacer = FramePacer::new(60, true);
        std::thread::sleep(Duration::from_millis(300));
        assert!(pacer.delta_time() <= 0.25);
    }

    #[test]
    fn test_zero_fps_clamped() {
        assert_eq!(FramePacer::new(0, false).target_fps(), 1);
    }
}
