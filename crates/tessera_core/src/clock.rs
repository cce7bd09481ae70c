//! Frame clock
//!
//! Measures the time between frames and keeps a rolling average frame rate.
//! Rate-based effects multiply by [`FrameClock::frame_scale`] so that they
//! look the same at 30 and at 144 frames per second.

use std::collections::VecDeque;
use std::time::Instant;

use crate::config::ViewConfig;

/// Per-view frame timer
#[derive(Clone, Debug)]
pub struct FrameClock {
    last_frame: Option<Instant>,
    dt: f32,
    samples: VecDeque<f32>,
    sample_window: usize,
    sample_sum: f32,
    reference_fps: f32,
    max_dt: f32,
    frame_count: u64,
}

impl FrameClock {
    pub fn new(reference_fps: f32, sample_window: usize, max_dt: f32) -> Self {
        Self {
            last_frame: None,
            dt: 0.0,
            samples: VecDeque::with_capacity(sample_window.max(1)),
            sample_window: sample_window.max(1),
            sample_sum: 0.0,
            reference_fps,
            max_dt,
            frame_count: 0,
        }
    }

    pub fn from_config(config: &ViewConfig) -> Self {
        Self::new(
            config.reference_frame_rate,
            config.frame_rate_samples,
            config.max_frame_time,
        )
    }

    /// Start a frame using wall-clock time; returns the frame's `dt` in seconds
    ///
    /// The very first frame has no predecessor and is assumed to last one
    /// reference frame.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = match self.last_frame {
            Some(last) => (now - last).as_secs_f32(),
            None => 1.0 / self.reference_fps,
        };
        self.last_frame = Some(now);
        self.advance(dt)
    }

    /// Start a frame with an explicit `dt` (seconds)
    ///
    /// Negative values count as zero and long stalls are clamped to the
    /// configured maximum so one hitch cannot teleport everything.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let dt = if dt.is_finite() { dt.clamp(0.0, self.max_dt) } else { 0.0 };
        self.dt = dt;
        self.frame_count += 1;

        if dt > 0.0 {
            if self.samples.len() == self.sample_window {
                if let Some(old) = self.samples.pop_front() {
                    self.sample_sum -= old;
                }
            }
            self.samples.push_back(dt);
            self.sample_sum += dt;
        }
        dt
    }

    /// Elapsed time of the current frame in seconds
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Rolling average frame rate; the reference rate until a frame is measured
    pub fn fps(&self) -> f32 {
        if self.samples.is_empty() || self.sample_sum <= 0.0 {
            return self.reference_fps;
        }
        self.samples.len() as f32 / self.sample_sum
    }

    pub fn reference_fps(&self) -> f32 {
        self.reference_fps
    }

    /// `reference_fps / fps`: how many reference frames one actual frame is worth
    pub fn frame_scale(&self) -> f32 {
        self.reference_fps / self.fps()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::from_config(&ViewConfig::default())
    }
}
