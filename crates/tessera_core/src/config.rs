//! View configuration

use std::path::Path;

use serde::Deserialize;

use crate::error::{CoreError, Result};

/// Configuration of a view and its frame loop
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```rust
/// use tessera_core::ViewConfig;
///
/// let config = ViewConfig::from_toml_str("width = 1024.0\nreference_frame_rate = 120.0").unwrap();
/// assert_eq!(config.width, 1024.0);
/// assert_eq!(config.height, 600.0);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Viewport width in logical pixels
    pub width: f32,
    /// Viewport height in logical pixels
    pub height: f32,
    /// Frame rate that rate-based effects are tuned for
    pub reference_frame_rate: f32,
    /// Number of frames in the rolling frame-rate average
    pub frame_rate_samples: usize,
    /// Number of recent pointer positions kept in the mouse trace
    pub mouse_trace_capacity: usize,
    /// Longest frame the clock will report, in seconds
    pub max_frame_time: f32,
    /// Lowest speed (px/s) a move-to may decay to before arrival
    pub min_arrival_speed: f32,
    /// Whether the view owns window focus before the platform says otherwise
    pub start_focused: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            reference_frame_rate: 60.0,
            frame_rate_samples: 30,
            mouse_trace_capacity: 16,
            max_frame_time: 0.25,
            min_arrival_speed: 10.0,
            start_focused: true,
        }
    }
}

impl ViewConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ViewConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded view config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.reference_frame_rate > 0.0) {
            return Err(CoreError::InvalidValue {
                field: "reference_frame_rate",
                reason: format!("must be positive, got {}", self.reference_frame_rate),
            });
        }
        if self.frame_rate_samples == 0 {
            return Err(CoreError::InvalidValue {
                field: "frame_rate_samples",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.max_frame_time > 0.0) {
            return Err(CoreError::InvalidValue {
                field: "max_frame_time",
                reason: format!("must be positive, got {}", self.max_frame_time),
            });
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(CoreError::InvalidValue {
                field: "width/height",
                reason: "viewport size cannot be negative".to_string(),
            });
        }
        Ok(())
    }

    /// Set the viewport size
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the reference frame rate
    pub fn reference_frame_rate(mut self, fps: f32) -> Self {
        self.reference_frame_rate = fps;
        self
    }

    /// Set the rolling frame-rate window
    pub fn frame_rate_samples(mut self, samples: usize) -> Self {
        self.frame_rate_samples = samples;
        self
    }

    /// Set the mouse trace capacity
    pub fn mouse_trace_capacity(mut self, capacity: usize) -> Self {
        self.mouse_trace_capacity = capacity;
        self
    }

    /// Set the minimum move-to arrival speed
    pub fn min_arrival_speed(mut self, speed: f32) -> Self {
        self.min_arrival_speed = speed;
        self
    }

    /// Set whether the view starts with window focus
    pub fn start_focused(mut self, focused: bool) -> Self {
        self.start_focused = focused;
        self
    }
}
