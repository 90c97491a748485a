//! Cropper configuration.
//!
//! Deserialised from the host's camelCase object, for example:
//!
//! ```text
//! {
//!   "uri": "file:///photos/a.jpg",
//!   "mode": "cover",
//!   "frame": { "lines": { "x": 2, "y": 2 }, "points": { "top-left": { "type": "scale-lock" } } },
//!   "minScale": 1,
//!   "maxScale": 4
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::animation::AnimationConfig;
use crate::display::FitMode;
use crate::error::ConfigError;
use crate::frame::FrameConfig;
use crate::limits::{ScaleBounds, DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE};

/// Everything the host configures on a cropper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CropperConfig {
    /// Source image URI; empty until the host supplies one.
    pub uri: String,
    pub mode: FitMode,
    /// Crop frame; `None` crops the whole visible viewport.
    pub frame: Option<FrameConfig>,
    pub min_scale: f64,
    pub max_scale: f64,
    pub animation: AnimationConfig,
}

impl Default for CropperConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            mode: FitMode::default(),
            frame: None,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            animation: AnimationConfig::default(),
        }
    }
}

impl CropperConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: FitMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_frame(mut self, frame: FrameConfig) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn scale_bounds(&self) -> Result<ScaleBounds, ConfigError> {
        ScaleBounds::new(self.min_scale, self.max_scale)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scale_bounds()?;
        if let Some(frame) = &self.frame {
            frame.validate()?;
        }
        Ok(())
    }
}
