use std::fs;
use std::path::Path;

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, CanvasResult};
use crate::stroke::StrokeSettings;

/// Canvas configuration. Missing fields in a config file take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Logical canvas width; stroke coordinates live in this space
    pub width: u32,
    /// Logical canvas height
    pub height: u32,
    /// Device pixels per logical unit for the on-screen surface
    pub pixel_scale: f32,
    /// Unmultiplied RGBA used to draw a gesture while it is in progress
    pub ink_color: [u8; 4],
    /// Initial stroke color; `null` starts in eraser mode
    pub default_color: Option<[u8; 4]>,
    pub default_width: f32,
    /// Smallest integer scale used by scaled exports
    pub min_export_scale: u32,
    /// Exports needing more pixels than this fail instead of allocating
    pub max_export_pixels: u64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            pixel_scale: 1.0,
            ink_color: [0x1e, 0x6f, 0xd9, 0xff],
            default_color: Some([0, 0, 0, 0xff]),
            default_width: 5.0,
            min_export_scale: 4,
            max_export_pixels: 64 * 1024 * 1024,
        }
    }
}

impl CanvasConfig {
    /// Default configuration for a canvas of the given logical size
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> CanvasResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> CanvasResult<Self> {
        let path = path.as_ref();
        log::debug!("loading canvas config from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> CanvasResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CanvasError::InvalidConfig(format!(
                "canvas size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.pixel_scale.is_finite() && self.pixel_scale > 0.0) {
            return Err(CanvasError::InvalidConfig(format!(
                "pixel_scale must be positive, got {}",
                self.pixel_scale
            )));
        }
        if self.min_export_scale == 0 {
            return Err(CanvasError::InvalidConfig(
                "min_export_scale must be at least 1".to_owned(),
            ));
        }
        self.default_settings().map(|_| ())
    }

    pub fn ink_color(&self) -> Color32 {
        let [r, g, b, a] = self.ink_color;
        Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    /// Stroke settings a fresh canvas starts with
    pub fn default_settings(&self) -> CanvasResult<StrokeSettings> {
        StrokeSettings::from_rgba(self.default_color, self.default_width)
    }
}
