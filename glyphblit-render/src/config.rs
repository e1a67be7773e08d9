//! Rendering configuration, fixed for a process run.
//!
//! Loaded from JSON (every field optional) and validated once at startup:
//! the pixel depth must be one the whole pipeline supports, and both colors
//! must fit in it.

use glyphblit_core::{FontId, PixelDepth};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::RenderError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("{field} color {value:#x} does not fit in {depth}")]
    ColorOutOfRange {
        field: &'static str,
        value: u32,
        depth: PixelDepth,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub pixel_depth: PixelDepth,
    pub background_color: u32,
    pub foreground_color: u32,
    pub font_id: FontId,
    /// Encoding label of the text handed to the renderer.
    pub source_encoding: String,
    /// Legacy codepage the fonts are indexed by.
    pub target_encoding: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixel_depth: PixelDepth::Bpp8,
            background_color: 0x00,
            foreground_color: 0xFF,
            font_id: FontId(1),
            source_encoding: "utf-8".to_string(),
            target_encoding: "gb2312".to_string(),
        }
    }
}

impl RenderConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject depths the background fill can't handle and colors wider
    /// than the depth.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pixel_depth == PixelDepth::Bpp24 {
            return Err(RenderError::UnsupportedDepth(24).into());
        }
        let mask = self.pixel_depth.color_mask();
        for (field, value) in [
            ("background", self.background_color),
            ("foreground", self.foreground_color),
        ] {
            if value & !mask != 0 {
                return Err(ConfigError::ColorOutOfRange {
                    field,
                    value,
                    depth: self.pixel_depth,
                });
            }
        }
        Ok(())
    }
}

// ===================================================================
// Tests
// ===================================================================
