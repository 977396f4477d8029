use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::WatermarkError;

pub const MIN_BAND_FRACTION: f32 = 0.25;
pub const MAX_BAND_FRACTION: f32 = 0.40;
/// Upper bound for absolute lengths, paddings and thicknesses.
pub const MAX_PIXELS: f32 = 10_000.0;

/// A size that is either absolute or relative to the base image.
///
/// In TOML this is written as a one-key table, e.g. `margin = { px = 30 }`
/// or `title_font_size = { height_fraction = 0.045 }`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Length {
    Px(f32),
    WidthFraction(f32),
    HeightFraction(f32),
}

impl Length {
    /// Resolve to pixels for an image of the given dimensions.
    pub fn resolve(self, width: u32, height: u32) -> f32 {
        match self {
            Length::Px(px) => px,
            Length::WidthFraction(fraction) => width as f32 * fraction,
            Length::HeightFraction(fraction) => height as f32 * fraction,
        }
    }

    fn is_valid(self) -> bool {
        match self {
            Length::Px(v) => v.is_finite() && (0.0..=MAX_PIXELS).contains(&v),
            Length::WidthFraction(v) | Length::HeightFraction(v) => {
                v.is_finite() && (0.0..=1.0).contains(&v)
            }
        }
    }
}

/// Layout and colour constants for the information band.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Band height as a fraction of the image height, clamped to 0.25..=0.40
    pub band_fraction: f32,
    /// Opacity of the band fill (0-255)
    pub band_alpha: u8,
    pub band_color: [u8; 3],
    pub text_color: [u8; 3],
    pub margin: Length,
    pub title_font_size: Length,
    pub body_font_size: Length,
    /// Font size of the date/time and temperature row
    pub info_font_size: Length,
    pub title_line_step: Length,
    pub body_line_step: Length,
    pub separator_gap: Length,
    pub separator_thickness: u32,
    /// Location lines past this count are dropped
    pub max_location_lines: usize,
    pub map_max_width_fraction: f32,
    /// Map height limit as a fraction of the band height
    pub map_max_band_fraction: f32,
    pub map_backing_padding: u32,
    pub map_backing_color: [u8; 3],
    /// Draw the darkened band even when there is nothing to put on it
    pub always_draw_band: bool,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            band_fraction: 0.35,
            band_alpha: 160,
            band_color: [0, 0, 0],
            text_color: [255, 255, 255],
            margin: Length::Px(30.0),
            title_font_size: Length::Px(36.0),
            body_font_size: Length::Px(22.0),
            info_font_size: Length::Px(28.0),
            title_line_step: Length::Px(42.0),
            body_line_step: Length::Px(30.0),
            separator_gap: Length::Px(15.0),
            separator_thickness: 2,
            max_location_lines: 8,
            map_max_width_fraction: 0.30,
            map_max_band_fraction: 0.50,
            map_backing_padding: 4,
            map_backing_color: [255, 255, 255],
            always_draw_band: true,
        }
    }
}

impl WatermarkConfig {
    pub fn validate(&self) -> Result<(), WatermarkError> {
        if !self.band_fraction.is_finite() || self.band_fraction <= 0.0 {
            return Err(WatermarkError::InvalidConfig(format!(
                "band_fraction must be a positive number, got {}",
                self.band_fraction
            )));
        }

        let lengths = [
            ("margin", self.margin),
            ("title_font_size", self.title_font_size),
            ("body_font_size", self.body_font_size),
            ("info_font_size", self.info_font_size),
            ("title_line_step", self.title_line_step),
            ("body_line_step", self.body_line_step),
            ("separator_gap", self.separator_gap),
        ];
        for (name, length) in lengths {
            if !length.is_valid() {
                return Err(WatermarkError::InvalidConfig(format!(
                    "{} must be 0..={} px or a 0..=1 fraction, got {:?}",
                    name, MAX_PIXELS, length
                )));
            }
        }

        for (name, pixels) in [
            ("separator_thickness", self.separator_thickness),
            ("map_backing_padding", self.map_backing_padding),
        ] {
            if pixels as f32 > MAX_PIXELS {
                return Err(WatermarkError::InvalidConfig(format!(
                    "{} must be at most {}, got {}",
                    name, MAX_PIXELS, pixels
                )));
            }
        }

        for (name, fraction) in [
            ("map_max_width_fraction", self.map_max_width_fraction),
            ("map_max_band_fraction", self.map_max_band_fraction),
        ] {
            if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
                return Err(WatermarkError::InvalidConfig(format!(
                    "{} must be between 0 and 1, got {}",
                    name, fraction
                )));
            }
        }

        Ok(())
    }

    /// The band fraction actually used for layout.
    pub fn effective_band_fraction(&self) -> f32 {
        self.band_fraction.clamp(MIN_BAND_FRACTION, MAX_BAND_FRACTION)
    }
}

/// Candidate font files, tried in order before the built-in face.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FontConfig {
    pub title: Vec<PathBuf>,
    pub body: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            title: vec![
                PathBuf::from("fonts/arialbd.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
            ],
            body: vec![
                PathBuf::from("fonts/arial.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
            ],
        }
    }
}
