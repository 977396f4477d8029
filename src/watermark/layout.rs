use ab_glyph::{FontArc, PxScale};
use imageproc::drawing::text_size;

use super::{FontSet, WatermarkConfig, WatermarkRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Body,
    Info,
}

impl TextStyle {
    pub fn font(self, fonts: &FontSet) -> &FontArc {
        match self {
            TextStyle::Title => fonts.title.font(),
            TextStyle::Body | TextStyle::Info => fonts.body.font(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub size: f32,
    pub style: TextStyle,
    /// Advance width as measured for this font and size
    pub width: u32,
}

impl TextPlacement {
    pub fn scale(&self) -> PxScale {
        PxScale::from(self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separator {
    pub x_start: i32,
    pub x_end: i32,
    pub y: i32,
    pub thickness: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapPlacement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Where everything on the band goes, computed before any pixel is touched.
#[derive(Debug, Clone, PartialEq)]
pub struct BandLayout {
    pub width: u32,
    pub height: u32,
    pub band_top: u32,
    pub band_height: u32,
    pub margin: i32,
    pub location: Vec<TextPlacement>,
    pub dropped_lines: usize,
    pub separator: Separator,
    pub date_time: Option<TextPlacement>,
    pub temperature: Option<TextPlacement>,
    /// Largest box a map may occupy
    pub map_box: (u32, u32),
}

fn measure(text: &str, size: f32, font: &FontArc) -> u32 {
    if text.is_empty() {
        return 0;
    }
    let (width, _) = text_size(PxScale::from(size), font, text);
    width
}

fn place_text(
    text: &str,
    x: i32,
    y: f32,
    size: f32,
    style: TextStyle,
    fonts: &FontSet,
) -> TextPlacement {
    TextPlacement {
        text: text.to_string(),
        x,
        y: y.round() as i32,
        size,
        style,
        width: measure(text, size, style.font(fonts)),
    }
}

impl BandLayout {
    pub fn plan(
        width: u32,
        height: u32,
        request: &WatermarkRequest,
        config: &WatermarkConfig,
        fonts: &FontSet,
    ) -> Self {
        let resolve = |length: super::Length| length.resolve(width, height);

        let band_height =
            ((height as f32 * config.effective_band_fraction()).round() as u32).min(height);
        let band_top = height - band_height;
        let margin = resolve(config.margin).round() as i32;

        let title_size = resolve(config.title_font_size);
        let body_size = resolve(config.body_font_size);
        let info_size = resolve(config.info_font_size);

        let mut cursor = band_top as f32 + margin as f32;

        let kept = request.location_lines.len().min(config.max_location_lines);
        let mut location = Vec::with_capacity(kept);
        for (index, line) in request.location_lines.iter().take(kept).enumerate() {
            if index == 0 {
                location.push(place_text(line, margin, cursor, title_size, TextStyle::Title, fonts));
                cursor += resolve(config.title_line_step);
            } else {
                location.push(place_text(line, margin, cursor, body_size, TextStyle::Body, fonts));
                cursor += resolve(config.body_line_step);
            }
        }

        let separator = Separator {
            x_start: margin,
            x_end: (width as i32).saturating_sub(margin),
            y: cursor.round() as i32,
            thickness: config.separator_thickness,
        };
        cursor += resolve(config.separator_gap);

        let date_time = (!request.date_time_text.is_empty()).then(|| {
            place_text(
                &request.date_time_text,
                margin,
                cursor,
                info_size,
                TextStyle::Info,
                fonts,
            )
        });

        let temperature = (!request.temperature_text.is_empty()).then(|| {
            let mut placement = place_text(
                &request.temperature_text,
                0,
                cursor,
                info_size,
                TextStyle::Info,
                fonts,
            );
            placement.x = (width as i32)
                .saturating_sub(margin)
                .saturating_sub(placement.width as i32);
            placement
        });

        let map_box = (
            (width as f32 * config.map_max_width_fraction).floor() as u32,
            (band_height as f32 * config.map_max_band_fraction).floor() as u32,
        );

        Self {
            width,
            height,
            band_top,
            band_height,
            margin,
            location,
            dropped_lines: request.location_lines.len() - kept,
            separator,
            date_time,
            temperature,
            map_box,
        }
    }

    /// Fit a map of the given size into the map box, anchored top-right.
    pub fn place_map(&self, map_width: u32, map_height: u32) -> Option<MapPlacement> {
        let (width, height) = fit_within(map_width, map_height, self.map_box.0, self.map_box.1)?;
        Some(MapPlacement {
            x: (self.width as i32)
                .saturating_sub(self.margin)
                .saturating_sub(width as i32),
            y: (self.band_top as i32).saturating_add(self.margin),
            width,
            height,
        })
    }
}

/// Scale `(width, height)` to fit inside the box while keeping the aspect ratio.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> Option<(u32, u32)> {
    if width == 0 || height == 0 || max_width == 0 || max_height == 0 {
        return None;
    }

    let ratio = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let fitted_width = ((width as f64 * ratio).round() as u32).clamp(1, max_width);
    let fitted_height = ((height as f64 * ratio).round() as u32).clamp(1, max_height);
    Some((fitted_width, fitted_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::Length;
    use image::{DynamicImage, RgbImage};

    fn request(width: u32, height: u32) -> WatermarkRequest {
        WatermarkRequest::new(DynamicImage::ImageRgb8(RgbImage::new(width, height)))
    }

    #[test]
    fn test_band_geometry() {
        let fonts = FontSet::builtin().unwrap();
        let layout = BandLayout::plan(1200, 800, &request(1200, 800), &WatermarkConfig::default(), &fonts);
        assert_eq!(layout.band_height, 280);
        assert_eq!(layout.band_top, 520);
        assert_eq!(layout.margin, 30);
        assert_eq!(layout.map_box, (360, 140));
    }

    #[test]
    fn test_location_lines_advance_cursor() {
        let fonts = FontSet::builtin().unwrap();
        let config = WatermarkConfig::default();
        let req = request(1200, 800).with_location_lines(["Jl. Merdeka No.1", "Kel. A", "Kec. B"]);
        let layout = BandLayout::plan(1200, 800, &req, &config, &fonts);

        let ys: Vec<i32> = layout.location.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![550, 592, 622]);
        assert_eq!(layout.location[0].style, TextStyle::Title);
        assert_eq!(layout.location[1].style, TextStyle::Body);
        assert_eq!(layout.separator.y, 652);
        assert_eq!(layout.separator.x_start, 30);
        assert_eq!(layout.separator.x_end, 1170);
    }

    #[test]
    fn test_huge_margin_saturates() {
        let fonts = FontSet::builtin().unwrap();
        let config = WatermarkConfig {
            margin: Length::Px(3.0e9),
            ..Default::default()
        };
        let req = request(400, 300).with_temperature("30°C / 86°F");
        let layout = BandLayout::plan(400, 300, &req, &config, &fonts);

        assert_eq!(layout.margin, i32::MAX);
        assert!(layout.separator.x_end < layout.separator.x_start);
        assert!(layout.temperature.as_ref().unwrap().x < 0);
        let placement = layout.place_map(60, 30).unwrap();
        assert_eq!(placement.y, i32::MAX);
    }

    #[test]
    fn test_lines_past_cap_are_dropped() {
        let fonts = FontSet::builtin().unwrap();
        let config = WatermarkConfig {
            max_location_lines: 7,
            ..Default::default()
        };
        let lines: Vec<String> = (0..10).map(|i| format!("Line {}", i)).collect();
        let layout = BandLayout::plan(1200, 800, &request(1200, 800).with_location_lines(lines), &config, &fonts);
        assert_eq!(layout.location.len(), 7);
        assert_eq!(layout.dropped_lines, 3);
        assert_eq!(layout.location.last().unwrap().text, "Line 6");
    }

    #[test]
    fn test_temperature_is_right_aligned() {
        let fonts = FontSet::builtin().unwrap();
        let req = request(1200, 800).with_temperature("33°C / 91°F");
        let layout = BandLayout::plan(1200, 800, &req, &WatermarkConfig::default(), &fonts);

        let temperature = layout.temperature.unwrap();
        assert!(temperature.width > 0);
        assert_eq!(temperature.x + temperature.width as i32, 1200 - 30);
    }

    #[test]
    fn test_empty_fields_reserve_row_but_are_not_placed() {
        let fonts = FontSet::builtin().unwrap();
        let layout = BandLayout::plan(1200, 800, &request(1200, 800), &WatermarkConfig::default(), &fonts);
        assert!(layout.location.is_empty());
        assert!(layout.date_time.is_none());
        assert!(layout.temperature.is_none());
        assert_eq!(layout.separator.y, 550);
    }

    #[test]
    fn test_relative_sizes_scale_with_image() {
        let fonts = FontSet::builtin().unwrap();
        let config = WatermarkConfig {
            margin: Length::WidthFraction(0.025),
            title_font_size: Length::HeightFraction(0.05),
            ..Default::default()
        };
        let req = request(2400, 1600).with_location_lines(["Title"]);
        let layout = BandLayout::plan(2400, 1600, &req, &config, &fonts);
        assert_eq!(layout.margin, 60);
        assert_eq!(layout.location[0].size, 80.0);
    }

    #[test]
    fn test_map_placement_anchored_top_right() {
        let fonts = FontSet::builtin().unwrap();
        let layout = BandLayout::plan(1200, 800, &request(1200, 800), &WatermarkConfig::default(), &fonts);

        // 600x300 into a 360x140 box keeps the 2:1 ratio
        let placement = layout.place_map(600, 300).unwrap();
        assert_eq!((placement.width, placement.height), (280, 140));
        assert_eq!(placement.x, 1200 - 30 - 280);
        assert_eq!(placement.y, 520 + 30);
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(600, 300, 220, 130), Some((220, 110)));
        assert_eq!(fit_within(100, 100, 220, 130), Some((130, 130)));
        assert_eq!(fit_within(0, 300, 220, 130), None);
        assert_eq!(fit_within(600, 300, 0, 130), None);
    }
}
