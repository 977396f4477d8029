use image::{DynamicImage, RgbImage, Rgba, RgbaImage, imageops};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, error, warn};

use super::{
    BandLayout, FontSet, MAX_PIXELS, MapPlacement, TextPlacement, WatermarkConfig,
    WatermarkError, WatermarkRequest,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapStatus {
    NotRequested,
    Drawn(MapPlacement),
    Skipped(String),
}

/// What ended up on the band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionReport {
    pub band_drawn: bool,
    pub lines_drawn: usize,
    pub lines_dropped: usize,
    pub map: MapStatus,
}

/// Outcome of [`compose`]. The original image is handed back untouched when
/// composition fails.
#[derive(Debug)]
pub enum Composed {
    Watermarked {
        image: RgbImage,
        report: CompositionReport,
    },
    Original {
        image: DynamicImage,
        error: WatermarkError,
    },
}

impl Composed {
    pub fn is_watermarked(&self) -> bool {
        matches!(self, Composed::Watermarked { .. })
    }

    pub fn error(&self) -> Option<&WatermarkError> {
        match self {
            Composed::Watermarked { .. } => None,
            Composed::Original { error, .. } => Some(error),
        }
    }

    pub fn into_image(self) -> DynamicImage {
        match self {
            Composed::Watermarked { image, .. } => DynamicImage::ImageRgb8(image),
            Composed::Original { image, .. } => image,
        }
    }
}

/// Stamp the information band onto the request's image.
///
/// Never fails: on error the caller gets the original image and the reason.
pub fn compose(request: WatermarkRequest, config: &WatermarkConfig, fonts: &FontSet) -> Composed {
    match render(&request, config, fonts) {
        Ok((image, report)) => {
            debug!(
                "Watermark composed: {} lines drawn, {} dropped, map {:?}",
                report.lines_drawn, report.lines_dropped, report.map
            );
            Composed::Watermarked { image, report }
        }
        Err(e) => {
            error!("Failed to compose watermark, returning original image: {}", e);
            Composed::Original {
                image: request.base_image,
                error: e,
            }
        }
    }
}

pub fn render(
    request: &WatermarkRequest,
    config: &WatermarkConfig,
    fonts: &FontSet,
) -> Result<(RgbImage, CompositionReport), WatermarkError> {
    config.validate()?;

    // Flatten any alpha first so the output never carries transparency
    let base = request.base_image.to_rgb8();
    let (width, height) = base.dimensions();
    if width == 0 || height == 0 {
        return Err(WatermarkError::EmptyImage { width, height });
    }

    let layout = BandLayout::plan(width, height, request, config, fonts);
    let mut report = CompositionReport {
        band_drawn: false,
        lines_drawn: 0,
        lines_dropped: layout.dropped_lines,
        map: MapStatus::NotRequested,
    };

    if !config.always_draw_band && !request.has_content() {
        debug!("Nothing to draw on the band, leaving image untouched");
        return Ok((base, report));
    }

    let mut overlay = RgbaImage::new(width, height);

    if layout.band_height > 0 {
        let [r, g, b] = config.band_color;
        draw_filled_rect_mut(
            &mut overlay,
            Rect::at(0, layout.band_top as i32).of_size(width, layout.band_height),
            Rgba([r, g, b, config.band_alpha]),
        );
        report.band_drawn = true;
    }

    let [r, g, b] = config.text_color;
    let text_color = Rgba([r, g, b, 255]);

    for placement in &layout.location {
        draw_placement(&mut overlay, placement, text_color, fonts);
    }
    report.lines_drawn = layout.location.len();

    let separator = layout.separator;
    let separator_length = separator.x_end.saturating_sub(separator.x_start);
    if separator.thickness > 0 && separator_length > 0 {
        draw_filled_rect_mut(
            &mut overlay,
            Rect::at(separator.x_start, separator.y)
                .of_size(separator_length as u32, separator.thickness),
            text_color,
        );
    }

    if let Some(placement) = &layout.date_time {
        draw_placement(&mut overlay, placement, text_color, fonts);
    }
    if let Some(placement) = &layout.temperature {
        draw_placement(&mut overlay, placement, text_color, fonts);
    }

    if let Some(map) = &request.map_image {
        report.map = paste_map(&mut overlay, map, &layout, config);
    }

    let mut composed = DynamicImage::ImageRgb8(base).into_rgba8();
    imageops::overlay(&mut composed, &overlay, 0, 0);

    Ok((DynamicImage::ImageRgba8(composed).into_rgb8(), report))
}

fn draw_placement(
    overlay: &mut RgbaImage,
    placement: &TextPlacement,
    color: Rgba<u8>,
    fonts: &FontSet,
) {
    draw_text_mut(
        overlay,
        color,
        placement.x,
        placement.y,
        placement.scale(),
        placement.style.font(fonts),
        &placement.text,
    );
}

/// Resize the map into its box and paste it over a solid backing.
///
/// Any problem skips the map; the rest of the band is unaffected.
fn paste_map(
    overlay: &mut RgbaImage,
    map: &DynamicImage,
    layout: &BandLayout,
    config: &WatermarkConfig,
) -> MapStatus {
    let Some(placement) = layout.place_map(map.width(), map.height()) else {
        let reason = format!(
            "map {}x{} does not fit a {}x{} box",
            map.width(),
            map.height(),
            layout.map_box.0,
            layout.map_box.1
        );
        warn!("Skipping map: {}", reason);
        return MapStatus::Skipped(reason);
    };

    let resized = map
        .resize_exact(
            placement.width,
            placement.height,
            imageops::FilterType::Lanczos3,
        )
        .to_rgba8();

    let padding = config.map_backing_padding.min(MAX_PIXELS as u32);
    if padding > 0 {
        let [r, g, b] = config.map_backing_color;
        draw_filled_rect_mut(
            overlay,
            Rect::at(
                placement.x.saturating_sub(padding as i32),
                placement.y.saturating_sub(padding as i32),
            )
            .of_size(
                placement.width.saturating_add(padding.saturating_mul(2)),
                placement.height.saturating_add(padding.saturating_mul(2)),
            ),
            Rgba([r, g, b, 255]),
        );
    }

    imageops::overlay(overlay, &resized, placement.x as i64, placement.y as i64);
    MapStatus::Drawn(placement)
}
