use chrono::NaiveDateTime;
use tracing::{debug, trace};

use crate::geocode::Coordinates;

/// What an uploaded photo can tell us about where and when it was taken.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoMetadata {
    pub coordinates: Option<Coordinates>,
    pub captured_at: Option<NaiveDateTime>,
}

pub fn read_photo_metadata(bytes: &[u8]) -> PhotoMetadata {
    match rexif::parse_buffer(bytes) {
        Ok(exif) => {
            let metadata = PhotoMetadata {
                coordinates: extract_coordinates(&exif),
                captured_at: extract_capture_time(&exif),
            };
            debug!("EXIF metadata: {:?}", metadata);
            metadata
        }
        Err(e) => {
            trace!("No EXIF data in upload: {}", e);
            PhotoMetadata::default()
        }
    }
}

fn extract_capture_time(exif: &rexif::ExifData) -> Option<NaiveDateTime> {
    let date_fields = [
        rexif::ExifTag::DateTimeOriginal,
        rexif::ExifTag::DateTimeDigitized,
        rexif::ExifTag::DateTime,
    ];

    date_fields.iter().find_map(|field| {
        exif.entries
            .iter()
            .find(|e| e.tag == *field)
            .and_then(|entry| parse_exif_datetime(&entry.value_more_readable))
    })
}

pub(crate) fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    let formats = ["%Y:%m:%d %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];
    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value.trim(), format).ok())
}

fn extract_coordinates(exif: &rexif::ExifData) -> Option<Coordinates> {
    let mut latitude = None;
    let mut longitude = None;
    let mut lat_ref = None;
    let mut lon_ref = None;

    for entry in &exif.entries {
        match entry.tag {
            rexif::ExifTag::GPSLatitude => latitude = parse_dms(&entry.value_more_readable),
            rexif::ExifTag::GPSLongitude => longitude = parse_dms(&entry.value_more_readable),
            rexif::ExifTag::GPSLatitudeRef => {
                lat_ref = Some(entry.value_more_readable.trim().to_string())
            }
            rexif::ExifTag::GPSLongitudeRef => {
                lon_ref = Some(entry.value_more_readable.trim().to_string())
            }
            _ => {}
        }
    }

    let (mut lat, mut lon) = (latitude?, longitude?);
    if lat_ref.as_deref().is_some_and(|r| r.starts_with('S')) {
        lat = -lat;
    }
    if lon_ref.as_deref().is_some_and(|r| r.starts_with('W')) {
        lon = -lon;
    }

    Coordinates::new(lat, lon).ok()
}

/// Degrees/minutes/seconds as rexif renders them, e.g. `6 deg 6' 36.36"`.
pub(crate) fn parse_dms(value: &str) -> Option<f64> {
    let numbers: Vec<f64> = value
        .split_whitespace()
        .filter_map(|part| part.trim_end_matches(['\'', '"']).parse::<f64>().ok())
        .collect();

    match numbers.as_slice() {
        [degrees] => Some(*degrees),
        [degrees, minutes] => Some(degrees + minutes / 60.0),
        [degrees, minutes, seconds, ..] => Some(degrees + minutes / 60.0 + seconds / 3600.0),
        [] => None,
    }
}
