pub mod error;
pub mod form;

pub use error::*;
pub use form::*;

use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::Config;
use crate::exif::{PhotoMetadata, read_photo_metadata};
use crate::geocode::{Coordinates, DynGeocoder, LocationLookup, create_geocoder, lookup_location};
use crate::jpeg::{OutputConfig, encode_jpeg, extract_icc_profile};
use crate::map::{DynMapProvider, create_map_provider, fetch_map_or_none};
use crate::watermark::{
    Composed, FontSet, WatermarkConfig, WatermarkError, WatermarkRequest, compose,
    split_location_text,
};

/// The stamped photo plus everything worth telling the user about it.
#[derive(Debug, Clone)]
pub struct StampOutcome {
    pub jpeg: Vec<u8>,
    pub watermarked: bool,
    /// Why the original photo was returned instead
    pub error: Option<String>,
    /// Inputs that were ignored or services that degraded
    pub warnings: Vec<String>,
    pub location_lines: Vec<String>,
}

/// Turns a photo and a filled-in form into a stamped JPEG.
pub struct StampService {
    watermark: WatermarkConfig,
    fonts: Arc<FontSet>,
    geocoder: DynGeocoder,
    maps: DynMapProvider,
    output: OutputConfig,
    date_locale: DateLocale,
}

impl StampService {
    pub fn new(config: &Config) -> Result<Self, StampError> {
        let fonts = FontSet::load(&config.fonts)?;
        info!(
            "Fonts: title {}, body {}",
            fonts.title.describe(),
            fonts.body.describe()
        );

        let geocoder = create_geocoder(&config.geocoding)?;
        let maps = create_map_provider(&config.map)?;
        info!(
            "Geocoder: {}, map provider: {}",
            geocoder.name(),
            maps.name()
        );

        Ok(Self::with_parts(config, Arc::new(fonts), geocoder, maps))
    }

    /// Build around already constructed collaborators.
    pub fn with_parts(
        config: &Config,
        fonts: Arc<FontSet>,
        geocoder: DynGeocoder,
        maps: DynMapProvider,
    ) -> Self {
        Self {
            watermark: config.watermark.clone(),
            fonts,
            geocoder,
            maps,
            output: config.output.clone(),
            date_locale: config.app.date_locale,
        }
    }

    /// The "fetch address" action. Only invalid coordinates are an error;
    /// service failures come back as a coordinate-only lookup.
    pub async fn fetch_address(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> Result<LocationLookup, StampError> {
        let coordinates = Coordinates::parse(latitude, longitude)?;
        Ok(lookup_location(self.geocoder.as_ref(), coordinates).await)
    }

    pub async fn stamp(&self, photo: &[u8], form: StampForm) -> Result<StampOutcome, StampError> {
        if photo.is_empty() {
            return Err(StampError::MissingPhoto);
        }
        let base_image = image::load_from_memory(photo).map_err(StampError::InvalidPhoto)?;
        let metadata = read_photo_metadata(photo);
        let mut warnings = Vec::new();

        let coordinates = resolve_coordinates(&form, &metadata, &mut warnings);

        let location_lines = match given(&form.address).map(split_location_text) {
            Some(lines) if !lines.is_empty() => lines,
            _ => match coordinates {
                Some(coordinates) => {
                    let lookup = lookup_location(self.geocoder.as_ref(), coordinates).await;
                    if let Some(e) = &lookup.error {
                        warnings.push(format!("Address lookup failed: {}", e));
                    }
                    lookup.lines
                }
                None => Vec::new(),
            },
        };

        let date_time_text = self.resolve_date_time(&form, &metadata, &mut warnings);

        let temperature_text =
            match Temperature::parse(form.temp_c.as_deref(), form.temp_f.as_deref()) {
                Ok(Some(temperature)) => temperature.label(),
                Ok(None) => String::new(),
                Err(e) => {
                    warnings.push(e.to_string());
                    String::new()
                }
            };

        let map_image = match (form.show_map, coordinates) {
            (false, _) => None,
            (true, Some(coordinates)) => {
                let map = fetch_map_or_none(self.maps.as_ref(), coordinates).await;
                if map.is_none() {
                    warnings.push("Map could not be loaded".to_string());
                }
                map
            }
            (true, None) => {
                warnings.push("Map requested but no coordinates are available".to_string());
                None
            }
        };

        let request = WatermarkRequest::new(base_image)
            .with_location_lines(location_lines.clone())
            .with_date_time(date_time_text)
            .with_temperature(temperature_text)
            .with_map(map_image);

        let composed = self.compose_blocking(request).await;
        let watermarked = composed.is_watermarked();
        let error = composed.error().map(ToString::to_string);

        let icc_profile = if self.output.preserve_icc_profile {
            extract_icc_profile(photo)
        } else {
            None
        };
        let jpeg = encode_jpeg(
            &composed.into_image(),
            self.output.jpeg_quality,
            icc_profile.as_deref(),
        )
        .map_err(StampError::EncodeError)?;

        for warning in &warnings {
            warn!("Stamp warning: {}", warning);
        }

        Ok(StampOutcome {
            jpeg,
            watermarked,
            error,
            warnings,
            location_lines,
        })
    }

    /// Run the compositor off the async runtime. A panic in the task still
    /// hands back the original photo.
    async fn compose_blocking(&self, request: WatermarkRequest) -> Composed {
        let original = request.base_image.clone();
        let config = self.watermark.clone();
        let fonts = self.fonts.clone();

        match tokio::task::spawn_blocking(move || compose(request, &config, &fonts)).await {
            Ok(composed) => composed,
            Err(e) => {
                error!("Watermark task failed: {}", e);
                Composed::Original {
                    image: original,
                    error: WatermarkError::TaskFailed(e.to_string()),
                }
            }
        }
    }

    fn resolve_date_time(
        &self,
        form: &StampForm,
        metadata: &PhotoMetadata,
        warnings: &mut Vec<String>,
    ) -> String {
        let fallback: NaiveDateTime = metadata
            .captured_at
            .unwrap_or_else(|| Local::now().naive_local());

        let date = match given(&form.date).map(parse_date) {
            Some(Ok(date)) => date,
            Some(Err(e)) => {
                warnings.push(e.to_string());
                fallback.date()
            }
            None => fallback.date(),
        };

        let time = match given(&form.time).map(parse_time) {
            Some(Ok(time)) => time,
            Some(Err(e)) => {
                warnings.push(e.to_string());
                fallback.time()
            }
            None => fallback.time(),
        };

        format_date_time(date, time, self.date_locale)
    }
}

fn resolve_coordinates(
    form: &StampForm,
    metadata: &PhotoMetadata,
    warnings: &mut Vec<String>,
) -> Option<Coordinates> {
    match (given(&form.latitude), given(&form.longitude)) {
        (Some(latitude), Some(longitude)) => match Coordinates::parse(latitude, longitude) {
            Ok(coordinates) => return Some(coordinates),
            Err(e) => warnings.push(e.to_string()),
        },
        (None, None) => {}
        _ => warnings.push("Both latitude and longitude are needed".to_string()),
    }

    if let Some(coordinates) = metadata.coordinates {
        info!(
            "Using GPS position from photo: {:.6}, {:.6}",
            coordinates.latitude, coordinates.longitude
        );
    }
    metadata.coordinates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::providers::offline::OfflineGeocoder;
    use crate::map::providers::disabled::DisabledMapProvider;
    use crate::test_util::solid_png;

    fn service() -> StampService {
        StampService::with_parts(
            &Config::default(),
            Arc::new(FontSet::builtin().unwrap()),
            Arc::new(OfflineGeocoder),
            Arc::new(DisabledMapProvider),
        )
    }

    #[tokio::test]
    async fn test_stamp_with_address_text() {
        let form = StampForm {
            address: Some("Jl. Merdeka No.1\nKel. A\n\nKec. B".to_string()),
            date: Some("2024-01-01".to_string()),
            time: Some("08:30".to_string()),
            temp_c: Some("30".to_string()),
            temp_f: Some("86".to_string()),
            ..Default::default()
        };
        let outcome = service().stamp(&solid_png(320, 240, [90, 120, 150]), form).await.unwrap();

        assert!(outcome.watermarked);
        assert!(outcome.error.is_none());
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
        assert_eq!(outcome.location_lines, vec!["Jl. Merdeka No.1", "Kel. A", "Kec. B"]);

        let decoded = image::load_from_memory(&outcome.jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 240));
    }

    #[tokio::test]
    async fn test_coordinates_without_address_fall_back() {
        let form = StampForm {
            latitude: Some("-6.1101".to_string()),
            longitude: Some("106.1633".to_string()),
            ..Default::default()
        };
        let outcome = service().stamp(&solid_png(200, 200, [0, 0, 0]), form).await.unwrap();
        assert!(outcome.watermarked);
        assert_eq!(outcome.location_lines, vec!["Koordinat: -6.110100, 106.163300"]);
        assert!(outcome.warnings.iter().any(|w| w.starts_with("Address lookup failed")));
    }

    #[tokio::test]
    async fn test_invalid_inputs_become_warnings() {
        let form = StampForm {
            latitude: Some("north".to_string()),
            longitude: Some("106".to_string()),
            date: Some("yesterday".to_string()),
            temp_c: Some("warm".to_string()),
            show_map: true,
            ..Default::default()
        };
        let outcome = service().stamp(&solid_png(200, 200, [0, 0, 0]), form).await.unwrap();
        assert!(outcome.watermarked);
        assert!(outcome.location_lines.is_empty());
        assert_eq!(outcome.warnings.len(), 4, "{:?}", outcome.warnings);
    }

    #[tokio::test]
    async fn test_missing_and_invalid_photo() {
        assert!(matches!(
            service().stamp(&[], StampForm::default()).await,
            Err(StampError::MissingPhoto)
        ));
        assert!(matches!(
            service().stamp(b"not an image", StampForm::default()).await,
            Err(StampError::InvalidPhoto(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_address_validates_coordinates() {
        let service = service();
        assert!(matches!(
            service.fetch_address("abc", "1").await,
            Err(StampError::Geocode(_))
        ));
        let lookup = service.fetch_address("1.5", "2.5").await.unwrap();
        assert_eq!(lookup.text(), "Koordinat: 1.500000, 2.500000");
    }

    #[test]
    fn test_resolve_coordinates_prefers_form() {
        let metadata = PhotoMetadata {
            coordinates: Some(Coordinates::new(1.0, 1.0).unwrap()),
            captured_at: None,
        };
        let form = StampForm {
            latitude: Some("2".to_string()),
            longitude: Some("3".to_string()),
            ..Default::default()
        };
        let mut warnings = Vec::new();
        let resolved = resolve_coordinates(&form, &metadata, &mut warnings).unwrap();
        assert_eq!((resolved.latitude, resolved.longitude), (2.0, 3.0));

        let half = StampForm {
            latitude: Some("2".to_string()),
            ..Default::default()
        };
        let resolved = resolve_coordinates(&half, &metadata, &mut warnings).unwrap();
        assert_eq!((resolved.latitude, resolved.longitude), (1.0, 1.0));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_date_time_uses_exif_capture() {
        let metadata = PhotoMetadata {
            coordinates: None,
            captured_at: crate::exif::parse_exif_datetime("2024:01:01 08:30:00"),
        };
        let mut warnings = Vec::new();
        let text = service().resolve_date_time(&StampForm::default(), &metadata, &mut warnings);
        assert_eq!(text, "2024-01-01 (Sen)  08:30");
        assert!(warnings.is_empty());
    }
}
