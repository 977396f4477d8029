use crate::Config;
use crate::geocode::GeocoderProviderConfig;
use crate::map::DEFAULT_URL_TEMPLATE;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Invalid watermark configuration: {0}")]
    InvalidWatermarkConfig(String),

    #[error("No {0} font found, the built-in face will be used")]
    FontMissing(&'static str),

    #[error("Invalid geocoder URL '{0}': {1}")]
    InvalidGeocoderUrl(String, url::ParseError),

    #[error("Map URL template is not usable: {0}")]
    InvalidMapTemplate(String),
}

impl StartupCheckError {
    /// Critical failures stop the server from starting.
    pub fn is_critical(&self) -> bool {
        !matches!(self, StartupCheckError::FontMissing(_))
    }
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    match config.watermark.validate() {
        Ok(()) => info!(
            "Watermark band fraction: {:.2}",
            config.watermark.effective_band_fraction()
        ),
        Err(e) => {
            error!("Watermark configuration is invalid: {}", e);
            errors.push(StartupCheckError::InvalidWatermarkConfig(e.to_string()));
        }
    }

    for (role, candidates) in [
        ("title", &config.fonts.title),
        ("body", &config.fonts.body),
    ] {
        let mut found = false;
        for path in candidates {
            if tokio::fs::metadata(path).await.is_ok() {
                info!("Font for {} text found: {:?}", role, path);
                found = true;
                break;
            }
        }
        if !found {
            warn!(
                "None of the {} font candidates exist: {:?}",
                role, candidates
            );
            errors.push(StartupCheckError::FontMissing(role));
        }
    }

    match &config.geocoding.provider {
        GeocoderProviderConfig::Nominatim(nominatim) => {
            match url::Url::parse(&nominatim.base_url) {
                Ok(_) => info!("Reverse geocoding via {}", nominatim.base_url),
                Err(e) => {
                    error!("Geocoder base URL is invalid: {}", e);
                    errors.push(StartupCheckError::InvalidGeocoderUrl(
                        nominatim.base_url.clone(),
                        e,
                    ));
                }
            }
        }
        GeocoderProviderConfig::Offline => {
            info!("Reverse geocoding disabled, coordinates will be shown instead")
        }
    }

    if config.map.enabled {
        if let Err(e) = crate::map::create_map_provider(&config.map) {
            error!("Map configuration is invalid: {}", e);
            errors.push(StartupCheckError::InvalidMapTemplate(e.to_string()));
        } else if config.map.url_template == DEFAULT_URL_TEMPLATE {
            info!("Using default static map service");
        }
    } else {
        info!("Map thumbnails disabled");
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::NominatimConfig;
    use tempfile::TempDir;

    fn config_with_fonts(dir: &TempDir) -> Config {
        let font = dir.path().join("font.ttf");
        std::fs::write(&font, b"not really a font").unwrap();
        let mut config = Config::default();
        config.fonts.title = vec![font.clone()];
        config.fonts.body = vec![font];
        config
    }

    #[tokio::test]
    async fn test_default_style_config_passes() {
        let dir = TempDir::new().unwrap();
        let config = config_with_fonts(&dir);
        assert!(perform_startup_checks(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_fonts_are_not_critical() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_fonts(&dir);
        config.fonts.title = vec![dir.path().join("missing.ttf")];

        let errors = perform_startup_checks(&config).await.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], StartupCheckError::FontMissing("title")));
        assert!(!errors[0].is_critical());
    }

    #[tokio::test]
    async fn test_invalid_settings_are_critical() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_fonts(&dir);
        config.watermark.margin = crate::watermark::Length::Px(-5.0);
        config.geocoding.provider = GeocoderProviderConfig::Nominatim(NominatimConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        config.map.url_template = "static map at {lat},{lon}".to_string();

        let errors = perform_startup_checks(&config).await.unwrap_err();
        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(errors.iter().all(StartupCheckError::is_critical));
    }
}
