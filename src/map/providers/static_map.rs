use async_trait::async_trait;
use image::DynamicImage;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::geocode::Coordinates;
use crate::map::{MapConfig, MapError, MapProvider};

/// Fetches a rendered map tile from a static-map HTTP service.
pub struct StaticMapProvider {
    client: Client,
    url_template: String,
    zoom: u8,
    width: u32,
    height: u32,
}

impl StaticMapProvider {
    pub fn from_config(config: &MapConfig) -> Result<Self, MapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let provider = Self {
            client,
            url_template: config.url_template.clone(),
            zoom: config.zoom,
            width: config.width,
            height: config.height,
        };

        // Expand once with dummy coordinates so a broken template fails at startup
        provider.map_url(Coordinates {
            latitude: 0.0,
            longitude: 0.0,
        })?;

        Ok(provider)
    }

    pub fn map_url(&self, coordinates: Coordinates) -> Result<Url, MapError> {
        let expanded = self
            .url_template
            .replace("{lat}", &coordinates.latitude.to_string())
            .replace("{lon}", &coordinates.longitude.to_string())
            .replace("{zoom}", &self.zoom.to_string())
            .replace("{width}", &self.width.to_string())
            .replace("{height}", &self.height.to_string());

        Url::parse(&expanded)
            .map_err(|e| MapError::ConfigError(format!("invalid map URL '{}': {}", expanded, e)))
    }
}

#[async_trait]
impl MapProvider for StaticMapProvider {
    async fn fetch_map(&self, coordinates: Coordinates) -> Result<DynamicImage, MapError> {
        let url = self.map_url(coordinates)?;
        debug!("Fetching static map: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MapError::StatusError(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(image::load_from_memory(&bytes)?)
    }

    fn name(&self) -> &str {
        "static-map"
    }
}
