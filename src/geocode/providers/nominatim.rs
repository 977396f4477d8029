use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::geocode::{Address, Coordinates, GeocodeError, NominatimConfig, ReverseGeocoder};

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
    error: Option<String>,
}

/// Reverse geocoding against an OpenStreetMap Nominatim instance.
pub struct NominatimGeocoder {
    client: Client,
    reverse_url: Url,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let reverse_url = Url::parse(&format!("{}/reverse", base_url.trim_end_matches('/')))
            .map_err(|e| GeocodeError::ConfigError(format!("invalid base_url '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            reverse_url,
        })
    }

    pub fn from_config(config: &NominatimConfig) -> Result<Self, GeocodeError> {
        Self::new(
            &config.base_url,
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn request_url(&self, coordinates: Coordinates) -> Url {
        let mut url = self.reverse_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &coordinates.latitude.to_string())
            .append_pair("lon", &coordinates.longitude.to_string())
            .append_pair("addressdetails", "1");
        url
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, coordinates: Coordinates) -> Result<Address, GeocodeError> {
        let url = self.request_url(coordinates);
        debug!("Nominatim reverse lookup: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::StatusError(status.as_u16()));
        }

        let body: ReverseResponse = response.json().await?;
        match body.address {
            Some(address) => Ok(address),
            None => {
                if let Some(reason) = body.error {
                    debug!("Nominatim reported: {}", reason);
                }
                Err(GeocodeError::MissingAddress)
            }
        }
    }

    fn name(&self) -> &str {
        "nominatim"
    }
}
