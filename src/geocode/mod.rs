pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, coordinates: Coordinates) -> Result<Address, GeocodeError>;
    fn name(&self) -> &str;
}

pub type DynGeocoder = Arc<dyn ReverseGeocoder>;

pub fn create_geocoder(config: &GeocodingConfig) -> Result<DynGeocoder, GeocodeError> {
    match &config.provider {
        GeocoderProviderConfig::Nominatim(nominatim) => Ok(Arc::new(
            providers::nominatim::NominatimGeocoder::from_config(nominatim)?,
        )),
        GeocoderProviderConfig::Offline => Ok(Arc::new(providers::offline::OfflineGeocoder)),
    }
}

/// Look up the address for `coordinates`, falling back to the bare
/// coordinates when the geocoder fails.
pub async fn lookup_location(
    geocoder: &dyn ReverseGeocoder,
    coordinates: Coordinates,
) -> LocationLookup {
    match geocoder.reverse(coordinates).await {
        Ok(address) => {
            info!(
                "Resolved {:.6}, {:.6} via {}",
                coordinates.latitude,
                coordinates.longitude,
                geocoder.name()
            );
            LocationLookup {
                lines: format_address_lines(&address, coordinates),
                error: None,
            }
        }
        Err(e) => {
            warn!(
                "Reverse geocoding via {} failed, using coordinates only: {}",
                geocoder.name(),
                e
            );
            LocationLookup {
                lines: coordinate_lines(coordinates),
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGeocoder(Address);

    #[async_trait]
    impl ReverseGeocoder for FixedGeocoder {
        async fn reverse(&self, _coordinates: Coordinates) -> Result<Address, GeocodeError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_lookup_formats_address() {
        let geocoder = FixedGeocoder(Address {
            road: Some("Merdeka".to_string()),
            ..Default::default()
        });
        let coordinates = Coordinates::new(-6.2, 106.8).unwrap();
        let lookup = lookup_location(&geocoder, coordinates).await;
        assert!(lookup.error.is_none());
        assert_eq!(lookup.lines[0], "Jl. Merdeka");
        assert_eq!(lookup.lines.last().unwrap(), "Koordinat: -6.200000, 106.800000");
    }

    #[tokio::test]
    async fn test_lookup_falls_back_to_coordinates() {
        let geocoder = providers::offline::OfflineGeocoder;
        let coordinates = Coordinates::new(-6.2, 106.8).unwrap();
        let lookup = lookup_location(&geocoder, coordinates).await;
        assert!(lookup.is_fallback());
        assert_eq!(lookup.lines, vec!["Koordinat: -6.200000, 106.800000"]);
    }

    #[test]
    fn test_create_offline_geocoder() {
        let config = GeocodingConfig {
            provider: GeocoderProviderConfig::Offline,
        };
        let geocoder = create_geocoder(&config).unwrap();
        assert_eq!(geocoder.name(), "offline");
    }
}
