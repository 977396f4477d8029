use async_trait::async_trait;
use tracing::debug;

use crate::geocode::{Address, Coordinates, GeocodeError, ReverseGeocoder};

/// Geocoder for deployments without network access. Every lookup falls
/// back to the coordinate line.
pub struct OfflineGeocoder;

#[async_trait]
impl ReverseGeocoder for OfflineGeocoder {
    async fn reverse(&self, coordinates: Coordinates) -> Result<Address, GeocodeError> {
        debug!(
            "Offline geocoder asked for {:.6}, {:.6}",
            coordinates.latitude, coordinates.longitude
        );
        Err(GeocodeError::Disabled)
    }

    fn name(&self) -> &str {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_always_disabled() {
        let geocoder = OfflineGeocoder;
        let result = geocoder
            .reverse(Coordinates::new(0.0, 0.0).unwrap())
            .await;
        assert!(matches!(result, Err(GeocodeError::Disabled)));
    }
}
