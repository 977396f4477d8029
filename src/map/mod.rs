pub mod config;
pub mod error;
pub mod providers;

pub use config::*;
pub use error::*;

use async_trait::async_trait;
use image::DynamicImage;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::geocode::Coordinates;

#[async_trait]
pub trait MapProvider: Send + Sync {
    async fn fetch_map(&self, coordinates: Coordinates) -> Result<DynamicImage, MapError>;
    fn name(&self) -> &str;
}

pub type DynMapProvider = Arc<dyn MapProvider>;

pub fn create_map_provider(config: &MapConfig) -> Result<DynMapProvider, MapError> {
    if config.enabled {
        Ok(Arc::new(providers::static_map::StaticMapProvider::from_config(config)?))
    } else {
        Ok(Arc::new(providers::disabled::DisabledMapProvider))
    }
}

/// Fetch a map, treating every failure as "no map".
pub async fn fetch_map_or_none(
    provider: &dyn MapProvider,
    coordinates: Coordinates,
) -> Option<DynamicImage> {
    match provider.fetch_map(coordinates).await {
        Ok(map) => {
            debug!(
                "Fetched {}x{} map from {}",
                map.width(),
                map.height(),
                provider.name()
            );
            Some(map)
        }
        Err(MapError::Disabled) => {
            debug!("Map fetching disabled, continuing without map");
            None
        }
        Err(e) => {
            warn!("Failed to load map from {}: {}", provider.name(), e);
            None
        }
    }
}
