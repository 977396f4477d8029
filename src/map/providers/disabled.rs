use async_trait::async_trait;
use image::DynamicImage;

use crate::geocode::Coordinates;
use crate::map::{MapError, MapProvider};

pub struct DisabledMapProvider;

#[async_trait]
impl MapProvider for DisabledMapProvider {
    async fn fetch_map(&self, _coordinates: Coordinates) -> Result<DynamicImage, MapError> {
        Err(MapError::Disabled)
    }

    fn name(&self) -> &str {
        "disabled"
    }
}
