use thiserror::Error;

#[derive(Debug, Error)]
pub enum StampError {
    #[error("No photo was uploaded")]
    MissingPhoto,

    #[error("Photo could not be decoded: {0}")]
    InvalidPhoto(#[source] image::ImageError),

    #[error("Invalid temperature: {0}")]
    InvalidTemperature(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error(transparent)]
    Geocode(#[from] crate::geocode::GeocodeError),

    #[error(transparent)]
    Map(#[from] crate::map::MapError),

    #[error(transparent)]
    Watermark(#[from] crate::watermark::WatermarkError),

    #[error("Failed to encode JPEG: {0}")]
    EncodeError(#[source] image::ImageError),

    #[error("Page template unusable: {0}")]
    TemplateError(String),
}
