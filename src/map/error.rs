use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Map request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Map service returned HTTP {0}")]
    StatusError(u16),

    #[error("Map image could not be decoded: {0}")]
    DecodeError(#[from] image::ImageError),

    #[error("Map configuration error: {0}")]
    ConfigError(String),

    #[error("Map fetching is disabled")]
    Disabled,
}
