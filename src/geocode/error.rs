use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Geocoding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoding service returned HTTP {0}")]
    StatusError(u16),

    #[error("Geocoding response had no address")]
    MissingAddress,

    #[error("Geocoding configuration error: {0}")]
    ConfigError(String),

    #[error("Geocoding is disabled")]
    Disabled,
}
